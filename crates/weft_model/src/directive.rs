//! Directives: declarative markers attached to components and members.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of directive kinds the synthesizers understand.
///
/// Directives owned by other processors are carried as [`DirectiveKind::Host`]
/// so the resolver can still decide whether they make a method delegable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DirectiveKind {
    /// Generic delegation through a reference member.
    External,
    /// Delegation of a population procedure.
    ExternalPopulate,
    /// Delegation of a recollection procedure.
    ExternalRecollect,
    /// Excludes a member from delegation.
    NonExternal,
    /// Model-to-view population.
    Populate,
    /// View-to-model recollection.
    Recollect,
    /// Runs after dependency injection.
    AfterInject,
    /// Runs after the view hierarchy is bound.
    AfterViews,
    /// A directive owned by another processor.
    Host(String),
}

impl DirectiveKind {
    /// The directive's name as written in source.
    pub fn name(&self) -> &str {
        match self {
            DirectiveKind::External => "External",
            DirectiveKind::ExternalPopulate => "ExternalPopulate",
            DirectiveKind::ExternalRecollect => "ExternalRecollect",
            DirectiveKind::NonExternal => "NonExternal",
            DirectiveKind::Populate => "Populate",
            DirectiveKind::Recollect => "Recollect",
            DirectiveKind::AfterInject => "AfterInject",
            DirectiveKind::AfterViews => "AfterViews",
            DirectiveKind::Host(name) => name,
        }
    }

    /// Parses a directive name. Unknown names become [`DirectiveKind::Host`].
    pub fn parse(name: &str) -> Self {
        match name {
            "External" => DirectiveKind::External,
            "ExternalPopulate" => DirectiveKind::ExternalPopulate,
            "ExternalRecollect" => DirectiveKind::ExternalRecollect,
            "NonExternal" => DirectiveKind::NonExternal,
            "Populate" => DirectiveKind::Populate,
            "Recollect" => DirectiveKind::Recollect,
            "AfterInject" => DirectiveKind::AfterInject,
            "AfterViews" => DirectiveKind::AfterViews,
            other => DirectiveKind::Host(other.to_string()),
        }
    }

    /// Returns `true` for the three delegating kinds.
    pub fn is_delegating(&self) -> bool {
        matches!(
            self,
            DirectiveKind::External
                | DirectiveKind::ExternalPopulate
                | DirectiveKind::ExternalRecollect
        )
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for DirectiveKind {
    fn from(name: String) -> Self {
        DirectiveKind::parse(&name)
    }
}

impl From<DirectiveKind> for String {
    fn from(kind: DirectiveKind) -> Self {
        kind.name().to_string()
    }
}

/// Flags parameterizing a directive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectiveFlags {
    /// Gate recollection behind a validation pass.
    #[serde(default, skip_serializing_if = "is_false")]
    pub validate: bool,
    /// Log the discovered binding table.
    #[serde(default, skip_serializing_if = "is_false")]
    pub debug: bool,
    /// Allow external listener override of the generated procedure.
    #[serde(default, skip_serializing_if = "is_false")]
    pub external: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A directive instance on a component or member. Immutable once discovered.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Directive {
    /// What the directive selects.
    pub kind: DirectiveKind,
    /// Its flags.
    #[serde(flatten)]
    pub flags: DirectiveFlags,
}

impl Directive {
    /// A directive of `kind` with every flag cleared.
    pub fn new(kind: DirectiveKind) -> Self {
        Self {
            kind,
            flags: DirectiveFlags::default(),
        }
    }

    /// Sets the `validate` flag.
    pub fn validate(mut self) -> Self {
        self.flags.validate = true;
        self
    }

    /// Sets the `debug` flag.
    pub fn debug(mut self) -> Self {
        self.flags.debug = true;
        self
    }

    /// Sets the `external` flag.
    pub fn external(mut self) -> Self {
        self.flags.external = true;
        self
    }
}

impl From<DirectiveKind> for Directive {
    fn from(kind: DirectiveKind) -> Self {
        Directive::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_are_host_directives() {
        assert_eq!(DirectiveKind::parse("Populate"), DirectiveKind::Populate);
        assert_eq!(
            DirectiveKind::parse("Action"),
            DirectiveKind::Host("Action".to_string())
        );
        assert_eq!(DirectiveKind::Host("Action".into()).name(), "Action");
    }

    #[test]
    fn delegating_kinds() {
        assert!(DirectiveKind::External.is_delegating());
        assert!(DirectiveKind::ExternalRecollect.is_delegating());
        assert!(!DirectiveKind::Populate.is_delegating());
    }

    #[test]
    fn flags_default_when_absent() {
        let d: Directive = serde_json::from_str(r#"{"kind":"Recollect"}"#).unwrap();
        assert_eq!(d, Directive::new(DirectiveKind::Recollect));
    }

    #[test]
    fn flags_parse_inline() {
        let d: Directive =
            serde_json::from_str(r#"{"kind":"Populate","debug":true,"external":true}"#).unwrap();
        assert!(d.flags.debug);
        assert!(d.flags.external);
        assert!(!d.flags.validate);
    }

    #[test]
    fn cleared_flags_are_not_serialized() {
        let json = serde_json::to_string(&Directive::new(DirectiveKind::External)).unwrap();
        assert_eq!(json, r#"{"kind":"External"}"#);
    }
}
