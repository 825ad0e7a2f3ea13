//! Declared members of a component: fields and methods.

use crate::directive::{Directive, DirectiveKind};
use crate::types::TypeRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A declaration modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    /// `public`
    Public,
    /// `protected`
    Protected,
    /// `private`
    Private,
    /// `static`
    Static,
    /// `abstract`
    Abstract,
    /// `final`
    Final,
}

/// A method parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
}

impl Param {
    /// Creates a parameter.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Whether a member is a field or a method, with its signature.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MemberKind {
    /// A field of the given type.
    Field {
        /// Declared type.
        #[serde(rename = "type")]
        ty: TypeRef,
    },
    /// A method.
    Method {
        /// Declared return type.
        #[serde(rename = "returns", default = "void")]
        ret: TypeRef,
        /// Parameters in declaration order.
        #[serde(default)]
        params: Vec<Param>,
    },
}

fn void() -> TypeRef {
    TypeRef::Void
}

/// A member as it appears in a program description, without its owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSource {
    /// Simple name.
    pub name: String,
    /// Field or method signature.
    #[serde(flatten)]
    pub kind: MemberKind,
    /// Declaration modifiers.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: BTreeSet<Modifier>,
    /// Attached directives, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
}

impl MemberSource {
    /// A field with no modifiers or directives.
    pub fn field(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field { ty: ty.into() },
            modifiers: BTreeSet::new(),
            directives: Vec::new(),
        }
    }

    /// A method with no modifiers or directives.
    pub fn method(name: impl Into<String>, ret: impl Into<TypeRef>, params: Vec<Param>) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method {
                ret: ret.into(),
                params,
            },
            modifiers: BTreeSet::new(),
            directives: Vec::new(),
        }
    }

    /// Adds a modifier.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.insert(modifier);
        self
    }

    /// Adds the `public` modifier.
    pub fn public(self) -> Self {
        self.with_modifier(Modifier::Public)
    }

    /// Attaches a directive.
    pub fn with_directive(mut self, directive: impl Into<Directive>) -> Self {
        self.directives.push(directive.into());
        self
    }
}

/// Stable identity of a member: owner, simple name and, for methods, the
/// parameter types.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey {
    /// Qualified name of the declaring component.
    pub owner: String,
    /// Simple name.
    pub name: String,
    /// Parameter types, `None` for fields.
    pub params: Option<Vec<TypeRef>>,
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.owner, self.name)?;
        if let Some(params) = &self.params {
            let params: Vec<String> = params.iter().map(ToString::to_string).collect();
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}

/// A declared field or method of a component.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    /// Qualified name of the declaring component.
    pub owner: String,
    /// Simple name.
    pub name: String,
    /// Field or method signature.
    pub kind: MemberKind,
    /// Declaration modifiers.
    pub modifiers: BTreeSet<Modifier>,
    /// Attached directives, in source order.
    pub directives: Vec<Directive>,
}

impl Member {
    /// Binds a member description to its declaring component.
    pub fn from_source(owner: &str, source: MemberSource) -> Self {
        Self {
            owner: owner.to_string(),
            name: source.name,
            kind: source.kind,
            modifiers: source.modifiers,
            directives: source.directives,
        }
    }

    /// The member's stable identity.
    pub fn key(&self) -> MemberKey {
        MemberKey {
            owner: self.owner.clone(),
            name: self.name.clone(),
            params: match &self.kind {
                MemberKind::Field { .. } => None,
                MemberKind::Method { params, .. } => {
                    Some(params.iter().map(|p| p.ty.clone()).collect())
                }
            },
        }
    }

    /// Returns `true` for fields.
    pub fn is_field(&self) -> bool {
        matches!(self.kind, MemberKind::Field { .. })
    }

    /// Returns `true` for methods.
    pub fn is_method(&self) -> bool {
        matches!(self.kind, MemberKind::Method { .. })
    }

    /// The field type or the method return type.
    pub fn declared_type(&self) -> &TypeRef {
        match &self.kind {
            MemberKind::Field { ty } => ty,
            MemberKind::Method { ret, .. } => ret,
        }
    }

    /// Method parameters; empty for fields.
    pub fn params(&self) -> &[Param] {
        match &self.kind {
            MemberKind::Field { .. } => &[],
            MemberKind::Method { params, .. } => params,
        }
    }

    /// Returns `true` if the member carries `modifier`.
    pub fn has_modifier(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    /// Returns `true` for `static` members.
    pub fn is_static(&self) -> bool {
        self.has_modifier(Modifier::Static)
    }

    /// Returns `true` for `abstract` members.
    pub fn is_abstract(&self) -> bool {
        self.has_modifier(Modifier::Abstract)
    }

    /// Returns `true` for `public` members.
    pub fn is_public(&self) -> bool {
        self.has_modifier(Modifier::Public)
    }

    /// Returns `true` for `private` members.
    pub fn is_private(&self) -> bool {
        self.has_modifier(Modifier::Private)
    }

    /// The first directive of `kind`, if any.
    pub fn directive(&self, kind: &DirectiveKind) -> Option<&Directive> {
        self.directives.iter().find(|d| &d.kind == kind)
    }

    /// Returns `true` if the member carries a directive of `kind`.
    pub fn has_directive(&self, kind: &DirectiveKind) -> bool {
        self.directive(kind).is_some()
    }

    /// The member name with its first character upper-cased, as used in
    /// generated accessor names.
    pub fn capitalized_name(&self) -> String {
        capitalize(&self.name)
    }
}

/// Upper-cases the first character of `name`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_key_includes_params() {
        let source = MemberSource::method(
            "total",
            "double",
            vec![Param::new("tax", "float"), Param::new("note", "java.lang.String")],
        );
        let member = Member::from_source("com.shop.Cart", source);
        assert_eq!(
            member.key().to_string(),
            "com.shop.Cart#total(float, java.lang.String)"
        );
    }

    #[test]
    fn field_key_has_no_params() {
        let member = Member::from_source("com.shop.Cart", MemberSource::field("items", "int"));
        assert_eq!(member.key().params, None);
        assert_eq!(member.key().to_string(), "com.shop.Cart#items");
    }

    #[test]
    fn modifiers_and_directives() {
        let source = MemberSource::field("address", "com.shop.Address")
            .with_modifier(Modifier::Private)
            .with_directive(Directive::new(DirectiveKind::Recollect).validate());
        let member = Member::from_source("com.shop.Form", source);
        assert!(member.is_private());
        assert!(!member.is_public());
        let directive = member.directive(&DirectiveKind::Recollect).unwrap();
        assert!(directive.flags.validate);
        assert!(!member.has_directive(&DirectiveKind::Populate));
    }

    #[test]
    fn parse_member_json() {
        let json = r#"{
            "name": "isReady",
            "kind": "method",
            "returns": "boolean",
            "modifiers": ["public"],
            "directives": [{"kind": "External"}]
        }"#;
        let source: MemberSource = serde_json::from_str(json).unwrap();
        let member = Member::from_source("a.B", source);
        assert!(member.is_method());
        assert!(member.declared_type().is_boolean());
        assert!(member.params().is_empty());
        assert!(member.has_directive(&DirectiveKind::External));
    }

    #[test]
    fn method_return_defaults_to_void() {
        let source: MemberSource =
            serde_json::from_str(r#"{"name": "refresh", "kind": "method"}"#).unwrap();
        assert_eq!(
            source.kind,
            MemberKind::Method {
                ret: TypeRef::Void,
                params: vec![]
            }
        );
    }

    #[test]
    fn capitalize_names() {
        assert_eq!(capitalize("address"), "Address");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("x"), "X");
    }
}
