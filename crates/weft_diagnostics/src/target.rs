//! The entity a diagnostic is reported against.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a diagnostic points at: a component, or one member of it.
///
/// There is no source text in a synthesis pass, so targets name declared
/// entities instead of byte spans. Displayed as `com.app.Main` or
/// `com.app.Main#save(java.lang.String)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Fully-qualified name of the component (or generated artifact).
    pub component: String,
    /// Member signature within the component, if the diagnostic is member-scoped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

impl Target {
    /// A target covering a whole component or artifact.
    pub fn component(name: impl Into<String>) -> Self {
        Self {
            component: name.into(),
            member: None,
        }
    }

    /// A target narrowed to a single member of `component`.
    pub fn member(component: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            member: Some(member.into()),
        }
    }

    /// Returns `true` if this target names a member.
    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{}#{}", self.component, member),
            None => write!(f, "{}", self.component),
        }
    }
}
