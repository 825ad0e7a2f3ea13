//! Components: the annotated classes a synthesis pass generates code for.

use crate::directive::{Directive, DirectiveKind};
use crate::ids::MemberId;
use crate::member::MemberSource;
use serde::{Deserialize, Serialize};
use weft_common::ContentHash;

/// A component as it appears in a program description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSource {
    /// Fully-qualified class name.
    pub name: String,
    /// Direct supertypes (superclass and interfaces).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertypes: Vec<String>,
    /// Class-level directives.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    /// Declared members, in source order.
    #[serde(default)]
    pub members: Vec<MemberSource>,
}

impl ComponentSource {
    /// An empty component description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
            directives: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Attaches a class-level directive.
    pub fn with_directive(mut self, directive: impl Into<Directive>) -> Self {
        self.directives.push(directive.into());
        self
    }

    /// Adds a direct supertype.
    pub fn with_supertype(mut self, name: impl Into<String>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    /// Appends a member.
    pub fn with_member(mut self, member: MemberSource) -> Self {
        self.members.push(member);
        self
    }
}

/// A component loaded into a [`Program`](crate::Program).
#[derive(Clone, Debug)]
pub struct Component {
    /// Fully-qualified class name.
    pub name: String,
    /// Direct supertypes.
    pub supertypes: Vec<String>,
    /// Class-level directives.
    pub directives: Vec<Directive>,
    /// Declared members, in source order.
    pub members: Vec<MemberId>,
    /// Content hash of the component's description.
    pub fingerprint: ContentHash,
}

impl Component {
    /// The class name without its package.
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    /// The package, or an empty string for the default package.
    pub fn package(&self) -> &str {
        match self.name.rfind('.') {
            Some(pos) => &self.name[..pos],
            None => "",
        }
    }

    /// Returns `true` if the component carries a class-level directive of `kind`.
    pub fn has_directive(&self, kind: &DirectiveKind) -> bool {
        self.directives.iter().any(|d| &d.kind == kind)
    }

    /// Returns `true` for components delegable through reference fields.
    pub fn is_external(&self) -> bool {
        self.has_directive(&DirectiveKind::External)
    }
}
