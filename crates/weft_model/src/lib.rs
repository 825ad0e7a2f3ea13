//! The declared-source model a synthesis pass reads.
//!
//! A [`Program`] holds every [`Component`] of the build and an arena of their
//! declared [`Member`]s, each carrying its [`Directive`]s and modifiers. The
//! synthesizers never see source text: they see this model, plus the
//! [`VirtualMember`]s the resolver derives from it.

#![warn(missing_docs)]

pub mod arena;
pub mod component;
pub mod directive;
pub mod error;
pub mod ids;
pub mod member;
pub mod program;
pub mod types;
pub mod virtual_member;

pub use arena::{Arena, ArenaId};
pub use component::{Component, ComponentSource};
pub use directive::{Directive, DirectiveFlags, DirectiveKind};
pub use error::ModelError;
pub use ids::{ComponentId, MemberId};
pub use member::{capitalize, Member, MemberKey, MemberKind, MemberSource, Modifier, Param};
pub use program::{Program, ProgramSource};
pub use types::{PrimitiveKind, TypeRef, STRING};
pub use virtual_member::{ReferenceMember, VirtualMember};
