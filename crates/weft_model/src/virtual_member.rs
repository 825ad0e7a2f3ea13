//! Virtual members: synthesized proxies for declared members.

use crate::directive::DirectiveKind;
use crate::ids::MemberId;
use serde::{Deserialize, Serialize};

/// The member through which a virtual member is reached at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReferenceMember {
    /// The component's implicit `this`.
    SelfRef,
    /// An explicit reference field of the host component.
    Field(MemberId),
}

impl ReferenceMember {
    /// Returns `true` for the implicit `this`.
    pub fn is_self(self) -> bool {
        matches!(self, ReferenceMember::SelfRef)
    }

    /// The reference field, if explicit.
    pub fn field(self) -> Option<MemberId> {
        match self {
            ReferenceMember::SelfRef => None,
            ReferenceMember::Field(id) => Some(id),
        }
    }
}

/// A proxy for `member`, reached through exactly one `reference`, created
/// because of a directive of `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VirtualMember {
    /// The proxied declared member.
    pub member: MemberId,
    /// The reference it is reached through.
    pub reference: ReferenceMember,
    /// The directive kind that selected it.
    pub kind: DirectiveKind,
}

impl VirtualMember {
    /// Creates a virtual member.
    pub fn new(member: MemberId, reference: ReferenceMember, kind: DirectiveKind) -> Self {
        Self {
            member,
            reference,
            kind,
        }
    }
}
