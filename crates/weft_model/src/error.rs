//! Errors raised while loading a program description.

use crate::member::MemberKey;

/// Errors that can occur when building a [`Program`](crate::Program).
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Two components share a qualified name.
    #[error("duplicate component `{0}`")]
    DuplicateComponent(String),

    /// Two members of one component share a key.
    #[error("duplicate member `{0}`")]
    DuplicateMember(MemberKey),

    /// The program description is not valid JSON for the model.
    #[error("invalid program description: {0}")]
    Parse(String),
}
