//! Pass-level result and error types.

/// The result type for operations that can abort a whole build pass.
///
/// `Ok` carries the value even when member-level problems were reported:
/// directive misuse and stale-cache findings go to the
/// [`DiagnosticSink`](weft_diagnostics) and the pass continues. `Err` is
/// reserved for resolver invariant violations.
pub type WeftResult<T> = Result<T, InternalError>;

/// An internal consistency violation: a bug in the synthesizer, not a user error.
///
/// Examples are a virtual member whose reference cannot be found in the
/// member arena, or a member re-bound to a different reference within one
/// pass. Any of these aborts the pass.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("internal consistency error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("virtual member without reference");
        assert_eq!(
            format!("{err}"),
            "internal consistency error: virtual member without reference"
        );
    }

    #[test]
    fn question_mark_propagates() {
        fn inner() -> WeftResult<u32> {
            Err(InternalError::new("boom"))
        }
        fn outer() -> WeftResult<u32> {
            let v = inner()?;
            Ok(v + 1)
        }
        assert_eq!(outer().unwrap_err().message, "boom");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
