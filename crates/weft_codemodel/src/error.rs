//! Errors raised while executing generated code.

use crate::value::Value;

/// Errors from [`Interpreter`](crate::Interpreter).
///
/// [`EvalError::Thrown`] is catchable by a generated `try`; the other
/// variants mean the generated code could not have compiled.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// A runtime exception value propagated out of the executed code.
    #[error("uncaught exception: {0}")]
    Thrown(Value),

    /// A name resolved to no local, parameter or field.
    #[error("unresolved name `{0}`")]
    Unresolved(String),

    /// No method of that name accepts the call.
    #[error("no method `{method}` on `{target}`")]
    NoMethod {
        /// Receiver description.
        target: String,
        /// Method name.
        method: String,
    },

    /// An operand had the wrong kind of value.
    #[error("type error: {0}")]
    Type(String),
}

impl EvalError {
    /// A thrown exception object of `class` carrying `message`.
    pub fn throw(class: &str, message: impl Into<String>) -> Self {
        EvalError::Thrown(Value::object(
            class,
            [("message", Value::Str(message.into()))],
        ))
    }

    /// The thrown exception's class name, for [`EvalError::Thrown`].
    pub fn thrown_class(&self) -> Option<String> {
        match self {
            EvalError::Thrown(value) => value.class_name(),
            _ => None,
        }
    }
}
