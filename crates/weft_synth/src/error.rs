//! Member-scoped synthesis failures.

use thiserror::Error;
use weft_diagnostics::{Diagnostic, DiagnosticCode, Severity, Target};

use crate::codes;

/// A failure that aborts one member's generation but not the pass.
#[derive(Debug, Clone, Error)]
pub enum MemberError {
    /// A directive is used where it does not apply.
    #[error("{message}")]
    Misuse {
        /// Identifying code.
        code: DiagnosticCode,
        /// What is wrong.
        message: String,
        /// How to fix it, if there is an obvious way.
        help: Option<String>,
    },

    /// An artifact's recorded dependency set no longer holds.
    #[error("rebuild required: {reason}")]
    StaleCache {
        /// Identifying code.
        code: DiagnosticCode,
        /// What changed.
        reason: String,
    },
}

impl MemberError {
    /// A misuse without a help line.
    pub fn misuse(code: DiagnosticCode, message: impl Into<String>) -> Self {
        MemberError::Misuse {
            code,
            message: message.into(),
            help: None,
        }
    }

    /// A misuse with a help line.
    pub fn misuse_with_help(
        code: DiagnosticCode,
        message: impl Into<String>,
        help: impl Into<String>,
    ) -> Self {
        MemberError::Misuse {
            code,
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// A stale-cache failure for a dependency missing from the recorded set.
    pub fn dependency_added(upstream: &str) -> Self {
        MemberError::StaleCache {
            code: codes::DEPENDENCY_ADDED,
            reason: format!("`{upstream}` is not in the recorded dependency set"),
        }
    }

    /// A stale-cache failure for an upstream that changed or vanished.
    pub fn upstream_changed(reason: impl Into<String>) -> Self {
        MemberError::StaleCache {
            code: codes::UPSTREAM_CHANGED,
            reason: reason.into(),
        }
    }

    /// The identifying code.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            MemberError::Misuse { code, .. } | MemberError::StaleCache { code, .. } => *code,
        }
    }

    /// Converts into a diagnostic against `target`.
    pub fn into_diagnostic(self, target: Target) -> Diagnostic {
        match self {
            MemberError::Misuse {
                code,
                message,
                help,
            } => {
                let diag = Diagnostic::error(code, message, target);
                match help {
                    Some(help) => diag.with_help(help),
                    None => diag,
                }
            }
            MemberError::StaleCache { code, reason } => {
                let message = format!("rebuild required: {reason}");
                Diagnostic::new(Severity::Error, code, message, target)
                    .with_help("run a full rebuild")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn misuse_becomes_error_diagnostic() {
        let err = MemberError::misuse_with_help(
            codes::STATIC_DELEGATE,
            "static members cannot be delegated",
            "remove `static`",
        );
        let diag = err.into_diagnostic(Target::member("a.B", "helper()"));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.to_string(), "E101");
        assert_eq!(diag.help, vec!["remove `static`".to_string()]);
    }

    #[test]
    fn stale_cache_asks_for_full_rebuild() {
        let diag = MemberError::dependency_added("a.C_").into_diagnostic(Target::component("a.A_"));
        assert_eq!(diag.code.to_string(), "R301");
        assert!(diag.message.contains("a.C_"));
        assert_eq!(diag.help.len(), 1);
    }
}
