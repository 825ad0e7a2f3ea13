//! Structured diagnostic messages with severity, codes, targets, and labels.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use crate::target::Target;
use serde::{Deserialize, Serialize};

/// A structured diagnostic reported to the surrounding build tool.
///
/// The core of every diagnostic is the (severity, target, message) triple.
/// Labels, notes, and help lines add context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of problem.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The component or member the diagnostic is reported against.
    pub target: Target,
    /// Related entities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
    /// Explanatory footnotes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    /// Actionable suggestions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub help: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with an explicit severity.
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        target: Target,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            target,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates a new error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, target: Target) -> Self {
        Self::new(Severity::Error, code, message, target)
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, target: Target) -> Self {
        Self::new(Severity::Warning, code, message, target)
    }

    /// Creates a new note diagnostic.
    pub fn note(code: DiagnosticCode, message: impl Into<String>, target: Target) -> Self {
        Self::new(Severity::Note, code, message, target)
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn create_error() {
        let code = DiagnosticCode::new(Category::Error, 101);
        let diag = Diagnostic::error(code, "static member", Target::member("a.B", "helper()"));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.message, "static member");
        assert_eq!(diag.code.to_string(), "E101");
    }

    #[test]
    fn create_note() {
        let code = DiagnosticCode::new(Category::Rebuild, 301);
        let diag = Diagnostic::note(code, "reused cached source", Target::component("a.B_"));
        assert_eq!(diag.severity, Severity::Note);
    }

    #[test]
    fn builder_methods() {
        let code = DiagnosticCode::new(Category::Rebuild, 301);
        let diag = Diagnostic::error(code, "rebuild required", Target::component("a.B_"))
            .with_label(Label::secondary(Target::component("a.C"), "new dependency"))
            .with_note("the cached dependency set does not contain a.C")
            .with_help("run a full rebuild");
        assert_eq!(diag.labels.len(), 1);
        assert_eq!(diag.notes.len(), 1);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn json_skips_empty_context() {
        let code = DiagnosticCode::new(Category::Warning, 201);
        let diag = Diagnostic::warning(code, "skipped", Target::component("a.B"));
        let json = serde_json::to_string(&diag).unwrap();
        assert!(!json.contains("labels"));
        assert!(!json.contains("notes"));
        let back: Diagnostic = serde_json::from_str(&json).unwrap();
        assert_eq!(back.message, "skipped");
    }
}
