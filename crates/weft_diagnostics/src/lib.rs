//! Diagnostic creation, severity management, and rendering.
//!
//! Synthesis problems are reported as structured [`Diagnostic`]s against a
//! [`Target`] (a component, optionally narrowed to one of its members). The
//! [`DiagnosticSink`] accumulates them for the duration of a build pass, and
//! [`DiagnosticRenderer`] implementations format them as terminal text or JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod target;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle};
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use target::Target;
