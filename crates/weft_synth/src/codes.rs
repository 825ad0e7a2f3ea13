//! Diagnostic codes reported by synthesis passes.

use weft_diagnostics::{Category, DiagnosticCode};

/// Delegation directive on a static member.
pub const STATIC_DELEGATE: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
/// Delegation directive on a non-public method.
pub const NON_PUBLIC_DELEGATE: DiagnosticCode = DiagnosticCode::new(Category::Error, 102);
/// Delegation directive combined with an after-inject directive.
pub const DELEGATE_AFTER_INJECT: DiagnosticCode = DiagnosticCode::new(Category::Error, 103);
/// Reference field whose type is not an external component.
pub const NOT_EXTERNAL_REFERENCE: DiagnosticCode = DiagnosticCode::new(Category::Error, 104);
/// Recollection over a collection-typed field.
pub const RECOLLECT_COLLECTION: DiagnosticCode = DiagnosticCode::new(Category::Error, 105);
/// Recollection base case with no bound element.
pub const RECOLLECT_UNBOUND: DiagnosticCode = DiagnosticCode::new(Category::Error, 106);
/// Recollection on a private field.
pub const RECOLLECT_PRIVATE: DiagnosticCode = DiagnosticCode::new(Category::Error, 107);
/// `readField` companion with a wrong signature, or missing where required.
pub const READ_FIELD_SIGNATURE: DiagnosticCode = DiagnosticCode::new(Category::Error, 108);
/// Populate request on a field without a population directive.
pub const POPULATE_UNDIRECTED: DiagnosticCode = DiagnosticCode::new(Category::Error, 109);

/// Slot with a declared type that has no coercion; the slot is skipped.
pub const UNSUPPORTED_SLOT_TYPE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);
/// Member already delegated through another reference; the later one is ignored.
pub const SHADOWED_DELEGATE: DiagnosticCode = DiagnosticCode::new(Category::Warning, 202);

/// A dependency is absent from the recorded set.
pub const DEPENDENCY_ADDED: DiagnosticCode = DiagnosticCode::new(Category::Rebuild, 301);
/// An upstream component changed or disappeared.
pub const UPSTREAM_CHANGED: DiagnosticCode = DiagnosticCode::new(Category::Rebuild, 302);
/// The cache could not be written back.
pub const CACHE_WRITE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Rebuild, 303);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_display_with_prefix() {
        assert_eq!(STATIC_DELEGATE.to_string(), "E101");
        assert_eq!(POPULATE_UNDIRECTED.to_string(), "E109");
        assert_eq!(UNSUPPORTED_SLOT_TYPE.to_string(), "W201");
        assert_eq!(UPSTREAM_CHANGED.to_string(), "R302");
    }
}
