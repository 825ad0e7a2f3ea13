//! Conversion of a raw textual read to a slot's declared type.

use tracing::debug;
use weft_codemodel::Expr;
use weft_config::UnsupportedTypePolicy;
use weft_diagnostics::{Diagnostic, DiagnosticSink, Target};
use weft_model::{PrimitiveKind, TypeRef};

use crate::codes;

/// How a raw read becomes a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Assigned as read.
    Verbatim,
    /// `Boxed.valueOf(raw)`, by boxed simple name.
    ValueOf(&'static str),
}

impl Coercion {
    /// The coercion for `ty`, or `None` when it has none.
    pub fn for_type(ty: &TypeRef) -> Option<Self> {
        if ty.is_string() {
            return Some(Coercion::Verbatim);
        }
        let boxed = match ty.unboxed()? {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
            PrimitiveKind::Char => return None,
        };
        Some(Coercion::ValueOf(boxed))
    }

    /// Wraps `raw` in this coercion.
    pub fn apply(self, raw: Expr) -> Expr {
        match self {
            Coercion::Verbatim => raw,
            Coercion::ValueOf(boxed) => Expr::call_static(boxed, "valueOf", vec![raw]),
        }
    }
}

/// Returns `true` for the types a field binds directly rather than through
/// nested paths: primitives, their boxes and strings.
pub fn is_leaf_type(ty: &TypeRef) -> bool {
    ty.is_string() || ty.unboxed().is_some()
}

/// Coerces `raw` to `ty`, reporting per `policy` when there is no coercion.
pub fn coerce_or_report(
    ty: &TypeRef,
    raw: Expr,
    policy: UnsupportedTypePolicy,
    sink: &DiagnosticSink,
    target: &Target,
    path: &str,
) -> Option<Expr> {
    if let Some(coercion) = Coercion::for_type(ty) {
        return Some(coercion.apply(raw));
    }
    let message = format!("slot `{path}` of type `{ty}` has no conversion and is skipped");
    match policy {
        UnsupportedTypePolicy::Warn => {
            sink.emit(Diagnostic::warning(codes::UNSUPPORTED_SLOT_TYPE, message, target.clone()))
        }
        UnsupportedTypePolicy::Error => {
            sink.emit(Diagnostic::error(codes::UNSUPPORTED_SLOT_TYPE, message, target.clone()))
        }
        UnsupportedTypePolicy::Allow => debug!(%target, path, %ty, "skipping unsupported slot"),
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_diagnostics::Severity;

    #[test]
    fn coercion_table() {
        let cases = [
            ("boolean", Some(Coercion::ValueOf("Boolean"))),
            ("int", Some(Coercion::ValueOf("Integer"))),
            ("java.lang.Integer", Some(Coercion::ValueOf("Integer"))),
            ("short", Some(Coercion::ValueOf("Short"))),
            ("double", Some(Coercion::ValueOf("Double"))),
            ("float", Some(Coercion::ValueOf("Float"))),
            ("byte", Some(Coercion::ValueOf("Byte"))),
            ("long", Some(Coercion::ValueOf("Long"))),
            ("java.lang.String", Some(Coercion::Verbatim)),
            ("char", None),
            ("java.util.Date", None),
        ];
        for (ty, expected) in cases {
            assert_eq!(Coercion::for_type(&TypeRef::parse(ty)), expected, "{ty}");
        }
    }

    #[test]
    fn apply_wraps_in_value_of() {
        let expr = Coercion::ValueOf("Integer").apply(Expr::string("42"));
        assert_eq!(expr, Expr::call_static("Integer", "valueOf", vec![Expr::string("42")]));
        assert_eq!(Coercion::Verbatim.apply(Expr::Null), Expr::Null);
    }

    #[test]
    fn unsupported_reporting_follows_policy() {
        let target = Target::member("a.B", "form");
        let date = TypeRef::class("java.util.Date");
        for (policy, expected) in [
            (UnsupportedTypePolicy::Warn, Some(Severity::Warning)),
            (UnsupportedTypePolicy::Error, Some(Severity::Error)),
            (UnsupportedTypePolicy::Allow, None),
        ] {
            let sink = DiagnosticSink::new();
            let out = coerce_or_report(&date, Expr::Null, policy, &sink, &target, "when");
            assert!(out.is_none());
            let diags = sink.take_all();
            assert_eq!(diags.first().map(|d| d.severity), expected);
        }
    }

    #[test]
    fn leaf_types() {
        assert!(is_leaf_type(&TypeRef::parse("int")));
        assert!(is_leaf_type(&TypeRef::string()));
        assert!(is_leaf_type(&TypeRef::parse("char")));
        assert!(!is_leaf_type(&TypeRef::class("com.shop.Address")));
    }
}
