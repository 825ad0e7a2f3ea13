//! Null-guarded forwarding of delegated methods through reference fields.

use tracing::{debug, trace};
use weft_codemodel::{Block, Expr, MethodDecl};
use weft_common::WeftResult;
use weft_config::DelegationPolicy;
use weft_model::{ComponentId, DirectiveKind, Member, Modifier, PrimitiveKind, TypeRef};

use crate::registry::Synthesizer;
use crate::resolver::Resolution;
use crate::session::BuildSession;

const KINDS: &[DirectiveKind] = &[
    DirectiveKind::External,
    DirectiveKind::ExternalPopulate,
    DirectiveKind::ExternalRecollect,
];

/// Overrides each delegated method in the host's generated class with a
/// forwarding call through its reference field.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelegationSynthesizer;

impl Synthesizer for DelegationSynthesizer {
    fn name(&self) -> &str {
        "delegation"
    }

    fn description(&self) -> &str {
        "forwards delegated methods through their reference field"
    }

    fn kinds(&self) -> &[DirectiveKind] {
        KINDS
    }

    fn synthesize(
        &self,
        session: &mut BuildSession<'_>,
        component: ComponentId,
        resolution: &Resolution,
    ) -> WeftResult<()> {
        let program = session.program();
        let class = session.class_of(component);
        for virtual_member in resolution.of_kinds(KINDS) {
            let member = program.member(virtual_member.member);
            let Some(field) = virtual_member.reference.field() else {
                continue;
            };
            if !member.is_method() {
                continue;
            }
            session.bind(component, virtual_member)?;
            let reference = program.member(field);
            let policy = session.options().policy_for(&virtual_member.kind);
            let method = delegate_method(member, &reference.name, policy);
            if session.code_mut().class_mut(class).add_method(method) {
                trace!(member = %member.key(), reference = %reference.name, ?policy, "delegated");
            } else {
                debug!(member = %member.key(), "delegate already generated");
            }
        }
        Ok(())
    }
}

/// The value a delegated method returns when its reference is absent, or
/// `None` for `void`.
pub fn fallback_value(ty: &TypeRef) -> Option<Expr> {
    match ty {
        TypeRef::Void => None,
        TypeRef::Primitive(PrimitiveKind::Boolean) => Some(Expr::Bool(false)),
        TypeRef::Primitive(_) => Some(Expr::Int(0)),
        TypeRef::Class(_) => Some(Expr::Null),
    }
}

/// The public override of `member` forwarding to the field `reference`.
pub fn delegate_method(member: &Member, reference: &str, policy: DelegationPolicy) -> MethodDecl {
    let ret = member.declared_type().clone();
    let args = member.params().iter().map(|p| Expr::name(p.name.clone())).collect();
    let call = Expr::name(reference).call(member.name.clone(), args);
    let fallback = fallback_value(&ret);
    let guard = Expr::name(reference).ne_null();

    let body = Block::build(|b| match (policy, fallback) {
        (_, None) => {
            b.if_then(guard, |b| {
                b.expr(call);
            });
        }
        (DelegationPolicy::GuardedReturn, Some(fallback)) => {
            b.if_then(guard, |b| {
                b.ret(Some(call));
            });
            b.ret(Some(fallback));
        }
        (DelegationPolicy::FallbackAfter, Some(fallback)) => {
            b.if_then(guard, |b| {
                b.expr(call);
            });
            b.ret(Some(fallback));
        }
    });
    MethodDecl::new(Modifier::Public, ret, member.name.clone(), member.params().to_vec())
        .with_body(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_codemodel::JavaRenderer;
    use weft_model::{MemberSource, Param};

    fn method(name: &str, ret: &str, params: Vec<Param>) -> Member {
        Member::from_source("com.shop.Cart", MemberSource::method(name, ret, params).public())
    }

    #[test]
    fn fallback_table() {
        let cases = [
            ("boolean", Some(Expr::Bool(false))),
            ("int", Some(Expr::Int(0))),
            ("double", Some(Expr::Int(0))),
            ("java.lang.Integer", Some(Expr::Null)),
            ("java.lang.Boolean", Some(Expr::Null)),
            ("com.shop.Cart_", Some(Expr::Null)),
            ("void", None),
        ];
        for (ty, expected) in cases {
            assert_eq!(fallback_value(&TypeRef::parse(ty)), expected, "{ty}");
        }
    }

    #[test]
    fn guarded_return_renders() {
        let params = vec![Param::new("sku", "java.lang.String"), Param::new("qty", "int")];
        let m = method("add", "int", params);
        let rendered = JavaRenderer::default()
            .render_method(&delegate_method(&m, "cart", DelegationPolicy::GuardedReturn));
        let expected = "\
public int add(java.lang.String sku, int qty) {
    if (cart != null) {
        return cart.add(sku, qty);
    }
    return 0;
}
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn fallback_after_discards_result() {
        let m = method("isEmpty", "boolean", vec![]);
        let rendered = JavaRenderer::default()
            .render_method(&delegate_method(&m, "cart", DelegationPolicy::FallbackAfter));
        let expected = "\
public boolean isEmpty() {
    if (cart != null) {
        cart.isEmpty();
    }
    return false;
}
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn void_has_no_fallback_under_both_policies() {
        let m = method("clear", "void", vec![]);
        let guarded = delegate_method(&m, "cart", DelegationPolicy::GuardedReturn);
        let after = delegate_method(&m, "cart", DelegationPolicy::FallbackAfter);
        assert_eq!(guarded.body, after.body);
        assert_eq!(guarded.body.len(), 1);
    }
}
