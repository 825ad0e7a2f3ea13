//! Calls into generated population procedures from an action body.

use weft_codemodel::{Block, Expr};
use weft_model::{ComponentId, DirectiveKind, Member, Program};

use crate::codes;
use crate::error::MemberError;
use crate::names::{Flavor, RUN};

const FLAVOR: Flavor = Flavor::Populate;

/// Builds the block that populates `field` of `component`, or the whole
/// component for `None`, with the continuations `on_done` and `on_failed`.
///
/// Listener-overridden targets call the listener when one is registered and
/// otherwise signal `on_done`. Other targets invoke their `_populate_*`
/// procedure directly.
pub fn populate_call(
    program: &Program,
    component: ComponentId,
    field: Option<&str>,
    on_done: Expr,
    on_failed: Expr,
) -> Result<Block, MemberError> {
    let host = program.component(component);
    let overridden = match field {
        None => host.is_external(),
        Some(name) => {
            let member = program
                .find_field(component, name)
                .map(|id| program.member(id))
                .filter(|m| is_populated(m))
                .ok_or_else(|| {
                    MemberError::misuse_with_help(
                        codes::POPULATE_UNDIRECTED,
                        format!(
                            "field `{name}` of `{}` carries no population directive",
                            host.name
                        ),
                        format!("add `{}` to the field", DirectiveKind::Populate),
                    )
                })?;
            host.is_external() || is_overridden(member)
        }
    };

    let block = if overridden {
        let listener = Expr::name(FLAVOR.listener_field(field));
        let forwarded = vec![on_done.clone(), on_failed];
        Block::build(|b| {
            b.if_then_else(
                listener.clone().ne_null(),
                |b| {
                    b.invoke(Some(listener), FLAVOR.listener_method(), forwarded);
                },
                |b| {
                    b.if_then(on_done.clone().ne_null(), |b| {
                        b.invoke(Some(on_done), RUN, vec![]);
                    });
                },
            );
        })
    } else {
        Block::build(|b| {
            b.invoke(None, &FLAVOR.procedure(field), vec![on_done, on_failed]);
        })
    };
    Ok(block)
}

fn is_populated(member: &Member) -> bool {
    member.has_directive(&DirectiveKind::Populate)
        || member.has_directive(&DirectiveKind::ExternalPopulate)
}

fn is_overridden(member: &Member) -> bool {
    member.has_directive(&DirectiveKind::ExternalPopulate)
        || member
            .directive(&DirectiveKind::Populate)
            .is_some_and(|d| d.flags.external)
}
