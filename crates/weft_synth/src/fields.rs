//! Per-field procedure synthesis shared by population and recollection.

use std::collections::BTreeMap;

use tracing::{debug, warn};
use weft_codemodel::{Block, ClassId, Expr};
use weft_common::WeftResult;
use weft_model::{ComponentId, DirectiveKind, Member, MemberId, ReferenceMember};

use crate::bindings::{segments, Slot};
use crate::names::Flavor;
use crate::procedure::{
    chain_body, declare_listener, forwarding_listener, guarded, listener_body, procedure,
    signal_done,
};
use crate::resolver::Resolution;
use crate::session::BuildSession;

/// One synthesizer's view of the field procedures it owns.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldProcedures {
    pub(crate) flavor: Flavor,
    /// The local kind followed by its externally overridden counterpart.
    pub(crate) kinds: &'static [DirectiveKind; 2],
}

impl FieldProcedures {
    fn overridden(&self) -> &DirectiveKind {
        &self.kinds[1]
    }

    /// Emits `_<verb>_<member>` for every virtual of `resolution` and the
    /// whole-component `_<verb>_this`. `local_body` builds the body of a
    /// field populated or recollected in place; `None` skips the field. A
    /// method reached through a reference is invoked by its procedure.
    ///
    /// Returns the number of member procedures emitted.
    pub(crate) fn synthesize<F>(
        self,
        session: &mut BuildSession<'_>,
        component: ComponentId,
        resolution: &Resolution,
        mut local_body: F,
    ) -> WeftResult<usize>
    where
        F: FnMut(
            &mut BuildSession<'_>,
            ClassId,
            ComponentId,
            &Member,
            Option<&str>,
        ) -> Option<Block>,
    {
        let flavor = self.flavor;
        let program = session.program();
        let host = program.component(component);
        let class = session.class_of(component);
        let mut procedures = Vec::new();
        let mut references = Vec::new();

        for virtual_member in resolution.of_kinds(self.kinds) {
            let member = program.member(virtual_member.member);
            session.bind(component, virtual_member)?;
            let name = flavor.procedure(Some(&member.name));
            match virtual_member.reference {
                ReferenceMember::SelfRef if virtual_member.kind == *self.overridden() => {
                    let listener = flavor.listener_field(Some(&member.name));
                    if session.claim_structure(component, &listener) {
                        let generated = session.code_mut().class_mut(class);
                        declare_listener(generated, flavor, Some(&member.name));
                        let body = listener_body(flavor, Some(&member.name));
                        generated.add_method(procedure(name.clone(), body));
                    }
                }
                ReferenceMember::SelfRef if member.is_method() => continue,
                ReferenceMember::SelfRef => {
                    let Some(body) = local_body(session, class, component, member, None) else {
                        continue;
                    };
                    session.code_mut().class_mut(class).add_method(procedure(name.clone(), body));
                }
                ReferenceMember::Field(field) => {
                    let body = if member.is_method() {
                        if !member.params().is_empty() {
                            debug!(member = %member.key(), "method takes arguments; not invoked");
                            continue;
                        }
                        Some(invoke_body(&member.name))
                    } else {
                        let reference = program.member(field).name.as_str();
                        local_body(session, class, component, member, Some(reference))
                    };
                    let Some(body) = body else {
                        continue;
                    };
                    session.code_mut().class_mut(class).add_method(procedure(name.clone(), body));
                    register_listener(flavor, session, component, class, field, Some(&member.name));
                    if !references.contains(&field) {
                        references.push(field);
                    }
                }
            }
            procedures.push(name);
        }

        if procedures.is_empty() {
            return Ok(0);
        }
        for field in references {
            register_listener(flavor, session, component, class, field, None);
        }
        let body = if host.is_external() {
            if session.claim_structure(component, &flavor.listener_field(None)) {
                declare_listener(session.code_mut().class_mut(class), flavor, None);
            }
            listener_body(flavor, None)
        } else {
            chain_body(&procedures)
        };
        session
            .code_mut()
            .class_mut(class)
            .add_method(procedure(flavor.procedure(None), body));
        Ok(procedures.len())
    }
}

/// `try { method(); } catch (..) { .. }` followed by the done signal.
fn invoke_body(method: &str) -> Block {
    let call = Block::build(|b| {
        b.invoke(None, method, vec![]);
    });
    Block::build(|b| guarded(b, call, signal_done))
}

/// In the host's `init_`, registers `this` as the listener of `target` on
/// the instance held by `reference`: `if (r != null) ((R_) r).setPopulateX(..)`.
fn register_listener(
    flavor: Flavor,
    session: &mut BuildSession<'_>,
    host: ComponentId,
    class: ClassId,
    reference: MemberId,
    target: Option<&str>,
) {
    let setter = flavor.listener_setter(target);
    if !session.link_once(host, reference, &setter) {
        return;
    }
    let options = session.options();
    let field = session.program().member(reference);
    let declared = field.declared_type().to_string();
    let receiver = if options.is_generated_name(&declared) {
        Expr::name(field.name.clone())
    } else {
        let generated = field
            .declared_type()
            .erasure()
            .map(|ty| options.generated_name(ty))
            .unwrap_or(declared);
        Expr::name(field.name.clone()).cast(generated)
    };
    let listener = forwarding_listener(flavor, &flavor.procedure(target));
    let init = session.code_mut().class_mut(class).init_block();
    init.if_then(Expr::name(field.name.clone()).ne_null(), |b| {
        b.expr(receiver.call(setter, vec![listener]));
    });
}

/// Slots bound to `member` in `host`, logged when one of `kinds` on the
/// member carries the debug flag.
pub(crate) fn slots_of(
    session: &BuildSession<'_>,
    host: ComponentId,
    member: &Member,
    kinds: &[DirectiveKind],
) -> BTreeMap<String, Slot> {
    let host_name = &session.program().component(host).name;
    let slots = session.hierarchy().slots(host_name, &member.name);
    let debug_requested = member
        .directives
        .iter()
        .any(|d| kinds.contains(&d.kind) && d.flags.debug);
    if debug_requested {
        let table: Vec<String> = slots
            .iter()
            .map(|(path, slot)| format!("{path} -> {} ({})", slot.element_id, slot.declared_type))
            .collect();
        warn!(component = %host_name, field = %member.name, table = ?table, "leaf path table");
    }
    slots
}

/// Whether one of `kinds` on `member` carries the validate flag.
pub(crate) fn validation_requested(member: &Member, kinds: &[DirectiveKind]) -> bool {
    member
        .directives
        .iter()
        .any(|d| kinds.contains(&d.kind) && d.flags.validate)
}

/// Leaf paths split into single-segment ones and the rest grouped by their
/// first segment.
pub(crate) fn group_paths(
    slots: &BTreeMap<String, Slot>,
) -> (Vec<(&str, &Slot)>, BTreeMap<&str, Vec<(&str, &Slot)>>) {
    let mut direct = Vec::new();
    let mut groups: BTreeMap<&str, Vec<(&str, &Slot)>> = BTreeMap::new();
    for (path, slot) in slots {
        let segs = segments(path);
        match segs.first() {
            Some(first) if segs.len() > 1 => {
                groups.entry(*first).or_default().push((path.as_str(), slot))
            }
            _ => direct.push((path.as_str(), slot)),
        }
    }
    (direct, groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_model::TypeRef;

    #[test]
    fn paths_group_by_first_segment() {
        let mut slots = BTreeMap::new();
        slots.insert("name".to_string(), Slot::view("name", TypeRef::string()));
        slots.insert("address.street".to_string(), Slot::view("street", TypeRef::string()));
        slots.insert("address.city.zip".to_string(), Slot::view("zip", "int"));
        let (direct, groups) = group_paths(&slots);
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].0, "name");
        assert_eq!(groups.len(), 1);
        let address: Vec<&str> = groups["address"].iter().map(|(p, _)| *p).collect();
        assert_eq!(address, ["address.city.zip", "address.street"]);
    }
}
