//! Model-to-view population procedures.
//!
//! Every population field gets `_populate_<field>(onDone, onFailed)` in its
//! component's generated class:
//!
//! - externally overridden fields (explicit `external` flag, or any field of
//!   an external component) get a settable listener and a procedure that
//!   defers to it, or signals done when none is registered;
//! - other fields populate their bound elements inline inside a guarded
//!   block, then signal done;
//! - fields reached through a reference are populated by the host, and the
//!   host registers itself as the referenced instance's listener in `init_`.
//!
//! `_populate_this` runs the component's field procedures in turn, or defers
//! to the component listener for external components.

use tracing::debug;
use weft_codemodel::{Block, ClassId, MethodDecl};
use weft_common::WeftResult;
use weft_diagnostics::Target;
use weft_model::{ComponentId, DirectiveKind, Member, Modifier, TypeRef};

use crate::access::{element, read_element, write_element, FieldRoot};
use crate::bindings::{Slot, SlotKind};
use crate::coerce::{coerce_or_report, is_leaf_type};
use crate::fields::{group_paths, slots_of, FieldProcedures};
use crate::names::Flavor;
use crate::procedure::{guarded, signal_done};
use crate::registry::Synthesizer;
use crate::resolver::Resolution;
use crate::session::{member_target, BuildSession};

const KINDS: &[DirectiveKind; 2] = &[DirectiveKind::Populate, DirectiveKind::ExternalPopulate];
const FLAVOR: Flavor = Flavor::Populate;
const PROCEDURES: FieldProcedures = FieldProcedures {
    flavor: FLAVOR,
    kinds: KINDS,
};

/// Generates population procedures and listener wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct PopulationSynthesizer;

impl Synthesizer for PopulationSynthesizer {
    fn name(&self) -> &str {
        "population"
    }

    fn description(&self) -> &str {
        "generates listener-overridable model-to-view population procedures"
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
        let emitted = PROCEDURES.synthesize(
            session,
            component,
            resolution,
            |s, class, host, member, through| {
                Some(population_body(s, class, host, member, through))
            },
        )?;
        if emitted > 0 {
            let name = &session.program().component(component).name;
            debug!(component = %name, fields = emitted, "population synthesized");
        }
        Ok(())
    }
}

fn population_body(
    session: &mut BuildSession<'_>,
    class: ClassId,
    host: ComponentId,
    member: &Member,
    through: Option<&str>,
) -> Block {
    let target = member_target(member);
    let slots = slots_of(session, host, member, KINDS);
    let root = FieldRoot::new(through, &member.name);

    let mut body = Block::new();
    if is_leaf_type(member.declared_type()) {
        if let Some(slot) = slots.get(&member.name) {
            populate_leaf(session, &mut body, &target, &root, None, slot);
        }
    } else {
        let (direct, groups) = group_paths(&slots);
        for (path, slot) in direct {
            populate_leaf(session, &mut body, &target, &root, Some(path), slot);
        }
        for (group, leaves) in groups {
            let helper = FLAVOR.group_procedure(&member.name, group);
            let mut helper_body = Block::new();
            for (path, slot) in leaves {
                populate_leaf(session, &mut helper_body, &target, &root, Some(path), slot);
            }
            let method = MethodDecl::new(Modifier::Private, TypeRef::Void, helper.clone(), vec![])
                .with_body(helper_body);
            session.code_mut().class_mut(class).add_method(method);
            body.invoke(None, &helper, vec![]);
        }
    }
    if slots.is_empty() {
        debug!(%target, "no bound elements; population only signals completion");
    }

    Block::build(|b| guarded(b, body, signal_done))
}

fn populate_leaf(
    session: &BuildSession<'_>,
    b: &mut Block,
    target: &Target,
    root: &FieldRoot,
    path: Option<&str>,
    slot: &Slot,
) {
    let leaf = match path {
        Some(path) => root.path(path),
        None => root.whole(),
    };
    let element_guard = vec![element(slot).ne_null()];
    match slot.kind {
        SlotKind::View => {
            let value_guard = slot.declared_type.is_reference().then(|| leaf.read().ne_null());
            leaf.guarded(b, element_guard, |b| match value_guard {
                Some(value_guard) => {
                    b.if_then(value_guard, |b| {
                        b.expr(write_element(slot, leaf.read()));
                    });
                }
                None => {
                    b.expr(write_element(slot, leaf.read()));
                }
            });
        }
        SlotKind::Input => {
            let path_name = path.unwrap_or(&slot.element_id);
            let Some(value) = coerce_or_report(
                &slot.declared_type,
                read_element(slot),
                session.options().unsupported_types,
                session.sink(),
                target,
                path_name,
            ) else {
                return;
            };
            leaf.guarded(b, element_guard, |b| {
                b.push(leaf.write(value));
            });
        }
    }
}
