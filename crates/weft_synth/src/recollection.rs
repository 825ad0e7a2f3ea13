//! View-to-model recollection procedures.
//!
//! Mirrors population: every recollection field gets
//! `_recollect_<field>(onDone, onFailed)`, listener-overridable fields defer
//! to their listener, and `_recollect_this` chains the field procedures.
//! A locally recollected field reads each bound element, coerces the raw
//! value to the slot's declared type and assigns it through a null-guarded
//! path. With the validate flag the host is validated first and recollection
//! only runs once validation succeeds.

use std::collections::BTreeMap;

use tracing::debug;
use weft_codemodel::{Block, ClassId, Expr};
use weft_common::WeftResult;
use weft_model::{ComponentId, DirectiveKind, Member, Param, Program};

use crate::access::{element, read_element, FieldRoot};
use crate::bindings::Slot;
use crate::codes;
use crate::coerce::{coerce_or_report, is_leaf_type};
use crate::error::MemberError;
use crate::fields::{slots_of, validation_requested, FieldProcedures};
use crate::names::{
    Flavor, ON_FAILED, ON_FAILED_METHOD, READ_FIELD, RUN, RUNNABLE, THROWABLE, VALIDATE, VALIDATOR,
};
use crate::procedure::{guarded, signal_done, signal_failed};
use crate::registry::Synthesizer;
use crate::resolver::Resolution;
use crate::session::{member_target, BuildSession};

const KINDS: &[DirectiveKind; 2] = &[DirectiveKind::Recollect, DirectiveKind::ExternalRecollect];
const PROCEDURES: FieldProcedures = FieldProcedures {
    flavor: Flavor::Recollect,
    kinds: KINDS,
};

const COLLECTION: &str = "java.util.Collection";
const FAILURE_PARAM: &str = "e";

/// Generates recollection procedures and listener wiring.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecollectionSynthesizer;

impl Synthesizer for RecollectionSynthesizer {
    fn name(&self) -> &str {
        "recollection"
    }

    fn description(&self) -> &str {
        "generates listener-overridable view-to-model recollection procedures"
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
                match recollection_body(s, class, host, member, through) {
                    Ok(body) => Some(body),
                    Err(err) => {
                        s.report(err, member_target(member));
                        None
                    }
                }
            },
        )?;
        if emitted > 0 {
            let name = &session.program().component(component).name;
            debug!(component = %name, fields = emitted, "recollection synthesized");
        }
        Ok(())
    }
}

fn recollection_body(
    session: &mut BuildSession<'_>,
    _class: ClassId,
    host: ComponentId,
    member: &Member,
    through: Option<&str>,
) -> Result<Block, MemberError> {
    let program = session.program();
    check_field(program, member)?;
    let slots = slots_of(session, host, member, KINDS);
    let leaf = is_leaf_type(member.declared_type());
    if leaf && !slots.contains_key(&member.name) {
        return Err(MemberError::misuse_with_help(
            codes::RECOLLECT_UNBOUND,
            format!("no element is bound to `{}`", member.name),
            format!("bind an element with id `{}` in the host view", member.name),
        ));
    }
    check_read_field(program, host, &slots, session.options().element_class.as_str())?;

    let target = member_target(member);
    let root = FieldRoot::new(through, &member.name);
    let mut body = Block::new();
    let recollect = |b: &mut Block, path: Option<&str>, slot: &Slot| {
        let leaf = match path {
            Some(path) => root.path(path),
            None => root.whole(),
        };
        let Some(value) = coerce_or_report(
            &slot.declared_type,
            read_element(slot),
            session.options().unsupported_types,
            session.sink(),
            &target,
            path.unwrap_or(&member.name),
        ) else {
            return;
        };
        leaf.guarded(b, vec![element(slot).ne_null()], |b| {
            b.push(leaf.write(value));
        });
    };
    if leaf {
        if let Some(slot) = slots.get(&member.name) {
            recollect(&mut body, None, slot);
        }
    } else {
        for (path, slot) in &slots {
            recollect(&mut body, Some(path.as_str()), slot);
        }
    }

    if validation_requested(member, KINDS) {
        return Ok(validated(body));
    }
    Ok(Block::build(|b| guarded(b, body, signal_done)))
}

/// `new Validator(this).validate(<recollect, then done>, <failed>)`.
fn validated(body: Block) -> Block {
    let on_valid = Expr::lambda(
        RUNNABLE,
        RUN,
        Vec::new(),
        Block::build(|b| guarded(b, body, signal_done)),
    );
    let on_invalid = Expr::lambda(
        ON_FAILED,
        ON_FAILED_METHOD,
        vec![Param::new(FAILURE_PARAM, THROWABLE)],
        Block::build(|b| signal_failed(b, Expr::name(FAILURE_PARAM))),
    );
    Block::build(|b| {
        let validator = Expr::new_object(VALIDATOR, vec![Expr::This]);
        b.expr(validator.call(VALIDATE, vec![on_valid, on_invalid]));
    })
}

fn check_field(program: &Program, member: &Member) -> Result<(), MemberError> {
    if member.is_private() {
        return Err(MemberError::misuse_with_help(
            codes::RECOLLECT_PRIVATE,
            format!("cannot recollect into private field `{}`", member.name),
            "make the field package-visible",
        ));
    }
    let ty = member.declared_type();
    if ty.erasure().is_some_and(|name| program.is_subtype(name, COLLECTION)) {
        return Err(MemberError::misuse(
            codes::RECOLLECT_COLLECTION,
            format!("cannot recollect into collection field `{}` of type `{ty}`", member.name),
        ));
    }
    Ok(())
}

/// A declared `readField` must be `String readField(E element)` with `E` an
/// element type. Non-textual slots require one.
fn check_read_field(
    program: &Program,
    host: ComponentId,
    slots: &BTreeMap<String, Slot>,
    element_class: &str,
) -> Result<(), MemberError> {
    let mut declared = false;
    for (_, method) in program.find_methods(host, READ_FIELD) {
        declared = true;
        let params = method.params();
        let well_formed = method.declared_type().is_string()
            && params.len() == 1
            && params[0]
                .ty
                .erasure()
                .is_some_and(|ty| program.is_subtype(ty, element_class));
        if !well_formed {
            return Err(MemberError::misuse_with_help(
                codes::READ_FIELD_SIGNATURE,
                format!("`{READ_FIELD}` in `{}` has the wrong signature", method.owner),
                format!("declare it as `String {READ_FIELD}({element_class} element)`"),
            ));
        }
    }
    if !declared {
        if let Some(slot) = slots.values().find(|s| !s.textual) {
            return Err(MemberError::misuse_with_help(
                codes::READ_FIELD_SIGNATURE,
                format!(
                    "element `{}` is not textual and `{}` declares no `{READ_FIELD}`",
                    slot.element_id,
                    program.component(host).name
                ),
                format!("declare `String {READ_FIELD}({element_class} element)`"),
            ));
        }
    }
    Ok(())
}
