//! Resolution of directive-bearing members into virtual members.
//!
//! A component's own eligible members resolve against the implicit `this`.
//! Each reference field (a field carrying `External` whose type is an
//! external component) contributes the eligible members of the referenced
//! component, resolved against that field.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use weft_common::{InternalError, WeftResult};
use weft_diagnostics::{Diagnostic, DiagnosticSink};
use weft_model::{
    Component, ComponentId, DirectiveKind, Member, MemberId, Program, ReferenceMember, TypeRef,
    VirtualMember,
};

use crate::codes;
use crate::error::MemberError;
use crate::registry::DirectiveRegistry;
use crate::session::member_target;

/// A reference field and the component it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// The field in the host component.
    pub field: MemberId,
    /// The referenced external component.
    pub target: ComponentId,
}

/// The virtual members of one component.
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The host component.
    pub component: ComponentId,
    /// Virtual members in resolution order: own members first, then each
    /// reference's members in field order.
    pub virtuals: Vec<VirtualMember>,
    /// Valid reference fields, in declaration order.
    pub references: Vec<Reference>,
}

impl Resolution {
    /// Returns `true` if nothing resolved.
    pub fn is_empty(&self) -> bool {
        self.virtuals.is_empty() && self.references.is_empty()
    }

    /// Virtual members of any of `kinds`.
    pub fn of_kinds<'a>(
        &'a self,
        kinds: &'a [DirectiveKind],
    ) -> impl Iterator<Item = &'a VirtualMember> + 'a {
        self.virtuals.iter().filter(move |v| kinds.contains(&v.kind))
    }

    /// The reference whose field is `field`.
    pub fn reference(&self, field: MemberId) -> Option<&Reference> {
        self.references.iter().find(|r| r.field == field)
    }

    /// Distinct referenced components, in first-reference order.
    pub fn upstream(&self) -> Vec<ComponentId> {
        let mut seen = HashSet::new();
        self.references
            .iter()
            .map(|r| r.target)
            .filter(|t| seen.insert(*t))
            .collect()
    }
}

type Signature = (String, Option<Vec<TypeRef>>);

fn signature(member: &Member) -> Signature {
    let key = member.key();
    (key.name, key.params)
}

/// Resolves components against the kinds a [`DirectiveRegistry`] handles.
pub struct VirtualMemberResolver<'a> {
    program: &'a Program,
    registry: &'a DirectiveRegistry,
}

impl<'a> VirtualMemberResolver<'a> {
    /// A resolver over `program`.
    pub fn new(program: &'a Program, registry: &'a DirectiveRegistry) -> Self {
        Self { program, registry }
    }

    /// The reference fields `component` declares that point at some
    /// component, valid or not. Used for ordering before resolution.
    pub fn referenced_components(&self, component: ComponentId) -> Vec<ComponentId> {
        self.program
            .members_of(component)
            .filter(|(_, m)| is_reference_field(m))
            .filter_map(|(_, m)| self.component_of(m))
            .collect()
    }

    /// Resolves `component`, reporting member misuse into `sink`.
    pub fn resolve(&self, component: ComponentId, sink: &DiagnosticSink) -> WeftResult<Resolution> {
        let host = self.program.component(component);
        let mut resolution = Resolution {
            component,
            virtuals: Vec::new(),
            references: Vec::new(),
        };
        let mut declared_methods: HashSet<Signature> = HashSet::new();
        let mut owners: HashMap<Signature, (MemberId, ReferenceMember)> = HashMap::new();

        for (id, member) in self.program.members_of(component) {
            if member.is_method() {
                declared_methods.insert(signature(member));
            }
            if let Err(err) = check_delegation_use(member) {
                sink.emit(err.into_diagnostic(member_target(member)));
                continue;
            }
            if is_reference_field(member) {
                match self.reference_target(member) {
                    Ok(target) => resolution.references.push(Reference { field: id, target }),
                    Err(err) => sink.emit(err.into_diagnostic(member_target(member))),
                }
                continue;
            }
            for kind in self.own_kinds(host, member) {
                owners.insert(signature(member), (id, ReferenceMember::SelfRef));
                resolution
                    .virtuals
                    .push(VirtualMember::new(id, ReferenceMember::SelfRef, kind));
            }
        }

        for reference in resolution.references.clone() {
            let through = ReferenceMember::Field(reference.field);
            let target = self.program.component(reference.target);
            for (id, member) in self.program.members_of(reference.target) {
                if member.owner != target.name {
                    return Err(InternalError::new(format!(
                        "member `{}` listed under component `{}`",
                        member.key(),
                        target.name
                    )));
                }
                if check_delegation_use(member).is_err() || is_reference_field(member) {
                    continue;
                }
                let kinds = self.referenced_kinds(member);
                if kinds.is_empty() {
                    continue;
                }
                let sig = signature(member);
                if member.is_method() && declared_methods.contains(&sig) {
                    debug!(
                        member = %member.key(),
                        host = %host.name,
                        "host declares method, not delegating"
                    );
                    continue;
                }
                match owners.get(&sig) {
                    Some((owner, reference)) if *owner != id || *reference != through => {
                        let shadowing = match reference.field() {
                            Some(field) => {
                                format!("reference `{}`", self.program.member(field).name)
                            }
                            None => format!("`{}` itself", host.name),
                        };
                        let field = self.program.member(reference_field(through)?);
                        sink.emit(
                            Diagnostic::warning(
                                codes::SHADOWED_DELEGATE,
                                format!(
                                    "`{}` is already synthesized through {shadowing}; \
                                     ignoring it through `{}`",
                                    member.name, field.name
                                ),
                                member_target(field),
                            )
                            .with_note(format!("underlying member: {}", member.key())),
                        );
                        continue;
                    }
                    _ => {}
                }
                owners.insert(sig, (id, through));
                for kind in kinds {
                    resolution.virtuals.push(VirtualMember::new(id, through, kind));
                }
            }
        }

        debug!(
            component = %host.name,
            virtuals = resolution.virtuals.len(),
            references = resolution.references.len(),
            "resolved component"
        );
        Ok(resolution)
    }

    fn component_of(&self, member: &Member) -> Option<ComponentId> {
        member
            .declared_type()
            .erasure()
            .and_then(|ty| self.program.component_of_type(ty))
    }

    fn reference_target(&self, member: &Member) -> Result<ComponentId, MemberError> {
        let ty = member.declared_type();
        let Some(target) = self.component_of(member) else {
            return Err(MemberError::misuse(
                codes::NOT_EXTERNAL_REFERENCE,
                format!(
                    "reference field `{}` has type `{ty}`, which is not a component",
                    member.name
                ),
            ));
        };
        let component = self.program.component(target);
        if !component.is_external() {
            return Err(MemberError::misuse_with_help(
                codes::NOT_EXTERNAL_REFERENCE,
                format!(
                    "reference field `{}` points at `{}`, which is not an external component",
                    member.name, component.name
                ),
                format!("mark `{}` with the External directive", component.name),
            ));
        }
        Ok(target)
    }

    fn own_kinds(&self, host: &Component, member: &Member) -> Vec<DirectiveKind> {
        if !is_eligible(member) {
            return Vec::new();
        }
        if member.is_method() {
            if !host.is_external() {
                return Vec::new();
            }
            return self.method_kind(member).into_iter().collect();
        }
        self.field_kinds(member, host.is_external())
    }

    fn referenced_kinds(&self, member: &Member) -> Vec<DirectiveKind> {
        if !is_eligible(member) {
            return Vec::new();
        }
        if member.is_method() {
            return self.method_kind(member).into_iter().collect();
        }
        self.field_kinds(member, true)
    }

    fn method_kind(&self, member: &Member) -> Option<DirectiveKind> {
        let skipped = [
            DirectiveKind::ExternalPopulate,
            DirectiveKind::ExternalRecollect,
            DirectiveKind::AfterInject,
            DirectiveKind::AfterViews,
        ];
        if skipped.iter().any(|kind| member.has_directive(kind)) {
            return None;
        }
        let kind = if member.has_directive(&DirectiveKind::Populate) {
            DirectiveKind::ExternalPopulate
        } else if member.has_directive(&DirectiveKind::Recollect) {
            DirectiveKind::ExternalRecollect
        } else if member.directives.iter().any(|d| match &d.kind {
            DirectiveKind::External => true,
            host @ DirectiveKind::Host(_) => self.registry.recognizes(host),
            _ => false,
        }) {
            DirectiveKind::External
        } else {
            return None;
        };
        self.registry.recognizes(&kind).then_some(kind)
    }

    fn field_kinds(&self, member: &Member, external_override: bool) -> Vec<DirectiveKind> {
        let pairs = [
            (DirectiveKind::Populate, DirectiveKind::ExternalPopulate),
            (DirectiveKind::Recollect, DirectiveKind::ExternalRecollect),
        ];
        let mut kinds = Vec::new();
        for (plain, external) in pairs {
            let overridden = match (member.directive(&plain), member.directive(&external)) {
                (_, Some(_)) => true,
                (Some(directive), None) => external_override || directive.flags.external,
                (None, None) => continue,
            };
            let kind = if overridden { external } else { plain };
            if self.registry.recognizes(&kind) {
                kinds.push(kind);
            }
        }
        kinds
    }
}

fn reference_field(reference: ReferenceMember) -> WeftResult<MemberId> {
    reference
        .field()
        .ok_or_else(|| {
            InternalError::new("virtual member through a reference has no reference field")
        })
}

/// A field carrying `External` names a reference.
pub fn is_reference_field(member: &Member) -> bool {
    member.is_field() && member.has_directive(&DirectiveKind::External)
}

fn is_eligible(member: &Member) -> bool {
    if member.is_static()
        || member.is_abstract()
        || member.has_directive(&DirectiveKind::NonExternal)
    {
        return false;
    }
    !member.is_method() || member.is_public()
}

/// Rejects explicit delegation directives where they cannot apply.
fn check_delegation_use(member: &Member) -> Result<(), MemberError> {
    if !member.has_directive(&DirectiveKind::External) {
        return Ok(());
    }
    if member.is_static() {
        return Err(MemberError::misuse_with_help(
            codes::STATIC_DELEGATE,
            format!("static member `{}` cannot be delegated", member.name),
            "remove `static` or the External directive",
        ));
    }
    if member.is_method() && !member.is_public() {
        return Err(MemberError::misuse(
            codes::NON_PUBLIC_DELEGATE,
            format!("method `{}` must be public to be delegated", member.name),
        ));
    }
    if member.is_method() && member.has_directive(&DirectiveKind::AfterInject) {
        return Err(MemberError::misuse(
            codes::DELEGATE_AFTER_INJECT,
            format!(
                "method `{}` runs after injection and cannot also be delegated",
                member.name
            ),
        ));
    }
    Ok(())
}
