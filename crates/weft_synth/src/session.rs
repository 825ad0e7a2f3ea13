//! Per-pass build state shared by the synthesizers.

use std::collections::{HashMap, HashSet};

use weft_codemodel::{ClassId, CodeModel};
use weft_common::{InternalError, WeftResult};
use weft_diagnostics::{Diagnostic, DiagnosticSink, Target};
use weft_model::{ComponentId, Member, MemberId, Program, ReferenceMember, VirtualMember};

use crate::bindings::ViewHierarchy;
use crate::error::MemberError;
use crate::options::SynthOptions;

/// State of one build pass over one program.
///
/// Owns the code model every generated class is emitted into, the
/// diagnostics of the pass, and the tables that must not leak across
/// passes: which reference each virtual member was bound to, and which
/// listener registrations and structures were already emitted.
pub struct BuildSession<'p> {
    program: &'p Program,
    options: &'p SynthOptions,
    hierarchy: &'p dyn ViewHierarchy,
    sink: DiagnosticSink,
    code: CodeModel,
    bound: HashMap<(ComponentId, MemberId), ReferenceMember>,
    linked: HashSet<(ComponentId, MemberId, String)>,
    structures: HashSet<(ComponentId, String)>,
}

impl<'p> BuildSession<'p> {
    /// A fresh session.
    pub fn new(
        program: &'p Program,
        options: &'p SynthOptions,
        hierarchy: &'p dyn ViewHierarchy,
    ) -> Self {
        Self {
            program,
            options,
            hierarchy,
            sink: DiagnosticSink::new(),
            code: CodeModel::new(),
            bound: HashMap::new(),
            linked: HashSet::new(),
            structures: HashSet::new(),
        }
    }

    /// The program being synthesized.
    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// The options of the pass.
    pub fn options(&self) -> &'p SynthOptions {
        self.options
    }

    /// The view-hierarchy oracle.
    pub fn hierarchy(&self) -> &'p dyn ViewHierarchy {
        self.hierarchy
    }

    /// The diagnostics of the pass.
    pub fn sink(&self) -> &DiagnosticSink {
        &self.sink
    }

    /// The generated classes.
    pub fn code(&self) -> &CodeModel {
        &self.code
    }

    /// The generated classes, mutably.
    pub fn code_mut(&mut self) -> &mut CodeModel {
        &mut self.code
    }

    /// Ends the session, returning the code model and every diagnostic.
    pub fn finish(self) -> (CodeModel, Vec<Diagnostic>) {
        let diagnostics = self.sink.take_all();
        (self.code, diagnostics)
    }

    /// The generated class of `component`, created on first use.
    pub fn class_of(&mut self, component: ComponentId) -> ClassId {
        let source = self.program.component(component);
        let name = self.options.generated_for(source);
        self.code.class_for(&name, &source.name)
    }

    /// Binds `virtual_member` in `host`. Binding the same member again to
    /// the same reference is a no-op; to another reference it violates the
    /// resolver's invariant and fails the pass.
    pub fn bind(&mut self, host: ComponentId, virtual_member: &VirtualMember) -> WeftResult<()> {
        let key = (host, virtual_member.member);
        match self.bound.get(&key) {
            Some(existing) if *existing != virtual_member.reference => {
                let member = self.program.member(virtual_member.member);
                Err(InternalError::new(format!(
                    "virtual member `{}` in `{}` re-resolved from {existing:?} to {:?}",
                    member.key(),
                    self.program.component(host).name,
                    virtual_member.reference
                )))
            }
            Some(_) => Ok(()),
            None => {
                self.bound.insert(key, virtual_member.reference);
                Ok(())
            }
        }
    }

    /// The reference `member` was bound to in `host`.
    pub fn reference_of(&self, host: ComponentId, member: MemberId) -> Option<ReferenceMember> {
        self.bound.get(&(host, member)).copied()
    }

    /// Claims the registration of `setter` on `reference` in `host`.
    /// Returns `false` if it was already emitted this pass.
    pub fn link_once(&mut self, host: ComponentId, reference: MemberId, setter: &str) -> bool {
        self.linked.insert((host, reference, setter.to_string()))
    }

    /// Claims the listener-bearing structure `name` in `component`.
    /// Returns `false` if it was already emitted this pass.
    pub fn claim_structure(&mut self, component: ComponentId, name: &str) -> bool {
        self.structures.insert((component, name.to_string()))
    }

    /// The diagnostic target naming `member`.
    pub fn member_target(&self, member: MemberId) -> Target {
        member_target(self.program.member(member))
    }

    /// The diagnostic target naming `component`.
    pub fn component_target(&self, component: ComponentId) -> Target {
        Target::component(self.program.component(component).name.clone())
    }

    /// Reports a member-scoped failure.
    pub fn report(&self, error: MemberError, target: Target) {
        self.sink.emit(error.into_diagnostic(target));
    }
}

/// The diagnostic target naming `member`: `name` for fields, `name(types)`
/// for methods.
pub fn member_target(member: &Member) -> Target {
    let signature = if member.is_method() {
        let params: Vec<String> = member.params().iter().map(|p| p.ty.to_string()).collect();
        format!("{}({})", member.name, params.join(", "))
    } else {
        member.name.clone()
    };
    Target::member(member.owner.clone(), signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::StaticViewHierarchy;
    use weft_model::{
        ComponentSource, DirectiveKind, MemberSource, Param, ProgramSource,
    };

    fn program() -> Program {
        Program::from_source(
            ProgramSource::default().with_component(
                ComponentSource::new("com.shop.Checkout")
                    .with_member(MemberSource::field("cart", "com.shop.Cart"))
                    .with_member(MemberSource::field("backup", "com.shop.Cart"))
                    .with_member(
                        MemberSource::method(
                            "save",
                            "void",
                            vec![Param::new("name", "java.lang.String")],
                        )
                        .public(),
                    ),
            ),
        )
        .unwrap()
    }

    #[test]
    fn rebinding_to_another_reference_is_internal_error() {
        let program = program();
        let options = SynthOptions::default();
        let hierarchy = StaticViewHierarchy::new();
        let mut session = BuildSession::new(&program, &options, &hierarchy);
        let host = program.component_by_name("com.shop.Checkout").unwrap();
        let cart = program.find_field(host, "cart").unwrap();
        let backup = program.find_field(host, "backup").unwrap();
        let save = program.find_methods(host, "save").next().unwrap().0;

        let first =
            VirtualMember::new(save, ReferenceMember::Field(cart), DirectiveKind::External);
        session.bind(host, &first).unwrap();
        session.bind(host, &first).unwrap();
        assert_eq!(session.reference_of(host, save), Some(ReferenceMember::Field(cart)));

        let second =
            VirtualMember::new(save, ReferenceMember::Field(backup), DirectiveKind::External);
        let err = session.bind(host, &second).unwrap_err();
        assert!(err.to_string().contains("re-resolved"));
    }

    #[test]
    fn links_and_structures_are_claimed_once() {
        let program = program();
        let options = SynthOptions::default();
        let hierarchy = StaticViewHierarchy::new();
        let mut session = BuildSession::new(&program, &options, &hierarchy);
        let host = program.component_by_name("com.shop.Checkout").unwrap();
        let cart = program.find_field(host, "cart").unwrap();
        assert!(session.link_once(host, cart, "setPopulateThis"));
        assert!(!session.link_once(host, cart, "setPopulateThis"));
        assert!(session.link_once(host, cart, "setRecollectThis"));
        assert!(session.claim_structure(host, "populateThis"));
        assert!(!session.claim_structure(host, "populateThis"));
    }

    #[test]
    fn class_of_uses_suffix_and_superclass() {
        let program = program();
        let options = SynthOptions::default();
        let hierarchy = StaticViewHierarchy::new();
        let mut session = BuildSession::new(&program, &options, &hierarchy);
        let host = program.component_by_name("com.shop.Checkout").unwrap();
        let id = session.class_of(host);
        assert_eq!(session.class_of(host), id);
        let class = session.code().class(id);
        assert_eq!(class.name, "com.shop.Checkout_");
        assert_eq!(class.superclass, "com.shop.Checkout");
    }

    #[test]
    fn member_targets_include_signature() {
        let program = program();
        let host = program.component_by_name("com.shop.Checkout").unwrap();
        let save = program.find_methods(host, "save").next().unwrap().1;
        assert_eq!(
            member_target(save).to_string(),
            "com.shop.Checkout#save(java.lang.String)"
        );
    }
}
