//! The directive registry: which synthesizer handles which directive kind.
//!
//! Synthesizers are registered at construction time and run in registration
//! order for every component: delegation first, then population, then
//! recollection, so structures a later synthesizer wires into already exist.

use std::collections::BTreeSet;

use weft_common::WeftResult;
use weft_model::{ComponentId, DirectiveKind};

use crate::delegation::DelegationSynthesizer;
use crate::options::SynthOptions;
use crate::population::PopulationSynthesizer;
use crate::recollection::RecollectionSynthesizer;
use crate::resolver::Resolution;
use crate::session::BuildSession;

/// One synthesis pattern, applied to a component's resolved virtual members.
pub trait Synthesizer {
    /// Short kebab-case name, e.g. `delegation`.
    fn name(&self) -> &str;

    /// What the synthesizer generates.
    fn description(&self) -> &str;

    /// Directive kinds whose virtual members this synthesizer consumes.
    fn kinds(&self) -> &[DirectiveKind];

    /// Emits into the generated class of `component`.
    fn synthesize(
        &self,
        session: &mut BuildSession<'_>,
        component: ComponentId,
        resolution: &Resolution,
    ) -> WeftResult<()>;
}

/// Maps directive kinds to the synthesizers that handle them.
pub struct DirectiveRegistry {
    synthesizers: Vec<Box<dyn Synthesizer>>,
    host_directives: BTreeSet<String>,
}

impl DirectiveRegistry {
    /// A registry with the builtin synthesizers.
    pub fn new(options: &SynthOptions) -> Self {
        let mut registry = Self::empty(options);
        register_builtin_synthesizers(&mut registry);
        registry
    }

    /// A registry with no synthesizers, recognizing `options.host_directives`.
    pub fn empty(options: &SynthOptions) -> Self {
        Self {
            synthesizers: Vec::new(),
            host_directives: options.host_directives.clone(),
        }
    }

    /// Registers a synthesizer after the existing ones.
    pub fn register(&mut self, synthesizer: Box<dyn Synthesizer>) {
        self.synthesizers.push(synthesizer);
    }

    /// Returns the number of registered synthesizers.
    pub fn synthesizer_count(&self) -> usize {
        self.synthesizers.len()
    }

    /// Registered synthesizers in run order.
    pub fn synthesizers(&self) -> impl Iterator<Item = &dyn Synthesizer> {
        self.synthesizers.iter().map(|s| s.as_ref())
    }

    /// The synthesizer consuming `kind`, if any.
    pub fn handler_of(&self, kind: &DirectiveKind) -> Option<&dyn Synthesizer> {
        self.synthesizers()
            .find(|s| s.kinds().contains(kind))
    }

    /// Returns `true` if some synthesizer consumes `kind`, or `kind` is a
    /// configured host directive.
    pub fn recognizes(&self, kind: &DirectiveKind) -> bool {
        match kind {
            DirectiveKind::Host(name) => self.host_directives.contains(name),
            other => self.handler_of(other).is_some(),
        }
    }

    /// Runs every synthesizer on `component`.
    pub fn run(
        &self,
        session: &mut BuildSession<'_>,
        component: ComponentId,
        resolution: &Resolution,
    ) -> WeftResult<()> {
        for synthesizer in &self.synthesizers {
            tracing::trace!(synthesizer = synthesizer.name(), "running synthesizer");
            synthesizer.synthesize(session, component, resolution)?;
        }
        Ok(())
    }
}

/// Registers delegation, population and recollection, in that order.
pub fn register_builtin_synthesizers(registry: &mut DirectiveRegistry) {
    registry.register(Box::new(DelegationSynthesizer));
    registry.register(Box::new(PopulationSynthesizer));
    registry.register(Box::new(RecollectionSynthesizer));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_register_in_order() {
        let registry = DirectiveRegistry::new(&SynthOptions::default());
        let names: Vec<&str> = registry.synthesizers().map(|s| s.name()).collect();
        assert_eq!(names, vec!["delegation", "population", "recollection"]);
    }

    #[test]
    fn kinds_map_to_handlers() {
        let registry = DirectiveRegistry::new(&SynthOptions::default());
        let handler = |kind: DirectiveKind| registry.handler_of(&kind).map(|s| s.name());
        assert_eq!(handler(DirectiveKind::External), Some("delegation"));
        assert_eq!(handler(DirectiveKind::Populate), Some("population"));
        assert_eq!(handler(DirectiveKind::Recollect), Some("recollection"));
        assert_eq!(handler(DirectiveKind::AfterViews), None);
    }

    #[test]
    fn host_directives_come_from_options() {
        let mut options = SynthOptions::default();
        options.host_directives.insert("Action".to_string());
        let registry = DirectiveRegistry::new(&options);
        assert!(registry.recognizes(&DirectiveKind::Host("Action".to_string())));
        assert!(!registry.recognizes(&DirectiveKind::Host("Event".to_string())));
        assert!(!registry.recognizes(&DirectiveKind::NonExternal));
    }

    #[test]
    fn empty_registry_recognizes_nothing_builtin() {
        let registry = DirectiveRegistry::empty(&SynthOptions::default());
        assert_eq!(registry.synthesizer_count(), 0);
        assert!(!registry.recognizes(&DirectiveKind::External));
    }
}
