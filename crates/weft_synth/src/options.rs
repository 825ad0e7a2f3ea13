//! Synthesis options lowered from `weft.toml`.

use std::collections::BTreeSet;

use serde::Serialize;
use weft_common::{ContentHash, InternalError, WeftResult};
use weft_config::{DelegationConfig, DelegationPolicy, UnsupportedTypePolicy, WeftConfig};
use weft_model::{Component, DirectiveKind};

/// Version tag written into cache manifests and stored artifacts.
pub const WEFT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the synthesizers read from configuration.
#[derive(Debug, Clone, Serialize)]
pub struct SynthOptions {
    /// Suffix forming a generated class name from its component's name.
    pub suffix: String,
    /// Directives of other processors that make a public method delegable.
    pub host_directives: BTreeSet<String>,
    /// Base class of bindable elements.
    pub element_class: String,
    /// Delegation policy per delegating kind.
    pub delegation: DelegationConfig,
    /// Reporting of slots whose type has no coercion.
    pub unsupported_types: UnsupportedTypePolicy,
    /// Discard every cache entry before the pass.
    #[serde(skip)]
    pub full_rebuild: bool,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self::from_config(&WeftConfig::for_project("weft"))
    }
}

impl SynthOptions {
    /// Lowers a parsed configuration.
    pub fn from_config(config: &WeftConfig) -> Self {
        Self {
            suffix: config.generation.suffix.clone(),
            host_directives: config.generation.host_directives.iter().cloned().collect(),
            element_class: config.generation.element_class.clone(),
            delegation: config.delegation.clone(),
            unsupported_types: config.recollect.unsupported_types,
            full_rebuild: config.cache.full_rebuild,
        }
    }

    /// The generated class name for the component named `name`.
    pub fn generated_name(&self, name: &str) -> String {
        format!("{name}{}", self.suffix)
    }

    /// The generated class name for `component`.
    pub fn generated_for(&self, component: &Component) -> String {
        self.generated_name(&component.name)
    }

    /// Returns `true` if `ty` already names a generated class.
    pub fn is_generated_name(&self, ty: &str) -> bool {
        ty.ends_with(&self.suffix)
    }

    /// Digest of every option that shapes generated code.
    pub fn digest(&self) -> WeftResult<ContentHash> {
        let bytes = serde_json::to_vec(self)
            .map_err(|e| InternalError::new(format!("cannot digest synthesis options: {e}")))?;
        Ok(ContentHash::from_bytes(&bytes))
    }

    /// The delegation policy for `kind`.
    pub fn policy_for(&self, kind: &DirectiveKind) -> DelegationPolicy {
        match kind {
            DirectiveKind::ExternalPopulate => self.delegation.external_populate,
            DirectiveKind::ExternalRecollect => self.delegation.external_recollect,
            _ => self.delegation.external,
        }
    }
}
