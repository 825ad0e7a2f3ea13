//! Configuration types deserialized from `weft.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// The top-level configuration parsed from `weft.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeftConfig {
    /// Project metadata.
    pub project: ProjectMeta,
    /// Naming of generated classes and recognised host directives.
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Delegation policy per directive kind.
    #[serde(default)]
    pub delegation: DelegationConfig,
    /// Recollection reporting options.
    #[serde(default)]
    pub recollect: RecollectConfig,
    /// Incremental cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl WeftConfig {
    /// A configuration with every section at its default, for the named project.
    pub fn for_project(name: impl Into<String>) -> Self {
        Self {
            project: ProjectMeta {
                name: name.into(),
                description: String::new(),
            },
            generation: GenerationConfig::default(),
            delegation: DelegationConfig::default(),
            recollect: RecollectConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Core project metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// A brief description of the project.
    #[serde(default)]
    pub description: String,
}

/// Generated-class naming and directive recognition.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GenerationConfig {
    /// Suffix appended to a component's qualified name to form its generated class.
    #[serde(default = "default_suffix")]
    pub suffix: String,
    /// Directives owned by other processors that make a public method delegable.
    ///
    /// Accepts a single string or a list of strings.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub host_directives: Vec<String>,
    /// Base class of bindable elements, checked for `readField` companions.
    #[serde(default = "default_element_class")]
    pub element_class: String,
}

fn default_suffix() -> String {
    "_".to_string()
}

fn default_element_class() -> String {
    "android.view.View".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            suffix: default_suffix(),
            host_directives: Vec::new(),
            element_class: default_element_class(),
        }
    }
}

/// Deserializes a field that can be either a single string or a list of strings.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// How a delegated method behaves around its forwarded call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DelegationPolicy {
    /// `if (ref != null) return ref.m(..); return <fallback>;`
    #[default]
    GuardedReturn,
    /// `if (ref != null) ref.m(..); return <fallback>;`
    FallbackAfter,
}

/// Delegation policy per delegating directive kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DelegationConfig {
    /// Policy for plain delegated methods.
    #[serde(default)]
    pub external: DelegationPolicy,
    /// Policy for delegated methods carrying a population directive.
    #[serde(default)]
    pub external_populate: DelegationPolicy,
    /// Policy for delegated methods carrying a recollection directive.
    #[serde(default)]
    pub external_recollect: DelegationPolicy,
}

/// What to do with a slot whose declared type has no coercion.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedTypePolicy {
    /// Report a warning and skip the slot (default).
    #[default]
    Warn,
    /// Report an error and skip the slot.
    Error,
    /// Skip the slot silently.
    Allow,
}

/// Recollection options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RecollectConfig {
    /// Reporting of unsupported slot types.
    #[serde(default)]
    pub unsupported_types: UnsupportedTypePolicy,
}

/// Incremental cache settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CacheConfig {
    /// Whether the persisted cache is read and written at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cache directory, relative to the project root.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Discard every recorded entry before the pass.
    #[serde(default)]
    pub full_rebuild: bool,
}

fn default_true() -> bool {
    true
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(".weft-cache")
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: default_cache_dir(),
            full_rebuild: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    const HEADER: &str = "[project]\nname = \"app\"\n";

    #[test]
    fn delegation_policy_variants() {
        let toml = format!(
            "{HEADER}\n[delegation]\nexternal = \"fallback-after\"\n\
             external-recollect = \"guarded-return\"\n"
        );
        let config = load_config_from_str(&toml).unwrap();
        assert_eq!(config.delegation.external, DelegationPolicy::FallbackAfter);
        assert_eq!(
            config.delegation.external_populate,
            DelegationPolicy::GuardedReturn
        );
        assert_eq!(
            config.delegation.external_recollect,
            DelegationPolicy::GuardedReturn
        );
    }

    #[test]
    fn unsupported_type_policy_variants() {
        for (input, expected) in [
            ("warn", UnsupportedTypePolicy::Warn),
            ("error", UnsupportedTypePolicy::Error),
            ("allow", UnsupportedTypePolicy::Allow),
        ] {
            let toml = format!("{HEADER}\n[recollect]\nunsupported-types = \"{input}\"\n");
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.recollect.unsupported_types, expected);
        }
    }

    #[test]
    fn host_directives_string_or_list() {
        let single = format!("{HEADER}\n[generation]\nhost-directives = \"Action\"\n");
        let config = load_config_from_str(&single).unwrap();
        assert_eq!(config.generation.host_directives, vec!["Action"]);

        let list = format!("{HEADER}\n[generation]\nhost-directives = [\"Action\", \"Event\"]\n");
        let config = load_config_from_str(&list).unwrap();
        assert_eq!(config.generation.host_directives, vec!["Action", "Event"]);
    }

    #[test]
    fn for_project_uses_defaults() {
        let config = WeftConfig::for_project("demo");
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.generation.suffix, "_");
        assert!(config.cache.enabled);
        assert_eq!(config.cache.dir, PathBuf::from(".weft-cache"));
    }
}
