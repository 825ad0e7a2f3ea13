//! Persisted cache state.
//!
//! The manifest is stored as `manifest.json` in the cache directory. It maps
//! each generated artifact to its recorded upstream dependencies and validity,
//! and records the fingerprint each source component had when last seen.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use weft_common::ContentHash;

use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
const MANIFEST_FILE: &str = "manifest.json";

/// Recorded state of one generated artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Generated artifact identity (the generated class name).
    pub artifact: String,

    /// Upstream artifact identities this artifact references.
    pub dependencies: BTreeSet<String>,

    /// Cleared once a recorded dependency changed or vanished.
    pub valid: bool,

    /// Why the entry was invalidated, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub needs_rebuild: Option<String>,

    /// Key of the rendered source in the artifact store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_key: Option<String>,

    /// Digest of every input the stored source was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<ContentHash>,
}

impl CacheEntry {
    /// A valid entry with no dependencies.
    pub fn new(artifact: &str) -> Self {
        Self {
            artifact: artifact.to_string(),
            dependencies: BTreeSet::new(),
            valid: true,
            needs_rebuild: None,
            source_key: None,
            inputs: None,
        }
    }
}

/// Top-level persisted cache state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Weft version that produced this cache. Invalidate on version change.
    pub weft_version: String,

    /// Per-artifact entries, keyed by artifact identity.
    pub entries: BTreeMap<String, CacheEntry>,

    /// Fingerprint of each source component when last seen, keyed by the
    /// identity of the artifact generated for it.
    pub fingerprints: BTreeMap<String, ContentHash>,
}

impl CacheManifest {
    /// Creates a new, empty manifest for the given weft version.
    pub fn new(weft_version: &str) -> Self {
        Self {
            weft_version: weft_version.to_string(),
            entries: BTreeMap::new(),
            fingerprints: BTreeMap::new(),
        }
    }

    /// Loads the manifest from the cache directory, returning `None` if
    /// the file doesn't exist or can't be parsed.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let path = cache_dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest to the cache directory, creating it if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if this manifest was produced by a compatible version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.weft_version == current_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manifest_is_empty() {
        let m = CacheManifest::new("0.1.0");
        assert!(m.entries.is_empty());
        assert!(m.fingerprints.is_empty());
        assert!(m.is_compatible("0.1.0"));
        assert!(!m.is_compatible("0.2.0"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = CacheManifest::new("0.1.0");
        let mut entry = CacheEntry::new("com.shop.Checkout_");
        entry.dependencies.insert("com.shop.Cart_".to_string());
        entry.valid = false;
        entry.needs_rebuild = Some("dependency changed".to_string());
        entry.inputs = Some(ContentHash::from_bytes(b"inputs"));
        m.entries.insert(entry.artifact.clone(), entry.clone());
        m.fingerprints
            .insert("com.shop.Cart_".to_string(), ContentHash::from_bytes(b"cart"));
        m.save(dir.path()).unwrap();

        let loaded = CacheManifest::load(dir.path()).unwrap();
        assert_eq!(loaded.entries["com.shop.Checkout_"], entry);
        assert_eq!(
            loaded.fingerprints["com.shop.Cart_"],
            ContentHash::from_bytes(b"cart")
        );
    }

    #[test]
    fn load_missing_or_corrupt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CacheManifest::load(dir.path()).is_none());
        std::fs::write(dir.path().join(MANIFEST_FILE), "{ not json").unwrap();
        assert!(CacheManifest::load(dir.path()).is_none());
    }

    #[test]
    fn save_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        CacheManifest::new("0.1.0").save(&nested).unwrap();
        assert!(nested.join(MANIFEST_FILE).exists());
    }
}
