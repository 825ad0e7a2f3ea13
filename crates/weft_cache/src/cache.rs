//! High-level cache orchestrator.
//!
//! `Cache` ties the [`DependencyCache`], its persisted [`CacheManifest`] and
//! the [`ArtifactStore`] of rendered sources together for the pass driver.
//! Loading is fail-safe: a missing, corrupt or incompatible manifest starts
//! an empty cache.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use weft_common::ContentHash;

use crate::artifact::ArtifactStore;
use crate::dependency::DependencyCache;
use crate::error::CacheError;
use crate::manifest::CacheManifest;

/// Cache state for one build session.
#[derive(Debug)]
pub struct Cache {
    /// Root directory for persisted state, `None` for an in-memory cache.
    cache_dir: Option<PathBuf>,
    deps: DependencyCache,
    store: Option<ArtifactStore>,
    weft_version: String,
}

impl Cache {
    /// Loads the cache under `cache_dir`, or creates an empty one.
    pub fn load_or_create(cache_dir: &Path, weft_version: &str) -> Self {
        let manifest = CacheManifest::load(cache_dir).filter(|m| m.is_compatible(weft_version));
        let deps = match &manifest {
            Some(manifest) => {
                debug!(entries = manifest.entries.len(), "loaded cache manifest");
                DependencyCache::from_manifest(manifest)
            }
            None => DependencyCache::new(),
        };
        Self {
            cache_dir: Some(cache_dir.to_path_buf()),
            deps,
            store: Some(ArtifactStore::new(cache_dir, weft_version)),
            weft_version: weft_version.to_string(),
        }
    }

    /// A cache that is never read from or written to disk.
    pub fn in_memory(weft_version: &str) -> Self {
        Self {
            cache_dir: None,
            deps: DependencyCache::new(),
            store: None,
            weft_version: weft_version.to_string(),
        }
    }

    /// Returns `true` if this cache persists to disk.
    pub fn is_persistent(&self) -> bool {
        self.cache_dir.is_some()
    }

    /// The dependency records.
    pub fn deps(&self) -> &DependencyCache {
        &self.deps
    }

    /// The dependency records, mutably.
    pub fn deps_mut(&mut self) -> &mut DependencyCache {
        &mut self.deps
    }

    /// Stores the rendered source of `artifact`, generated from `inputs`,
    /// and records its key.
    pub fn store_source(
        &mut self,
        artifact: &str,
        source: &str,
        inputs: ContentHash,
    ) -> Result<(), CacheError> {
        if let Some(store) = &self.store {
            let key = store.write_source(source)?;
            self.deps.set_source_key(artifact, &key, inputs);
        }
        Ok(())
    }

    /// Loads the stored source of `artifact` if it was generated from
    /// `inputs` and is still readable.
    pub fn load_source(&self, artifact: &str, inputs: ContentHash) -> Option<String> {
        let store = self.store.as_ref()?;
        let entry = self.deps.get_entry(artifact).ok()?;
        if entry.inputs != Some(inputs) {
            debug!(artifact, "stored source was generated from other inputs");
            return None;
        }
        store.read_source(entry.source_key.as_ref()?)
    }

    /// Commits the pass and persists the manifest.
    pub fn save(&mut self) -> Result<(), CacheError> {
        self.deps.commit();
        let Some(dir) = &self.cache_dir else {
            return Ok(());
        };
        let mut manifest = CacheManifest::new(&self.weft_version);
        self.deps.write_manifest(&mut manifest);
        manifest.save(dir)
    }

    /// Removes stored sources no entry refers to. Returns the number removed.
    pub fn gc(&self) -> Result<usize, CacheError> {
        let Some(store) = &self.store else {
            return Ok(0);
        };
        let live: HashSet<&str> = self
            .deps
            .entries()
            .filter_map(|e| e.source_key.as_deref())
            .collect();
        store.gc(&live)
    }
}
