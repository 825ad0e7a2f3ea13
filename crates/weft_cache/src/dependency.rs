//! Dependency edges and validity of generated artifacts.
//!
//! Entries persist across passes. Within one pass, edges recorded for an
//! artifact accumulate in a pending set that replaces the recorded set on
//! [`DependencyCache::commit`]. Invalidation is sticky: only
//! [`DependencyCache::reset`] (a full rebuild) makes an invalidated entry
//! valid again.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, warn};
use weft_common::ContentHash;

use crate::error::CacheError;
use crate::manifest::{CacheEntry, CacheManifest};

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The observed upstream is part of the recorded dependency set.
    Fresh,
    /// The entry no longer describes the artifact; a full rebuild is required.
    Invalidated,
}

/// Content-keyed store of artifact dependency records.
#[derive(Debug, Default)]
pub struct DependencyCache {
    entries: BTreeMap<String, CacheEntry>,
    fingerprints: BTreeMap<String, ContentHash>,
    pending: BTreeMap<String, BTreeSet<String>>,
    created: HashSet<String>,
}

impl DependencyCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores the cache from a persisted manifest.
    pub fn from_manifest(manifest: &CacheManifest) -> Self {
        Self {
            entries: manifest.entries.clone(),
            fingerprints: manifest.fingerprints.clone(),
            pending: BTreeMap::new(),
            created: HashSet::new(),
        }
    }

    /// Writes the committed state into `manifest`.
    pub fn write_manifest(&self, manifest: &mut CacheManifest) {
        manifest.entries = self.entries.clone();
        manifest.fingerprints = self.fingerprints.clone();
    }

    /// Returns `true` if an entry is recorded for `artifact`.
    pub fn has_entry(&self, artifact: &str) -> bool {
        self.entries.contains_key(artifact)
    }

    /// Returns the entry recorded for `artifact`.
    pub fn get_entry(&self, artifact: &str) -> Result<&CacheEntry, CacheError> {
        self.entries.get(artifact).ok_or_else(|| CacheError::NotFound {
            artifact: artifact.to_string(),
        })
    }

    /// Iterates over all entries in artifact order.
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.values()
    }

    /// Returns `true` if the entry for `artifact` was created during this pass.
    pub fn created_this_pass(&self, artifact: &str) -> bool {
        self.created.contains(artifact)
    }

    /// Records the edge `artifact -> upstream`. Idempotent. Creates a valid
    /// entry when `artifact` has none yet.
    pub fn record_dependency(&mut self, artifact: &str, upstream: &str) {
        self.ensure_entry(artifact);
        if self.created.contains(artifact) {
            if let Some(entry) = self.entries.get_mut(artifact) {
                entry.dependencies.insert(upstream.to_string());
            }
        }
        self.pending
            .entry(artifact.to_string())
            .or_default()
            .insert(upstream.to_string());
    }

    /// Ensures `artifact` has an entry, creating a valid empty one if absent.
    pub fn ensure_entry(&mut self, artifact: &str) {
        if !self.entries.contains_key(artifact) {
            debug!(artifact, "created cache entry");
            self.entries
                .insert(artifact.to_string(), CacheEntry::new(artifact));
            self.created.insert(artifact.to_string());
        }
        self.pending.entry(artifact.to_string()).or_default();
    }

    /// Checks whether `observed` is a recorded upstream of `artifact`.
    ///
    /// An upstream absent from the recorded set of an entry carried over from
    /// an earlier pass invalidates the entry. An invalidated entry reports
    /// [`Freshness::Invalidated`] on every later check.
    pub fn check_freshness(
        &mut self,
        artifact: &str,
        observed: &str,
    ) -> Result<Freshness, CacheError> {
        let created = self.created.contains(artifact);
        let entry = self
            .entries
            .get_mut(artifact)
            .ok_or_else(|| CacheError::NotFound {
                artifact: artifact.to_string(),
            })?;
        if !entry.valid {
            return Ok(Freshness::Invalidated);
        }
        if created || entry.dependencies.contains(observed) {
            return Ok(Freshness::Fresh);
        }
        let reason = format!("dependency on `{observed}` is not in the recorded set");
        warn!(artifact, observed, "cache entry invalidated: new dependency");
        entry.valid = false;
        entry.needs_rebuild = Some(reason);
        Ok(Freshness::Invalidated)
    }

    /// Returns `true` if `artifact` has a valid entry.
    pub fn is_valid(&self, artifact: &str) -> bool {
        self.entries.get(artifact).is_some_and(|e| e.valid)
    }

    /// Clears the validity flag of `artifact`. Returns `true` if the entry
    /// was valid before.
    pub fn invalidate(&mut self, artifact: &str, reason: &str) -> bool {
        match self.entries.get_mut(artifact) {
            Some(entry) if entry.valid => {
                warn!(artifact, reason, "cache entry invalidated");
                entry.valid = false;
                entry.needs_rebuild = Some(reason.to_string());
                true
            }
            _ => false,
        }
    }

    /// Artifacts whose recorded dependencies include `upstream`.
    pub fn dependents_of(&self, upstream: &str) -> Vec<String> {
        self.entries
            .values()
            .filter(|e| e.dependencies.contains(upstream))
            .map(|e| e.artifact.clone())
            .collect()
    }

    /// The fingerprint recorded for `artifact`'s source component.
    pub fn fingerprint(&self, artifact: &str) -> Option<ContentHash> {
        self.fingerprints.get(artifact).copied()
    }

    /// Records the current fingerprint of `artifact`'s source component.
    ///
    /// When it differs from the recorded one, every artifact depending on
    /// `artifact` is invalidated. Returns the newly invalidated artifacts.
    pub fn observe_fingerprint(&mut self, artifact: &str, fingerprint: ContentHash) -> Vec<String> {
        let previous = self.fingerprints.insert(artifact.to_string(), fingerprint);
        match previous {
            Some(previous) if previous != fingerprint => {
                debug!(artifact, %previous, current = %fingerprint, "upstream fingerprint changed");
                let reason = format!("upstream `{artifact}` changed");
                self.invalidate_dependents(artifact, &reason)
            }
            _ => Vec::new(),
        }
    }

    /// Drops every recorded artifact not in `present`, invalidating the
    /// artifacts that depended on it. Returns the newly invalidated artifacts.
    pub fn retain_present(&mut self, present: &HashSet<String>) -> Vec<String> {
        let vanished: Vec<String> = self
            .fingerprints
            .keys()
            .chain(self.entries.keys())
            .filter(|a| !present.contains(*a))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut invalidated = Vec::new();
        for artifact in &vanished {
            debug!(artifact = %artifact, "upstream vanished");
            self.fingerprints.remove(artifact);
            self.entries.remove(artifact);
            self.pending.remove(artifact);
            let reason = format!("upstream `{artifact}` no longer exists");
            invalidated.extend(self.invalidate_dependents(artifact, &reason));
        }
        invalidated
    }

    fn invalidate_dependents(&mut self, upstream: &str, reason: &str) -> Vec<String> {
        self.dependents_of(upstream)
            .into_iter()
            .filter(|dependent| self.invalidate(dependent, reason))
            .collect()
    }

    /// Records the artifact-store key of `artifact`'s rendered source and
    /// the digest of the inputs it was generated from.
    pub fn set_source_key(&mut self, artifact: &str, key: &str, inputs: ContentHash) {
        if let Some(entry) = self.entries.get_mut(artifact) {
            entry.source_key = Some(key.to_string());
            entry.inputs = Some(inputs);
        }
    }

    /// Ends the pass: each valid entry's recorded dependencies are replaced
    /// by the edges recorded during the pass.
    pub fn commit(&mut self) {
        for (artifact, edges) in std::mem::take(&mut self.pending) {
            if let Some(entry) = self.entries.get_mut(&artifact) {
                if entry.valid {
                    entry.dependencies = edges;
                }
            }
        }
        self.created.clear();
    }

    /// Discards every entry and fingerprint.
    pub fn reset(&mut self) {
        debug!(entries = self.entries.len(), "cache reset for full rebuild");
        self.entries.clear();
        self.fingerprints.clear();
        self.pending.clear();
        self.created.clear();
    }
}
