//! Incremental dependency cache for generated artifacts.
//!
//! [`DependencyCache`] records, per generated artifact, the upstream
//! artifacts it references and whether that record is still valid.
//! [`Cache`] persists it as a JSON [`CacheManifest`] next to an
//! [`ArtifactStore`] of rendered sources so unchanged components can be
//! reused on the next pass.

#![warn(missing_docs)]

pub mod artifact;
pub mod cache;
pub mod dependency;
pub mod error;
pub mod manifest;

pub use artifact::ArtifactStore;
pub use cache::Cache;
pub use dependency::{DependencyCache, Freshness};
pub use error::CacheError;
pub use manifest::{CacheEntry, CacheManifest};
