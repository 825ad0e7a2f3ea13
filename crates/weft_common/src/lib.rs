//! Shared foundational types used across the weft code synthesizer.
//!
//! This crate provides content hashing for cache fingerprints and the
//! pass-level result type carrying internal consistency errors.

#![warn(missing_docs)]

pub mod hash;
pub mod result;

pub use hash::ContentHash;
pub use result::{InternalError, WeftResult};
