//! Durable locator synthesis.
//!
//! The pipeline: analyze a node into a [`NodeProfile`], fan it through the
//! fixed chain of candidate generators, score every candidate against the
//! live tree, and fold the ranked result into a [`LocatorSet`] with one slot
//! per category plus a guaranteed fallback.

pub mod generators;
pub mod policy;
pub mod profile;
pub mod scorer;
pub mod stability;
pub mod synthesizer;

pub use generators::*;
pub use policy::*;
pub use profile::*;
pub use scorer::*;
pub use stability::*;
pub use synthesizer::*;
