//! Model manifest generation
//!
//! Scans a resource tree for model files and writes a JSON manifest of their
//! paths, substituting same-named files from an overrides tree.

pub mod domain;
pub use domain::{Config, Manifest, ModelEntry, Origin, ResourcePath};

/// Filesystem access: resolving the resource layout, scanning and writing.
pub mod storage;
pub use storage::{BuildError, Freshness, Layout, ResourceDirectory, build_manifest};
