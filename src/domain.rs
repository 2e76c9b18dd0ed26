//! Domain types for model manifests.
//!
//! This module contains the filesystem-agnostic core: resource paths, the
//! manifest itself, and configuration.

/// Manifest and entry types.
pub mod manifest;
pub use manifest::{Insertion, Manifest, ModelEntry, Origin};

mod config;
pub use config::Config;

/// Root-relative resource paths.
pub mod resource_path;
pub use resource_path::{ResourcePath, ResourcePathError};
