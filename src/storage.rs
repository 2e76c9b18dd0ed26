pub mod directory;
/// Resolution of the resource tree layout.
pub mod layout;
mod scan;

pub use directory::{BuildError, CONFIG_FILE_NAME, Freshness, ResourceDirectory, build_manifest};
pub use layout::{Layout, LayoutError, MANIFEST_FILE_NAME};
pub use scan::{collect_model_paths, collect_override_paths};
