//! Resolution of the resource tree layout
//!
//! A [`Layout`] turns a resource root and a [`Config`] into concrete paths,
//! and maps between the models tree, the overrides tree and root-relative
//! [`ResourcePath`]s.

use std::path::{Path, PathBuf};

use crate::domain::{Config, ResourcePath, ResourcePathError};

/// The filename of the manifest when the layout is derived from directories.
pub const MANIFEST_FILE_NAME: &str = "model_list.json";

/// Concrete locations within a resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
    models_dir: PathBuf,
    overrides_dir: PathBuf,
    output: PathBuf,
    extension: String,
}

impl Layout {
    /// Resolves the layout of the resource tree at `root`.
    #[must_use]
    pub fn new(root: PathBuf, config: &Config) -> Self {
        Self {
            models_dir: root.join(config.models_dir()),
            overrides_dir: root.join(config.overrides_dir()),
            output: root.join(config.output()),
            extension: config.extension().to_string(),
            root,
        }
    }

    /// Derives a layout from a models tree and an overrides tree.
    ///
    /// The resource root is the parent of `models_root`, and the manifest is
    /// written to `model_list.json` inside `models_root`. Model files use the
    /// default extension.
    ///
    /// # Errors
    ///
    /// Returns an error if `models_root` has no parent, or if
    /// `overrides_root` is not inside the resource root.
    pub fn from_dirs(models_root: &Path, overrides_root: &Path) -> Result<Self, LayoutError> {
        let root = models_root
            .parent()
            .ok_or_else(|| LayoutError::NoResourceRoot(models_root.to_path_buf()))?;

        if !overrides_root.starts_with(root) {
            return Err(LayoutError::OutsideRoot {
                path: overrides_root.to_path_buf(),
                root: root.to_path_buf(),
            });
        }

        Ok(Self {
            root: root.to_path_buf(),
            models_dir: models_root.to_path_buf(),
            overrides_dir: overrides_root.to_path_buf(),
            output: models_root.join(MANIFEST_FILE_NAME),
            extension: Config::default().extension().to_string(),
        })
    }

    /// The resource root. Manifest paths are relative to this.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The models tree.
    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// The overrides tree.
    #[must_use]
    pub fn overrides_dir(&self) -> &Path {
        &self.overrides_dir
    }

    /// The manifest file.
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// The model file extension, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns `true` if `path` names a model file, that is, its filename
    /// ends with `.` followed by the extension.
    ///
    /// A file named just `.mimodel` counts as a model.
    #[must_use]
    pub fn is_model(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| {
            name.as_encoded_bytes()
                .strip_suffix(self.extension.as_bytes())
                .is_some_and(|stem| stem.ends_with(b"."))
        })
    }

    /// The location an override for the model at `default` would have.
    ///
    /// Returns `None` if `default` is not inside the models tree.
    #[must_use]
    pub fn override_path(&self, default: &Path) -> Option<PathBuf> {
        default
            .strip_prefix(&self.models_dir)
            .ok()
            .map(|sub_path| self.overrides_dir.join(sub_path))
    }

    /// The root-relative resource path of a file inside the resource tree.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not inside the resource root or cannot
    /// be represented as a resource path.
    pub fn resource_path(&self, path: &Path) -> Result<ResourcePath, ResourcePathError> {
        let relative = path
            .strip_prefix(&self.root)
            .map_err(|_| ResourcePathError::NotRelative(path.to_path_buf()))?;
        ResourcePath::from_relative(relative)
    }
}

/// Errors when deriving a [`Layout`] from directories.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The models tree has no parent directory to act as resource root.
    #[error("models directory has no parent to use as resource root: {}", .0.display())]
    NoResourceRoot(PathBuf),

    /// The overrides tree is not inside the resource root.
    #[error("{} is not inside the resource root {}", path.display(), root.display())]
    OutsideRoot {
        /// The offending path.
        path: PathBuf,
        /// The resource root.
        root: PathBuf,
    },
}
