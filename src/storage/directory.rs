//! A filesystem backed resource tree
//!
//! The [`ResourceDirectory`] scans a resource tree for model files and
//! maintains the manifest inside it. It is a wrapper around the filesystem
//! agnostic [`Manifest`].

use std::{
    collections::HashSet,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::{
    domain::{Config, Insertion, Manifest, ModelEntry, Origin, ResourcePath, ResourcePathError},
    storage::{
        layout::{Layout, LayoutError},
        scan::{collect_model_paths, collect_override_paths},
    },
};

/// The name of the optional configuration file at the resource root.
pub const CONFIG_FILE_NAME: &str = "model_list.toml";

/// A resource tree on disk.
#[derive(Debug, Clone)]
pub struct ResourceDirectory {
    config: Config,
    layout: Layout,
}

impl ResourceDirectory {
    /// Opens the resource tree at `root`.
    ///
    /// Settings are read from `model_list.toml` at the root; if there is no
    /// such file the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or parsed.
    pub fn open(root: PathBuf) -> Result<Self, BuildError> {
        let config = load_config(&root)?;
        Ok(Self::with_config(root, config))
    }

    /// Uses the given configuration for the resource tree at `root`,
    /// ignoring any configuration file.
    #[must_use]
    pub fn with_config(root: PathBuf, config: Config) -> Self {
        let layout = Layout::new(root, &config);
        Self { config, layout }
    }

    /// Uses an explicit layout with otherwise default settings.
    #[must_use]
    pub fn with_layout(layout: Layout) -> Self {
        Self {
            config: Config::default(),
            layout,
        }
    }

    /// The resolved layout of the tree.
    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Scans the tree and assembles the manifest.
    ///
    /// Every model file in the models tree contributes one entry. If a
    /// regular file exists at the same sub-path in the overrides tree, the
    /// override's path is recorded instead of the default's.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the models tree does not exist
    /// - the tree cannot be read
    /// - a path cannot be represented in the manifest
    /// - two model files share a filename and `allow_duplicate_names` is off
    pub fn scan(&self) -> Result<Manifest, BuildError> {
        let models_dir = self.layout.models_dir();
        if !models_dir.is_dir() {
            return Err(BuildError::MissingModelsDir(models_dir.to_path_buf()));
        }

        let defaults = collect_model_paths(&self.layout)?;
        let mut manifest = Manifest::with_capacity(defaults.len());
        let mut used_overrides = HashSet::new();

        for default in &defaults {
            let entry = match self.layout.override_path(default) {
                Some(candidate) if candidate.is_file() => {
                    tracing::debug!("Using override {}", candidate.display());
                    let entry = ModelEntry::new(
                        self.resource_path(&candidate)?,
                        Origin::Override,
                    );
                    used_overrides.insert(candidate);
                    entry
                }
                _ => ModelEntry::new(self.resource_path(default)?, Origin::Default),
            };

            let (kept, dropped) = match manifest.insert(entry) {
                Insertion::Added => continue,
                Insertion::Replaced { kept, previous } => (kept, previous),
                Insertion::Rejected { kept, rejected } => (kept, rejected),
            };

            if !self.config.allow_duplicate_names {
                return Err(BuildError::DuplicateName {
                    name: dropped.name().to_string(),
                    kept,
                    dropped: dropped.path().clone(),
                });
            }
            tracing::warn!(
                "Duplicate model name {}: listing {kept}, ignoring {}",
                dropped.name(),
                dropped.path()
            );
        }

        self.report_orphaned_overrides(&used_overrides)?;

        tracing::info!("Collected {} models", manifest.len());
        Ok(manifest)
    }

    /// Writes the manifest to the output file, replacing any existing one.
    ///
    /// The manifest is written to a temporary file next to the output and
    /// renamed over it, so readers never see a partially written manifest.
    /// Returns the path written to.
    ///
    /// # Errors
    ///
    /// Returns an error if the manifest cannot be rendered or the file cannot
    /// be written.
    pub fn write(&self, manifest: &Manifest) -> Result<PathBuf, BuildError> {
        let json = manifest.to_json()?;
        let output = self.layout.output();

        replace_file(output, json.as_bytes()).map_err(|source| BuildError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        tracing::info!("Wrote model list to {}", output.display());
        Ok(output.to_path_buf())
    }

    /// Scans the tree and writes the manifest.
    ///
    /// # Errors
    ///
    /// See [`Self::scan`] and [`Self::write`].
    pub fn build(&self) -> Result<PathBuf, BuildError> {
        let manifest = self.scan()?;
        self.write(&manifest)
    }

    /// Compares the manifest on disk with what [`Self::build`] would write.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be scanned or an existing manifest
    /// cannot be read.
    pub fn check(&self) -> Result<Freshness, BuildError> {
        let manifest = self.scan()?;
        let expected = manifest.to_json()?;
        let output = self.layout.output();

        let actual = match fs::read_to_string(output) {
            Ok(actual) => actual,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Freshness::Missing),
            Err(source) => {
                return Err(BuildError::Read {
                    path: output.to_path_buf(),
                    source,
                });
            }
        };

        if actual == expected {
            return Ok(Freshness::UpToDate);
        }

        // An unparseable manifest counts as entirely replaced.
        let recorded: HashSet<ResourcePath> = Manifest::from_json(&actual)
            .map_or_else(|_| HashSet::new(), |paths| paths.into_iter().collect());
        let current: HashSet<&ResourcePath> = manifest.paths().collect();

        let added = manifest
            .paths()
            .filter(|path| !recorded.contains(*path))
            .cloned()
            .collect();
        let mut removed: Vec<ResourcePath> = recorded
            .into_iter()
            .filter(|path| !current.contains(path))
            .collect();
        removed.sort();

        Ok(Freshness::Stale { added, removed })
    }

    fn resource_path(&self, path: &Path) -> Result<ResourcePath, BuildError> {
        self.layout
            .resource_path(path)
            .map_err(|source| BuildError::InvalidPath {
                path: path.to_path_buf(),
                source,
            })
    }

    fn report_orphaned_overrides(&self, used: &HashSet<PathBuf>) -> Result<(), BuildError> {
        for path in collect_override_paths(&self.layout)? {
            if !used.contains(&path) {
                tracing::warn!(
                    "Override {} has no matching model and is not listed",
                    path.display()
                );
            }
        }
        Ok(())
    }
}

/// Scans `models_root` and writes `model_list.json` inside it, substituting
/// files found at the same sub-path under `overrides_root`.
///
/// Paths in the manifest are relative to the parent of `models_root`. This
/// uses the default settings; see [`ResourceDirectory`] for configurable
/// builds.
///
/// # Errors
///
/// Returns an error if the directories do not form a valid layout, or if the
/// build fails (see [`ResourceDirectory::scan`] and
/// [`ResourceDirectory::write`]).
pub fn build_manifest(models_root: &Path, overrides_root: &Path) -> Result<PathBuf, BuildError> {
    let layout = Layout::from_dirs(models_root, overrides_root)?;
    ResourceDirectory::with_layout(layout).build()
}

/// Whether the manifest on disk matches the resource tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Freshness {
    /// The manifest is byte-identical to a fresh build.
    UpToDate,
    /// There is no manifest yet.
    Missing,
    /// The manifest differs from a fresh build.
    ///
    /// Both lists are empty if only the order differs.
    Stale {
        /// Paths a fresh build would add.
        added: Vec<ResourcePath>,
        /// Paths a fresh build would drop.
        removed: Vec<ResourcePath>,
    },
}

/// Errors that can occur while building a manifest.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The configuration file is unreadable or invalid.
    #[error("invalid configuration in {}: {message}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// The models and overrides directories do not form a valid layout.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// The models tree does not exist.
    #[error("models directory not found: {}", .0.display())]
    MissingModelsDir(PathBuf),

    /// The resource tree could not be walked.
    #[error("failed to read resource tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// A model path cannot be represented in the manifest.
    #[error("cannot list {}: {source}", path.display())]
    InvalidPath {
        /// The offending file.
        path: PathBuf,
        /// Why it cannot be listed.
        source: ResourcePathError,
    },

    /// Two model files share a filename.
    #[error("duplicate model name {name}: {kept} and {dropped}")]
    DuplicateName {
        /// The shared filename.
        name: String,
        /// The path that would be listed.
        kept: ResourcePath,
        /// The path that would be dropped.
        dropped: ResourcePath,
    },

    /// The manifest could not be rendered.
    #[error("failed to render manifest: {0}")]
    Render(#[from] serde_json::Error),

    /// The existing manifest could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The manifest file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },

    /// The manifest could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// The manifest file.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
}

/// Atomically replaces `path` with `contents`.
///
/// An existing file keeps its permissions; a new one is created readable by
/// everyone.
fn replace_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".model_list")
        .tempfile_in(dir)?;
    file.write_all(contents)?;

    let permissions = fs::metadata(path).map(|metadata| metadata.permissions()).ok();
    #[cfg(unix)]
    let permissions = permissions.or_else(|| {
        use std::os::unix::fs::PermissionsExt;
        Some(fs::Permissions::from_mode(0o644))
    });
    if let Some(permissions) = permissions {
        file.as_file().set_permissions(permissions)?;
    }

    file.as_file().sync_all()?;
    file.persist(path)?;
    Ok(())
}

fn load_config(root: &Path) -> Result<Config, BuildError> {
    let path = root.join(CONFIG_FILE_NAME);
    if !path.exists() {
        tracing::debug!("No {CONFIG_FILE_NAME} found, using defaults");
        return Ok(Config::default());
    }

    Config::load(&path).map_err(|message| BuildError::Config { path, message })
}
