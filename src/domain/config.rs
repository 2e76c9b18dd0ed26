use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for manifest generation.
///
/// This struct holds the layout of the resource tree (where models and
/// overrides live, which extension marks a model, where the manifest is
/// written) and the policy for filename collisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct Config {
    /// The models tree, relative to the resource root.
    models_dir: String,

    /// The overrides tree, relative to the resource root.
    ///
    /// It mirrors the structure of the models tree.
    overrides_dir: String,

    /// The extension (without the leading dot) that marks a model file.
    extension: String,

    /// The manifest file, relative to the resource root.
    output: String,

    /// Whether two model files with the same name in different
    /// subdirectories are tolerated.
    ///
    /// When `false` (default): such a collision fails the build.
    /// When `true`: the first file seen is kept and the collision is logged.
    pub allow_duplicate_names: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            overrides_dir: default_overrides_dir(),
            extension: default_extension(),
            output: default_output(),
            allow_duplicate_names: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the models tree, relative to the resource root.
    #[must_use]
    pub fn models_dir(&self) -> &str {
        &self.models_dir
    }

    /// Returns the overrides tree, relative to the resource root.
    #[must_use]
    pub fn overrides_dir(&self) -> &str {
        &self.overrides_dir
    }

    /// Returns the model file extension, without the leading dot.
    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns the manifest path, relative to the resource root.
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }
}

fn default_models_dir() -> String {
    "models".to_string()
}

fn default_overrides_dir() -> String {
    "model_overrides".to_string()
}

fn default_extension() -> String {
    "mimodel".to_string()
}

fn default_output() -> String {
    "models/model_list.json".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_models_dir")]
        models_dir: String,

        #[serde(default = "default_overrides_dir")]
        overrides_dir: String,

        /// Accepts a leading dot for convenience; it is stripped on load.
        #[serde(default = "default_extension")]
        extension: String,

        #[serde(default = "default_output")]
        output: String,

        #[serde(default)]
        allow_duplicate_names: bool,
    },
}

impl TryFrom<Versions> for Config {
    type Error = String;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 {
                models_dir,
                overrides_dir,
                extension,
                output,
                allow_duplicate_names,
            } => {
                let extension = extension
                    .strip_prefix('.')
                    .map_or_else(|| extension.clone(), str::to_string);

                for (field, value) in [
                    ("models_dir", &models_dir),
                    ("overrides_dir", &overrides_dir),
                    ("extension", &extension),
                    ("output", &output),
                ] {
                    if value.trim().is_empty() {
                        return Err(format!("'{field}' must not be empty"));
                    }
                }

                if models_dir == overrides_dir {
                    return Err("'models_dir' and 'overrides_dir' must differ".to_string());
                }

                Ok(Self {
                    models_dir,
                    overrides_dir,
                    extension,
                    output,
                    allow_duplicate_names,
                })
            }
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            models_dir: config.models_dir,
            overrides_dir: config.overrides_dir,
            extension: config.extension,
            output: config.output,
            allow_duplicate_names: config.allow_duplicate_names,
        }
    }
}
