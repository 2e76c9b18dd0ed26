use std::path::Path;

use model_list::{Config, storage::CONFIG_FILE_NAME};
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Tolerate model files that share a name in different directories
    #[arg(long)]
    allow_duplicate_names: bool,
}

impl Command {
    #[instrument]
    pub fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            anyhow::bail!(
                "Configuration already exists (found {})",
                config_path.display()
            );
        }

        if !root.is_dir() {
            anyhow::bail!("Resource root {} is not a directory", root.display());
        }

        let mut config = Config::default();
        config.allow_duplicate_names = self.allow_duplicate_names;
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create {CONFIG_FILE_NAME}: {e}"))?;

        println!("Initialized model list configuration in {}", root.display());
        println!("  Created: {CONFIG_FILE_NAME}");
        println!();
        println!("Next steps:");
        println!("  model-list build  # Write {}", config.output());

        Ok(())
    }
}
