use std::path::PathBuf;

use model_list::ResourceDirectory;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Suppress output
    #[arg(long, short)]
    quiet: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = ResourceDirectory::open(root)?;
        let manifest = directory.scan()?;
        let output = directory.write(&manifest)?;

        if !self.quiet {
            let overrides = manifest
                .iter()
                .filter(|entry| entry.origin() == model_list::Origin::Override)
                .count();
            println!(
                "{}",
                format!("Wrote model list to {}", output.display()).success()
            );
            println!(
                "{}",
                format!("  {} models, {overrides} overridden", manifest.len()).dim()
            );
        }

        Ok(())
    }
}
