use std::{path::PathBuf, process};

use model_list::{Freshness, ResourceDirectory};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Suppress output
    #[arg(long, short)]
    quiet: bool,
}

impl Command {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = ResourceDirectory::open(root)?;
        let output = directory.layout().output().display().to_string();

        match directory.check()? {
            Freshness::UpToDate => {
                if !self.quiet {
                    println!("{}", format!("✅ {output} is up to date.").success());
                }
                Ok(())
            }
            Freshness::Missing => {
                if !self.quiet {
                    println!("{}", format!("⚠️  {output} does not exist.").warning());
                    println!("{}", "Run 'model-list build' to create it.".dim());
                }
                process::exit(2);
            }
            Freshness::Stale { added, removed } => {
                if !self.quiet {
                    println!("{}", format!("⚠️  {output} is out of date.").warning());
                    for path in &added {
                        println!("  {}", format!("+ {path}").info());
                    }
                    for path in &removed {
                        println!("  {}", format!("- {path}").dim());
                    }
                    if added.is_empty() && removed.is_empty() {
                        println!("  {}", "(entries are out of order)".dim());
                    }
                    println!("{}", "Run 'model-list build' to update it.".dim());
                }
                process::exit(2);
            }
        }
    }
}
