use std::path::PathBuf;

mod build;
mod check;
mod init;
mod terminal;

use clap::ArgAction;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the resource root containing the models directory
    #[arg(short, long, default_value = "./project/res", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command.unwrap_or_default().run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Scan the resource tree and write the model list (default)
    Build(build::Command),

    /// Check whether the model list on disk is up to date
    ///
    /// Exits with code 2 if the model list is missing or stale.
    Check(check::Command),

    /// Write a default configuration file to the resource root
    Init(init::Command),
}

impl Default for Command {
    fn default() -> Self {
        Self::Build(build::Command::default())
    }
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Build(command) => command.run(root),
            Self::Check(command) => command.run(root),
            Self::Init(command) => command.run(&root),
        }
    }
}
