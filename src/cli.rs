use std::{
    io,
    path::{Path, PathBuf},
};

mod answer;
mod count;
mod stats;
mod terminal;

use answer::Answer;
use clap::ArgAction;
use count::Count;
use ontology::{Config, Input};
use stats::Stats;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;
        self.command
            .unwrap_or_else(|| Command::Answer(Answer::default()))
            .run(&config)
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

        // stdout carries the answers, so logs go to stderr.
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(io::stderr)
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
    /// Answer every query in an input file (default)
    ///
    /// Prints one count per query, in input order.
    Answer(Answer),

    /// Answer a single query against the items of an input file
    ///
    /// Queries in the input file are ignored.
    Count(Count),

    /// Show hierarchy and index statistics
    Stats(Stats),
}

impl Command {
    fn run(self, config: &Config) -> anyhow::Result<()> {
        match self {
            Self::Answer(command) => command.run(config)?,
            Self::Count(command) => command.run(config)?,
            Self::Stats(command) => command.run(config)?,
        }
        Ok(())
    }
}

/// Loads the configuration file, or the defaults if none was given.
///
/// A path that does not exist is an error.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    path.map_or_else(
        || Ok(Config::default()),
        |path| {
            let config = Config::load(path).map_err(anyhow::Error::msg)?;
            tracing::debug!("Loaded config from {}", path.display());
            Ok(config)
        },
    )
}

/// Reads input from a file, or from stdin when `path` is absent or `-`.
#[instrument(level = "debug")]
fn read_input(path: Option<&Path>) -> anyhow::Result<Input> {
    match path {
        Some(path) if path != Path::new("-") => Input::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {e}", path.display())),
        _ => Ok(Input::from_reader(io::stdin().lock())?),
    }
}
