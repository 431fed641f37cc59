use std::path::PathBuf;

use clap::Parser;
use ontology::{Config, QueryEngine};
use tracing::instrument;

use super::read_input;

#[derive(Debug, Parser)]
#[command(about = "Count items under a category that start with a prefix")]
pub struct Count {
    /// Input file supplying the hierarchy and items ('-' for stdin)
    input: PathBuf,

    /// Category whose subtree is searched
    category: String,

    /// Prefix to match; matches every item when omitted
    #[arg(default_value = "")]
    prefix: String,
}

impl Count {
    #[instrument(level = "debug", skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let engine = read_input(Some(self.input.as_path()))?.build(config)?;
        println!("{}", self.answer(&engine)?);
        Ok(())
    }

    fn answer(&self, engine: &QueryEngine) -> anyhow::Result<usize> {
        Ok(engine.count(&self.category, &self.prefix)?)
    }
}
