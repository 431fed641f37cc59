use std::{
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use ontology::{Config, Input};
use tracing::instrument;

use super::read_input;

#[derive(Debug, Parser, Default)]
#[command(about = "Answer every query in an input file")]
pub struct Answer {
    /// Input file; reads stdin when omitted or '-'
    input: Option<PathBuf>,
}

impl Answer {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let input = read_input(self.input.as_deref())?;
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        Self::write_answers(&input, config, &mut out)?;
        out.flush()?;
        Ok(())
    }

    fn write_answers<W: Write>(input: &Input, config: &Config, out: &mut W) -> anyhow::Result<()> {
        let engine = input.build(config)?;
        let answers = engine.count_all(&input.queries)?;
        tracing::info!(queries = answers.len(), "answered queries");

        for answer in answers {
            writeln!(out, "{answer}")?;
        }
        Ok(())
    }
}
