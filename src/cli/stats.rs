use std::{
    io::{self, Write},
    path::PathBuf,
};

use clap::Parser;
use ontology::{Config, domain::IndexStats};
use tracing::instrument;

use super::{
    read_input,
    terminal::{Colorize, is_narrow, row, rule},
};

#[derive(Debug, Parser, Default)]
#[command(about = "Show hierarchy and index statistics")]
pub struct Stats {
    /// Input file; reads stdin when omitted or '-'
    input: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Stats {
    #[instrument(level = "debug", skip(self, config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        let input = read_input(self.input.as_deref())?;
        let stats = input.build(config)?.stats();
        let queries = input.queries.len();

        let mut out = io::stdout().lock();
        match self.output {
            OutputFormat::Json => Self::output_json(&mut out, &stats, queries)?,
            OutputFormat::Table if self.quiet => Self::output_quiet(&mut out, &stats, queries)?,
            OutputFormat::Table => Self::output_table(&mut out, &stats, queries, is_narrow())?,
        }
        Ok(())
    }

    fn output_json<W: Write>(out: &mut W, stats: &IndexStats, queries: usize) -> anyhow::Result<()> {
        use serde_json::json;

        let output = json!({
            "index": stats,
            "queries": queries,
        });

        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        Ok(())
    }

    fn output_quiet<W: Write>(out: &mut W, stats: &IndexStats, queries: usize) -> io::Result<()> {
        writeln!(
            out,
            "categories={} depth={} items={} prefixes={} entries={} queries={queries}",
            stats.categories, stats.depth, stats.items, stats.prefix_nodes, stats.entries
        )
    }

    fn output_table<W: Write>(
        out: &mut W,
        stats: &IndexStats,
        queries: usize,
        narrow: bool,
    ) -> io::Result<()> {
        let rows = [
            ("Categories", stats.categories),
            ("Depth", stats.depth),
            ("Items", stats.items),
            ("Prefixes", stats.prefix_nodes),
            ("Entries", stats.entries),
            ("Queries", queries),
        ];

        let heading = "Index statistics";
        writeln!(out, "{}", heading.info())?;
        writeln!(out, "{}", rule(heading).dim())?;

        for (label, value) in rows {
            writeln!(out, "{}", row(label, value, narrow))?;
        }

        if stats.items > 0 {
            // Average number of prefixes per item, plus the empty prefix.
            #[allow(clippy::cast_precision_loss)]
            let per_item = stats.entries as f64 / stats.items as f64;
            writeln!(out)?;
            writeln!(out, "{}", format!("{per_item:.1} entries per item").dim())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ontology::Input;

    use super::*;
    use crate::cli::tests::SAMPLE;

    fn sample_stats() -> IndexStats {
        Input::parse(SAMPLE)
            .unwrap()
            .build(&Config::default())
            .unwrap()
            .stats()
    }

    #[test]
    fn quiet_output_is_one_line() {
        let mut out = Vec::new();
        Stats::output_quiet(&mut out, &sample_stats(), 4).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("categories=6 depth=3 items=5 "));
        assert!(text.trim_end().ends_with("queries=4"));
    }

    #[test]
    fn json_output_contains_index_figures() {
        let mut out = Vec::new();
        Stats::output_json(&mut out, &sample_stats(), 4).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["index"]["categories"], 6);
        assert_eq!(value["index"]["items"], 5);
        assert_eq!(value["queries"], 4);
    }

    #[test]
    fn table_lists_every_row() {
        for narrow in [false, true] {
            let mut out = Vec::new();
            Stats::output_table(&mut out, &sample_stats(), 4, narrow).unwrap();

            let text = String::from_utf8(out).unwrap();
            for label in ["Categories", "Depth", "Items", "Prefixes", "Entries", "Queries"] {
                assert!(text.contains(label), "missing {label} in {text}");
            }
        }
    }
}
