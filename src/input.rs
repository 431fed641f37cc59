//! Reading the textual input format into the structures the engine consumes.

use std::{
    io::{self, Read},
    path::Path,
};

use tracing::instrument;

mod parser;

pub use parser::{ParseError, parse_item, parse_query};

use crate::domain::{
    BuildError, Config, Hierarchy, HierarchyError, ItemRecord, QueryEngine, QueryRecord,
};
use parser::Cursor;

/// A fully parsed input: hierarchy line, items and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// The category count stated on the first line.
    pub declared_categories: usize,
    /// The hierarchy in flattened nested notation.
    pub hierarchy: String,
    /// Item records in input order.
    pub items: Vec<ItemRecord>,
    /// Query records in input order.
    pub queries: Vec<QueryRecord>,
}

/// Errors that can occur when turning input into a query engine.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input could not be read.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),
    /// The input text is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The hierarchy line is malformed.
    #[error("invalid hierarchy: {0}")]
    Hierarchy(#[from] HierarchyError),
    /// An item could not be indexed.
    #[error(transparent)]
    Build(#[from] BuildError),
}

impl Input {
    /// Parses the full input text.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] naming the first malformed or missing line.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(text);

        let declared_categories = cursor.count("the category count")?;
        let (_, hierarchy) = cursor.next_line("the category hierarchy")?;

        let item_count = cursor.count("the item count")?;
        let items = cursor.records(item_count, "an item", parse_item)?;

        let query_count = cursor.count("the query count")?;
        let queries = cursor.records(query_count, "a query", |_, content| {
            Ok(parse_query(content))
        })?;

        Ok(Self {
            declared_categories,
            hierarchy: hierarchy.to_string(),
            items,
            queries,
        })
    }

    /// Reads and parses input from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the text is malformed.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, LoadError> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(Self::parse(&text)?)
    }

    /// Reads and parses input from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the text is malformed.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    /// Builds the hierarchy and indexes the items.
    ///
    /// A category count that disagrees with the hierarchy line is logged and
    /// otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the hierarchy is malformed or an item cannot be
    /// indexed under `config`.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&self, config: &Config) -> Result<QueryEngine, LoadError> {
        let hierarchy = Hierarchy::parse(&self.hierarchy)?;

        if hierarchy.len() != self.declared_categories {
            tracing::warn!(
                declared = self.declared_categories,
                found = hierarchy.len(),
                "category count does not match the hierarchy"
            );
        }

        Ok(QueryEngine::build(hierarchy, &self.items, config)?)
    }
}
