//! Line-level parsing of the textual input format
//!
//! The input consists of three counted groups:
//!
//! ```text
//! 6
//! Animals ( Reptiles Birds ( Eagles Pigeons Crows ) )
//! 2
//! Reptiles: Why are many reptiles green?
//! Eagles: How endangered are eagles?
//! 1
//! Eagles How en
//! ```
//!
//! Item lines are split on the first `": "`, query lines on the first space.

use std::str::Lines;

use crate::domain::{ItemRecord, QueryRecord};

/// Errors that can occur when parsing input text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input ended before a required line.
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// 1-based number of the missing line.
        line: usize,
        /// What the line should have contained.
        expected: &'static str,
    },
    /// A count line did not hold a non-negative integer.
    #[error("line {line}: expected a count, found '{found}'")]
    InvalidCount {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        found: String,
    },
    /// An item line had no `": "` separator.
    #[error("line {line}: expected '<Category>: <text>', found '{found}'")]
    MissingSeparator {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        found: String,
    },
}

/// A line cursor that tracks 1-based line numbers.
pub(super) struct Cursor<'a> {
    lines: Lines<'a>,
    line: usize,
}

impl<'a> Cursor<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line: 0,
        }
    }

    /// Returns the next line and its number, without any trailing `\r`.
    ///
    /// [`str::lines`] leaves the `\r` on a final line that has no `\n`.
    pub(super) fn next_line(
        &mut self,
        expected: &'static str,
    ) -> Result<(usize, &'a str), ParseError> {
        self.line += 1;
        self.lines
            .next()
            .map(|line| (self.line, line.strip_suffix('\r').unwrap_or(line)))
            .ok_or(ParseError::UnexpectedEof {
                line: self.line,
                expected,
            })
    }

    /// Reads a count line.
    pub(super) fn count(&mut self, expected: &'static str) -> Result<usize, ParseError> {
        let (line, content) = self.next_line(expected)?;
        content
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidCount {
                line,
                found: content.to_string(),
            })
    }

    /// Reads `n` lines and parses each one with `parse`.
    pub(super) fn records<T>(
        &mut self,
        n: usize,
        expected: &'static str,
        parse: impl Fn(usize, &str) -> Result<T, ParseError>,
    ) -> Result<Vec<T>, ParseError> {
        (0..n)
            .map(|_| {
                let (line, content) = self.next_line(expected)?;
                parse(line, content)
            })
            .collect()
    }
}

/// Parses `<Category>: <text>`.
///
/// # Errors
///
/// Returns [`ParseError::MissingSeparator`] if the line has no `": "`.
pub fn parse_item(line: usize, content: &str) -> Result<ItemRecord, ParseError> {
    let (category, text) = content
        .split_once(": ")
        .ok_or_else(|| ParseError::MissingSeparator {
            line,
            found: content.to_string(),
        })?;
    Ok(ItemRecord {
        category: category.to_string(),
        text: text.to_string(),
    })
}

/// Parses `<Category> <prefix>`.
///
/// A line without a space is a query with an empty prefix. Everything after
/// the first space, including further spaces, belongs to the prefix.
#[must_use]
pub fn parse_query(content: &str) -> QueryRecord {
    let (category, prefix) = content.split_once(' ').unwrap_or((content, ""));
    QueryRecord {
        category: category.to_string(),
        prefix: prefix.to_string(),
    }
}
