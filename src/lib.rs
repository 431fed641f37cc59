//! Subtree-scoped prefix counting over a category hierarchy.
//!
//! Items are short texts tagged with one category from a tree. A query names
//! a category and a prefix and asks how many items in that category's subtree
//! start with the prefix. The hierarchy is interval-encoded so subtree
//! membership is a range check, and a prefix tree over all texts stores the
//! sorted category positions of every item under each prefix.

pub mod domain;
pub use domain::{
    Config, Hierarchy, HierarchyError, ItemRecord, QueryEngine, QueryError, QueryRecord,
};

/// Parsing the textual input format.
pub mod input;
pub use input::{Input, LoadError};
