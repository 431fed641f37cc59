//! Domain models for subtree-scoped prefix counting.
//!
//! This module contains the category hierarchy with its interval encoding,
//! the prefix index over item texts, and the query engine that combines them.

/// Category names, ids and pre-order intervals.
pub mod category;
pub use category::{Category, CategoryId, CategoryName, Interval, InvalidNameError};

mod config;
pub use config::{Config, UnknownCategoryPolicy};

pub mod hierarchy;
pub use hierarchy::{Hierarchy, HierarchyError, Token};

/// Items and item text validation.
pub mod item;
pub use item::{InvalidTextError, Item};

pub mod prefix_index;
pub use prefix_index::{PrefixIndex, PrefixIndexBuilder, PrefixNode};

pub mod query;
pub use query::{BuildError, IndexStats, ItemRecord, QueryEngine, QueryError, QueryRecord};
