//! Prefix tree over item texts, annotated with category pre-order positions.
//!
//! Every node stands for one distinct prefix and records the `enter` value of
//! the owning category of each item that has that prefix. An item therefore
//! adds one entry per prefix of its text (plus one at the root for the empty
//! prefix), regardless of how deep its category sits in the hierarchy. The
//! subtree restriction is applied at query time by range-counting the sorted
//! entries against a category's [`Interval`].
//!
//! Building happens in two phases: [`PrefixIndexBuilder::insert`] appends
//! unsorted entries, then [`PrefixIndexBuilder::finalize`] sorts every node's
//! entries exactly once.

use std::collections::HashMap;

use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use tracing::instrument;

use crate::domain::category::Interval;

const ROOT: usize = 0;

/// One node of the prefix tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixNode {
    children: HashMap<u8, usize>,
    entries: Vec<u32>,
}

impl PrefixNode {
    /// The category `enter` values of every item with this prefix.
    ///
    /// Sorted once the index is finalized.
    #[must_use]
    pub fn entries(&self) -> &[u32] {
        &self.entries
    }

    /// Number of items with this prefix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no item has this prefix.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts entries whose category lies inside `interval`.
    ///
    /// Requires sorted entries; `O(log n)`.
    #[must_use]
    pub fn count_in(&self, interval: Interval) -> usize {
        let below = self.entries.partition_point(|&enter| enter < interval.enter);
        let up_to = self.entries.partition_point(|&enter| enter <= interval.exit);
        up_to - below
    }
}

/// Accumulates item texts before the one-off sort.
#[derive(Debug, Clone)]
pub struct PrefixIndexBuilder {
    nodes: Vec<PrefixNode>,
    items: usize,
}

impl Default for PrefixIndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixIndexBuilder {
    /// Creates a builder holding only the root (empty prefix) node.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Creates a builder with room for `nodes` prefix nodes.
    ///
    /// The total character count of the corpus is an upper bound.
    #[must_use]
    pub fn with_capacity(nodes: usize) -> Self {
        let mut arena = Vec::with_capacity(nodes.max(1));
        arena.push(PrefixNode::default());
        Self {
            nodes: arena,
            items: 0,
        }
    }

    /// Adds one item: its text and the `enter` value of its category.
    ///
    /// Appends `enter` to the root and to the node of every prefix of `text`.
    pub fn insert(&mut self, text: &str, enter: u32) {
        let mut current = ROOT;
        self.nodes[current].entries.push(enter);

        for byte in text.bytes() {
            current = self.child_or_insert(current, byte);
            self.nodes[current].entries.push(enter);
        }

        self.items += 1;
    }

    /// Returns the child of `parent` along `byte`, creating it if needed.
    fn child_or_insert(&mut self, parent: usize, byte: u8) -> usize {
        if let Some(&child) = self.nodes[parent].children.get(&byte) {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(PrefixNode::default());
        self.nodes[parent].children.insert(byte, child);
        child
    }

    /// Number of items inserted so far.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.items
    }

    /// Sorts every node's entries and freezes the index.
    ///
    /// Nodes are independent, so they are sorted in parallel; the result does
    /// not depend on scheduling.
    #[instrument(level = "debug", skip(self), fields(nodes = self.nodes.len(), items = self.items))]
    #[must_use]
    pub fn finalize(mut self) -> PrefixIndex {
        self.nodes
            .par_iter_mut()
            .for_each(|node| node.entries.sort_unstable());

        let index = PrefixIndex {
            nodes: self.nodes,
            items: self.items,
        };
        tracing::debug!(
            nodes = index.node_count(),
            entries = index.entry_count(),
            "finalized prefix index"
        );
        index
    }
}

/// An immutable prefix index with sorted entries at every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixIndex {
    nodes: Vec<PrefixNode>,
    items: usize,
}

impl PrefixIndex {
    /// The node for the empty prefix; its entries cover every item.
    #[must_use]
    pub fn root(&self) -> &PrefixNode {
        &self.nodes[ROOT]
    }

    /// Walks `prefix` from the root.
    ///
    /// Returns `None` if no indexed text starts with `prefix`.
    #[must_use]
    pub fn find(&self, prefix: &str) -> Option<&PrefixNode> {
        prefix.bytes().try_fold(self.root(), |node, byte| {
            node.children
                .get(&byte)
                .map(|&child| &self.nodes[child])
        })
    }

    /// Counts items starting with `prefix` whose category lies in `interval`.
    ///
    /// `O(len(prefix) + log n)`.
    #[must_use]
    pub fn count_in(&self, prefix: &str, interval: Interval) -> usize {
        self.find(prefix).map_or(0, |node| node.count_in(interval))
    }

    /// Number of items indexed.
    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.items
    }

    /// Number of prefix nodes, including the root.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total entries across all nodes.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.nodes.iter().map(PrefixNode::len).sum()
    }
}
