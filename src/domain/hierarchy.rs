//! The category hierarchy and its pre-order interval encoding.
//!
//! A [`Hierarchy`] is built once from the flattened nested notation
//!
//! ```text
//! Animals ( Reptiles Birds ( Eagles Pigeons Crows ) )
//! ```
//!
//! and assigns every category an [`Interval`] such that subtree membership
//! reduces to a range check. Categories live in an arena in pre-order, so a
//! category's arena index equals its `enter` value.

use std::collections::HashMap;

use thiserror::Error;
use tracing::instrument;

use crate::domain::category::{Category, CategoryId, CategoryName, Interval, InvalidNameError};

/// One token of the flattened hierarchy notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// A category name.
    Name(&'a str),
    /// `(`: the children of the preceding name follow.
    Open,
    /// `)`: closes the innermost open group.
    Close,
}

/// Splits a hierarchy line into tokens on whitespace.
pub fn tokenize(line: &str) -> impl Iterator<Item = Token<'_>> {
    line.split_whitespace().map(|word| match word {
        "(" => Token::Open,
        ")" => Token::Close,
        name => Token::Name(name),
    })
}

/// Errors that make a hierarchy impossible to index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    /// The token stream contained no category.
    #[error("hierarchy is empty")]
    Empty,
    /// A `)` was found with no open group.
    #[error("unbalanced ')' at token {0}")]
    UnbalancedClose(usize),
    /// A `(` did not directly follow a category name.
    #[error("'(' at token {0} does not follow a category name")]
    OrphanOpen(usize),
    /// The stream ended while a group was still open.
    #[error("children of '{0}' are never closed")]
    UnclosedGroup(CategoryName),
    /// The same name was declared twice.
    #[error("category '{0}' is declared more than once")]
    DuplicateCategory(CategoryName),
    /// A second category was declared at the top level.
    #[error("category '{0}' is a second root; the hierarchy must have exactly one root")]
    MultipleRoots(CategoryName),
    /// A name was not a valid category name.
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
}

/// An immutable, interval-encoded category tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    /// Categories in pre-order; the index of each equals its `enter`.
    categories: Vec<Category>,
    by_name: HashMap<String, CategoryId>,
    root: CategoryId,
    depth: usize,
}

/// Running state of a single hierarchy build.
///
/// Holds the Euler-tour counter and the ancestor stack. Dropped once the last
/// token has been consumed.
#[derive(Debug, Default)]
struct BuildContext {
    categories: Vec<Category>,
    by_name: HashMap<String, CategoryId>,
    stack: Vec<CategoryId>,
    counter: u32,
    /// The category declared by the previous token, if it was a name.
    last_declared: Option<CategoryId>,
    root: Option<CategoryId>,
    depth: usize,
}

impl BuildContext {
    fn declare(&mut self, name: &str) -> Result<(), HierarchyError> {
        let name = CategoryName::try_from(name)?;
        if self.by_name.contains_key(name.as_str()) {
            return Err(HierarchyError::DuplicateCategory(name));
        }

        let parent = self.stack.last().copied();
        if parent.is_none() && self.root.is_some() {
            return Err(HierarchyError::MultipleRoots(name));
        }

        let id = CategoryId(self.counter);
        let enter = self.counter;
        self.counter += 1;

        match parent {
            Some(parent) => self.categories[parent.index()].children.push(id),
            None => self.root = Some(id),
        }
        self.depth = self.depth.max(self.stack.len() + 1);

        self.by_name.insert(name.to_string(), id);
        self.categories.push(Category {
            name,
            parent,
            children: Vec::new(),
            interval: Interval { enter, exit: enter },
        });
        self.last_declared = Some(id);
        Ok(())
    }

    fn open(&mut self, position: usize) -> Result<(), HierarchyError> {
        let parent = self
            .last_declared
            .take()
            .ok_or(HierarchyError::OrphanOpen(position))?;
        self.stack.push(parent);
        Ok(())
    }

    fn close(&mut self, position: usize) -> Result<(), HierarchyError> {
        let closed = self
            .stack
            .pop()
            .ok_or(HierarchyError::UnbalancedClose(position))?;
        // Everything declared since `closed` is one of its descendants.
        self.categories[closed.index()].interval.exit = self.counter - 1;
        self.last_declared = None;
        Ok(())
    }

    fn finish(mut self) -> Result<Hierarchy, HierarchyError> {
        if let Some(open) = self.stack.pop() {
            let name = self.categories[open.index()].name.clone();
            return Err(HierarchyError::UnclosedGroup(name));
        }
        let root = self.root.ok_or(HierarchyError::Empty)?;

        Ok(Hierarchy {
            categories: self.categories,
            by_name: self.by_name,
            root,
            depth: self.depth,
        })
    }
}

impl Hierarchy {
    /// Builds a hierarchy from a token stream.
    ///
    /// # Errors
    ///
    /// Returns a [`HierarchyError`] if the grouping markers are unbalanced, a
    /// name is invalid or repeated, or the stream does not describe exactly
    /// one tree.
    #[instrument(level = "debug", skip(tokens))]
    pub fn build<'a>(tokens: impl IntoIterator<Item = Token<'a>>) -> Result<Self, HierarchyError> {
        let mut context = BuildContext::default();

        for (position, token) in tokens.into_iter().enumerate() {
            match token {
                Token::Name(name) => context.declare(name)?,
                Token::Open => context.open(position)?,
                Token::Close => context.close(position)?,
            }
        }

        let hierarchy = context.finish()?;
        tracing::debug!(
            categories = hierarchy.len(),
            depth = hierarchy.depth(),
            "indexed hierarchy"
        );
        Ok(hierarchy)
    }

    /// Tokenizes and builds a hierarchy from its one-line textual form.
    ///
    /// # Errors
    ///
    /// See [`Hierarchy::build`].
    pub fn parse(line: &str) -> Result<Self, HierarchyError> {
        Self::build(tokenize(line))
    }

    /// Looks up a category by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Category> {
        self.id(name).map(|id| self.category(id))
    }

    /// Looks up a category id by name.
    #[must_use]
    pub fn id(&self, name: &str) -> Option<CategoryId> {
        self.by_name.get(name).copied()
    }

    /// Returns the category with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this hierarchy.
    #[must_use]
    pub fn category(&self, id: CategoryId) -> &Category {
        &self.categories[id.index()]
    }

    /// The single root category.
    #[must_use]
    pub fn root(&self) -> &Category {
        self.category(self.root)
    }

    /// Direct children of a category, in declaration order.
    pub fn children(&self, id: CategoryId) -> impl Iterator<Item = &Category> {
        self.category(id)
            .children
            .iter()
            .map(|&child| self.category(child))
    }

    /// The parent of a category, or `None` for the root.
    #[must_use]
    pub fn parent(&self, id: CategoryId) -> Option<&Category> {
        self.category(id).parent.map(|parent| self.category(parent))
    }

    /// Returns `true` if `ancestor` is `descendant` or one of its ancestors.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: CategoryId, descendant: CategoryId) -> bool {
        self.category(ancestor)
            .interval
            .contains(self.category(descendant).interval.enter)
    }

    /// Number of categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Always `false`: a built hierarchy has a root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of levels; a lone root has depth 1.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// All categories in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }
}
