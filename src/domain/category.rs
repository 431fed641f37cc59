use std::{fmt, ops::Deref, str::FromStr};

use non_empty_string::NonEmptyString;

/// A validated category name containing only ASCII letters (`[A-Za-z]+`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CategoryName(NonEmptyString);

impl CategoryName {
    /// Creates a new `CategoryName` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidNameError` if the string is empty or contains
    /// characters other than ASCII letters.
    pub fn new(s: String) -> Result<Self, InvalidNameError> {
        if !s.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(InvalidNameError(s));
        }
        let non_empty = NonEmptyString::new(s).map_err(|_| InvalidNameError(String::new()))?;
        Ok(Self(non_empty))
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CategoryName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CategoryName {
    type Error = InvalidNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for CategoryName {
    type Err = InvalidNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for CategoryName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for CategoryName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a category name is empty or not purely alphabetic.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid category name '{0}': must be non-empty and contain only ASCII letters")]
pub struct InvalidNameError(String);

/// Index of a category inside its [`Hierarchy`](super::Hierarchy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryId(pub(crate) u32);

impl CategoryId {
    /// Returns the arena position of this category.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// The pre-order interval of a category.
///
/// Category `a` is an ancestor-or-self of `b` iff
/// `a.enter <= b.enter <= a.exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    /// Pre-order position of the category.
    pub enter: u32,
    /// Largest `enter` among the category and its descendants.
    pub exit: u32,
}

impl Interval {
    /// Returns `true` if the given pre-order position lies in this interval.
    #[must_use]
    pub const fn contains(self, enter: u32) -> bool {
        self.enter <= enter && enter <= self.exit
    }

    /// Returns `true` if `other` is nested inside (or equal to) this interval.
    #[must_use]
    pub const fn encloses(self, other: Self) -> bool {
        self.enter <= other.enter && other.exit <= self.exit
    }

    /// Returns `true` if the two intervals share no position.
    #[must_use]
    pub const fn is_disjoint(self, other: Self) -> bool {
        self.exit < other.enter || other.exit < self.enter
    }
}

/// One node of the category hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub(crate) name: CategoryName,
    pub(crate) parent: Option<CategoryId>,
    pub(crate) children: Vec<CategoryId>,
    pub(crate) interval: Interval,
}

impl Category {
    /// The category's unique name.
    #[must_use]
    pub const fn name(&self) -> &CategoryName {
        &self.name
    }

    /// The enclosing category, or `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<CategoryId> {
        self.parent
    }

    /// Direct children in declaration order.
    #[must_use]
    pub fn children(&self) -> &[CategoryId] {
        &self.children
    }

    /// The category's pre-order interval.
    #[must_use]
    pub const fn interval(&self) -> Interval {
        self.interval
    }

    /// Shorthand for `self.interval().enter`.
    #[must_use]
    pub const fn enter(&self) -> u32 {
        self.interval.enter
    }

    /// Shorthand for `self.interval().exit`.
    #[must_use]
    pub const fn exit(&self) -> u32 {
        self.interval.exit
    }

    /// Returns `true` if the category has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
