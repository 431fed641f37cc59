use std::path::Path;

use serde::{Deserialize, Serialize};

/// What to do with an item whose category is not part of the hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownCategoryPolicy {
    /// Fail the build.
    #[default]
    Reject,
    /// Drop the item and log a warning.
    Skip,
}

/// Configuration for building and querying an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// Handling of items that name an undeclared category.
    ///
    /// Queries that name an undeclared category are always an error.
    pub unknown_item_category: UnknownCategoryPolicy,

    /// Whether item texts must use only letters, spaces and '?', with no
    /// leading, trailing or doubled spaces.
    ///
    /// When `false`, any text is indexed byte by byte.
    pub strict_text: bool,

    /// Whether batches of queries are answered on the rayon thread pool.
    pub parallel_queries: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unknown_item_category: UnknownCategoryPolicy::default(),
            strict_text: true,
            parallel_queries: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }
}

const fn default_true() -> bool {
    true
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        unknown_item_category: UnknownCategoryPolicy,

        #[serde(default = "default_true")]
        strict_text: bool,

        #[serde(default = "default_true")]
        parallel_queries: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                unknown_item_category,
                strict_text,
                parallel_queries,
            } => Self {
                unknown_item_category,
                strict_text,
                parallel_queries,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            unknown_item_category: config.unknown_item_category,
            strict_text: config.strict_text,
            parallel_queries: config.parallel_queries,
        }
    }
}
