//! Answering subtree-scoped prefix counts.
//!
//! A [`QueryEngine`] owns a built [`Hierarchy`] and [`PrefixIndex`]. Both are
//! immutable once the engine exists, so `&QueryEngine` can be shared freely
//! between threads.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    Config, Hierarchy, UnknownCategoryPolicy,
    item::{Item, InvalidTextError, validate_text},
    prefix_index::{PrefixIndex, PrefixIndexBuilder},
};

/// An item as read from input: a category name and a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    /// Name of the owning category.
    pub category: String,
    /// The item text.
    pub text: String,
}

/// A query as read from input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRecord {
    /// Name of the category whose subtree is searched.
    pub category: String,
    /// The prefix to match; may be empty.
    pub prefix: String,
}

/// Errors raised while indexing items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// An item names a category that is not in the hierarchy.
    #[error("item {item} refers to unknown category '{name}'")]
    UnknownCategory {
        /// 1-based position of the item.
        item: usize,
        /// The unresolved name.
        name: String,
    },
    /// An item's text failed validation.
    #[error("item {item} has invalid text: {source}")]
    InvalidText {
        /// 1-based position of the item.
        item: usize,
        /// What was wrong with the text.
        source: InvalidTextError,
    },
}

/// Errors raised while answering a query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The query names a category that is not in the hierarchy.
    #[error("unknown category '{0}'")]
    UnknownCategory(String),
}

/// Summary figures for a built engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    /// Number of categories.
    pub categories: usize,
    /// Number of hierarchy levels.
    pub depth: usize,
    /// Number of indexed items.
    pub items: usize,
    /// Number of distinct prefixes, including the empty one.
    pub prefix_nodes: usize,
    /// Total category entries stored across all prefixes.
    pub entries: usize,
}

/// Answers `(category, prefix)` counts over an immutable index.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    hierarchy: Hierarchy,
    index: PrefixIndex,
    parallel: bool,
}

impl QueryEngine {
    /// Indexes `items` against `hierarchy`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::UnknownCategory`] for an undeclared category when
    /// the configured policy is [`UnknownCategoryPolicy::Reject`], and
    /// [`BuildError::InvalidText`] for malformed text when
    /// [`Config::strict_text`] is set.
    #[instrument(level = "debug", skip_all, fields(items = items.len()))]
    pub fn build(
        hierarchy: Hierarchy,
        items: &[ItemRecord],
        config: &Config,
    ) -> Result<Self, BuildError> {
        let capacity = items.iter().map(|item| item.text.len()).sum::<usize>() + 1;
        let mut builder = PrefixIndexBuilder::with_capacity(capacity);
        for (position, record) in items.iter().enumerate() {
            if let Some(item) = resolve(&hierarchy, record, position + 1, config)? {
                let enter = hierarchy.category(item.category).enter();
                builder.insert(item.text, enter);
            }
        }

        let skipped = items.len() - builder.item_count();
        if skipped > 0 {
            tracing::warn!("skipped {skipped} item(s) with unknown categories");
        }

        Ok(Self {
            hierarchy,
            index: builder.finalize(),
            parallel: config.parallel_queries,
        })
    }

    /// Counts items in the subtree of `category` whose text starts with
    /// `prefix`. The empty prefix matches every item.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownCategory`] if `category` is not in the
    /// hierarchy. An unseen prefix is not an error; it counts zero.
    pub fn count(&self, category: &str, prefix: &str) -> Result<usize, QueryError> {
        let category = self
            .hierarchy
            .get(category)
            .ok_or_else(|| QueryError::UnknownCategory(category.to_string()))?;
        Ok(self.index.count_in(prefix, category.interval()))
    }

    /// Answers a batch of queries, preserving input order.
    ///
    /// # Errors
    ///
    /// Fails if any query names an unknown category. The error reported is the
    /// one for the earliest such query, also when answering in parallel.
    #[instrument(level = "debug", skip_all, fields(queries = queries.len(), parallel = self.parallel))]
    pub fn count_all(&self, queries: &[QueryRecord]) -> Result<Vec<usize>, QueryError> {
        let answer = |query: &QueryRecord| self.count(&query.category, &query.prefix);
        if self.parallel {
            // Collected in full so the earliest error in input order wins.
            let answers: Vec<_> = queries.par_iter().map(answer).collect();
            answers.into_iter().collect()
        } else {
            queries.iter().map(answer).collect()
        }
    }

    /// The category hierarchy.
    #[must_use]
    pub const fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// The prefix index.
    #[must_use]
    pub const fn index(&self) -> &PrefixIndex {
        &self.index
    }

    /// Size figures for the hierarchy and the index.
    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            categories: self.hierarchy.len(),
            depth: self.hierarchy.depth(),
            items: self.index.item_count(),
            prefix_nodes: self.index.node_count(),
            entries: self.index.entry_count(),
        }
    }
}

/// Resolves an item's category, applying the configured policies.
///
/// Returns `Ok(None)` for an item that should be skipped.
fn resolve<'a>(
    hierarchy: &Hierarchy,
    record: &'a ItemRecord,
    position: usize,
    config: &Config,
) -> Result<Option<Item<'a>>, BuildError> {
    let Some(category) = hierarchy.id(&record.category) else {
        return match config.unknown_item_category {
            UnknownCategoryPolicy::Reject => Err(BuildError::UnknownCategory {
                item: position,
                name: record.category.clone(),
            }),
            UnknownCategoryPolicy::Skip => {
                tracing::warn!(
                    item = position,
                    category = %record.category,
                    "skipping item with unknown category"
                );
                Ok(None)
            }
        };
    };

    if config.strict_text {
        validate_text(&record.text).map_err(|source| BuildError::InvalidText {
            item: position,
            source,
        })?;
    }

    Ok(Some(Item {
        category,
        text: &record.text,
    }))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    const HIERARCHY: &str = "Animals ( Reptiles Birds ( Eagles Pigeons Crows ) )";

    fn items() -> Vec<ItemRecord> {
        [
            ("Reptiles", "Why are many reptiles green?"),
            ("Birds", "How do birds fly?"),
            ("Eagles", "How endangered are eagles?"),
            ("Pigeons", "Where in the world are pigeons most densely populated?"),
            ("Eagles", "Where do most eagles live?"),
        ]
        .into_iter()
        .map(|(category, text)| ItemRecord {
            category: category.to_string(),
            text: text.to_string(),
        })
        .collect()
    }

    fn engine() -> QueryEngine {
        QueryEngine::build(
            Hierarchy::parse(HIERARCHY).unwrap(),
            &items(),
            &Config::default(),
        )
        .unwrap()
    }

    fn query(category: &str, prefix: &str) -> QueryRecord {
        QueryRecord {
            category: category.to_string(),
            prefix: prefix.to_string(),
        }
    }

    #[test_case("Eagles", "How en", 1)]
    #[test_case("Birds", "Where", 2)]
    #[test_case("Reptiles", "Why do", 0)]
    #[test_case("Animals", "Wh", 3)]
    fn worked_example(category: &str, prefix: &str, expected: usize) {
        assert_eq!(engine().count(category, prefix), Ok(expected));
    }

    #[test_case("Animals", 5; "root")]
    #[test_case("Birds", 4; "inner")]
    #[test_case("Eagles", 2; "leaf")]
    #[test_case("Crows", 0; "leaf without items")]
    fn empty_prefix_counts_subtree(category: &str, expected: usize) {
        assert_eq!(engine().count(category, ""), Ok(expected));
    }

    #[test]
    fn unknown_query_category_is_an_error() {
        assert_eq!(
            engine().count("Fish", "Wh"),
            Err(QueryError::UnknownCategory("Fish".to_string()))
        );
    }

    #[test]
    fn unseen_prefix_counts_zero() {
        assert_eq!(engine().count("Animals", "Zebra"), Ok(0));
        assert_eq!(engine().count("Animals", "How do birds fly? "), Ok(0));
    }

    #[test]
    fn batch_preserves_order() {
        let queries = [
            query("Eagles", "How en"),
            query("Birds", "Where"),
            query("Reptiles", "Why do"),
            query("Animals", "Wh"),
        ];
        assert_eq!(engine().count_all(&queries), Ok(vec![1, 2, 0, 3]));
    }

    #[test]
    fn batch_fails_on_unknown_category() {
        let queries = [query("Birds", "Where"), query("Fish", "W")];
        assert_eq!(
            engine().count_all(&queries),
            Err(QueryError::UnknownCategory("Fish".to_string()))
        );
    }

    #[test_case(true; "parallel")]
    #[test_case(false; "sequential")]
    fn batch_reports_earliest_unknown_category(parallel_queries: bool) {
        let config = Config {
            parallel_queries,
            ..Config::default()
        };
        let engine =
            QueryEngine::build(Hierarchy::parse(HIERARCHY).unwrap(), &items(), &config).unwrap();

        let mut queries: Vec<_> = (0..500).map(|_| query("Birds", "Wh")).collect();
        queries[100] = query("Fish", "W");
        queries[400] = query("Whales", "W");

        assert_eq!(
            engine.count_all(&queries),
            Err(QueryError::UnknownCategory("Fish".to_string()))
        );
    }

    #[test]
    fn sequential_and_parallel_batches_agree() {
        let sequential = Config {
            parallel_queries: false,
            ..Config::default()
        };
        let engine_seq =
            QueryEngine::build(Hierarchy::parse(HIERARCHY).unwrap(), &items(), &sequential)
                .unwrap();
        let queries: Vec<_> = ["Animals", "Birds", "Eagles", "Crows"]
            .into_iter()
            .flat_map(|c| ["", "W", "Wh", "How", "H"].map(|p| query(c, p)))
            .collect();

        assert_eq!(
            engine_seq.count_all(&queries).unwrap(),
            engine().count_all(&queries).unwrap()
        );
    }

    #[test]
    fn unknown_item_category_rejected_by_default() {
        let mut records = items();
        records.push(ItemRecord {
            category: "Fish".to_string(),
            text: "Do fish sleep?".to_string(),
        });

        let err = QueryEngine::build(
            Hierarchy::parse(HIERARCHY).unwrap(),
            &records,
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownCategory {
                item: 6,
                name: "Fish".to_string()
            }
        );
    }

    #[test]
    fn unknown_item_category_skipped_when_configured() {
        let mut records = items();
        records.insert(
            0,
            ItemRecord {
                category: "Fish".to_string(),
                text: "Why do fish swim?".to_string(),
            },
        );
        let config = Config {
            unknown_item_category: UnknownCategoryPolicy::Skip,
            ..Config::default()
        };

        let engine =
            QueryEngine::build(Hierarchy::parse(HIERARCHY).unwrap(), &records, &config).unwrap();
        assert_eq!(engine.count("Animals", ""), Ok(5));
        assert_eq!(engine.count("Animals", "Why"), Ok(1));
    }

    #[test]
    fn strict_text_rejects_bad_items() {
        let records = vec![ItemRecord {
            category: "Birds".to_string(),
            text: "Why  fly?".to_string(),
        }];
        let err = QueryEngine::build(
            Hierarchy::parse(HIERARCHY).unwrap(),
            &records,
            &Config::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            BuildError::InvalidText {
                item: 1,
                source: InvalidTextError::Spacing
            }
        );
    }

    #[test]
    fn lenient_text_indexes_anything() {
        let records = vec![
            ItemRecord {
                category: "Birds".to_string(),
                text: "Why, though?".to_string(),
            },
            ItemRecord {
                category: "Eagles".to_string(),
                text: String::new(),
            },
        ];
        let config = Config {
            strict_text: false,
            ..Config::default()
        };

        let engine =
            QueryEngine::build(Hierarchy::parse(HIERARCHY).unwrap(), &records, &config).unwrap();
        assert_eq!(engine.count("Birds", "Why,"), Ok(1));
        assert_eq!(engine.count("Birds", ""), Ok(2));
        assert_eq!(engine.count("Eagles", "W"), Ok(0));
    }

    #[test]
    fn stats_reflect_index() {
        let stats = engine().stats();
        assert_eq!(stats.categories, 6);
        assert_eq!(stats.depth, 3);
        assert_eq!(stats.items, 5);
        let chars: usize = items().iter().map(|i| i.text.len()).sum();
        assert_eq!(stats.entries, chars + 5);
        assert!(stats.prefix_nodes <= chars + 1);
    }

    /// A wider hierarchy with items spread over every level.
    fn corpus() -> (Hierarchy, Vec<ItemRecord>) {
        let hierarchy =
            Hierarchy::parse("A ( B ( C D ( E F ) ) G ( H ) I ( J ( K ( L ) ) ) )").unwrap();
        let words = ["How", "Why", "What", "Where", "Who", "When"];
        let tails = ["is it", "do they", "are we", "did it go", "was"];

        let names: Vec<String> = hierarchy
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let mut seed = 17usize;
        let mut records = Vec::new();
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345) % (1 << 31);
            let category = names[seed % names.len()].clone();
            let text = format!(
                "{} {}?",
                words[(seed / 7) % words.len()],
                tails[(seed / 11) % tails.len()]
            );
            records.push(ItemRecord { category, text });
        }
        (hierarchy, records)
    }

    const PREFIXES: &[&str] = &["", "W", "Wh", "Wha", "What", "What is", "H", "How d", "x"];

    #[test]
    fn matches_naive_ancestor_scan() {
        let (hierarchy, records) = corpus();
        let engine = QueryEngine::build(hierarchy.clone(), &records, &Config::default()).unwrap();

        for category in hierarchy.iter() {
            let ancestor = hierarchy.id(category.name()).unwrap();
            for prefix in PREFIXES {
                let expected = records
                    .iter()
                    .filter(|r| r.text.starts_with(prefix))
                    .filter(|r| {
                        hierarchy.is_ancestor_or_self(ancestor, hierarchy.id(&r.category).unwrap())
                    })
                    .count();
                assert_eq!(engine.count(category.name(), prefix), Ok(expected));
            }
        }
    }

    #[test]
    fn root_with_empty_prefix_counts_everything() {
        let (hierarchy, records) = corpus();
        let root = hierarchy.root().name().to_string();
        let engine = QueryEngine::build(hierarchy, &records, &Config::default()).unwrap();
        assert_eq!(engine.count(&root, ""), Ok(records.len()));
    }

    #[test]
    fn extending_a_prefix_never_increases_the_count() {
        let (hierarchy, records) = corpus();
        let engine = QueryEngine::build(hierarchy.clone(), &records, &Config::default()).unwrap();

        for category in hierarchy.iter() {
            for record in &records {
                let text = &record.text;
                for end in 0..text.len() {
                    let shorter = engine.count(category.name(), &text[..end]).unwrap();
                    let longer = engine.count(category.name(), &text[..=end]).unwrap();
                    assert!(shorter >= longer);
                }
            }
        }
    }

    #[test]
    fn subtree_count_is_own_plus_children() {
        let (hierarchy, records) = corpus();
        let engine = QueryEngine::build(hierarchy.clone(), &records, &Config::default()).unwrap();

        for category in hierarchy.iter() {
            for prefix in PREFIXES {
                let own = records
                    .iter()
                    .filter(|r| r.category == category.name().as_str())
                    .filter(|r| r.text.starts_with(prefix))
                    .count();
                let children: usize = category
                    .children()
                    .iter()
                    .map(|&c| {
                        engine
                            .count(hierarchy.category(c).name(), prefix)
                            .unwrap()
                    })
                    .sum();
                assert_eq!(engine.count(category.name(), prefix), Ok(own + children));
            }
        }
    }

    #[test]
    fn rebuilding_gives_identical_answers() {
        let (hierarchy, records) = corpus();
        let first = QueryEngine::build(hierarchy.clone(), &records, &Config::default()).unwrap();
        let second = QueryEngine::build(hierarchy.clone(), &records, &Config::default()).unwrap();

        assert_eq!(first.index(), second.index());
        let queries: Vec<_> = hierarchy
            .iter()
            .flat_map(|c| PREFIXES.iter().map(|p| query(c.name(), p)))
            .collect();
        assert_eq!(first.count_all(&queries), second.count_all(&queries));
    }
}
