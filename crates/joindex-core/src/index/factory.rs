//! Module: index::factory
//! Responsibility: turn an ordered joiner list into the minimal indexer chain.
//! Does not own: key extraction (callers build properties in joiner order).
//!
//! Column `i` of the properties always answers joiner `i`. Consecutive
//! equality joiners share one level; each comparison gets its own level.

use crate::{
    error::{ConfigError, InternalError},
    index::{
        IndexLevel, IndexerConfig, IndexerNode, IndexerPlan, JoinerType, RangeBound, RangeSpec,
    },
};
use std::{hash::Hash, ops::Range};

///
/// IndexerFactory
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexerFactory {
    joiners: Vec<JoinerType>,
    config: IndexerConfig,
}

impl IndexerFactory {
    /// Validate the joiners under the default configuration.
    pub fn new(joiners: impl IntoIterator<Item = JoinerType>) -> Result<Self, InternalError> {
        Self::with_config(joiners, IndexerConfig::default())
    }

    pub fn with_config(
        joiners: impl IntoIterator<Item = JoinerType>,
        config: IndexerConfig,
    ) -> Result<Self, InternalError> {
        let joiners: Vec<_> = joiners.into_iter().collect();
        if let Some(joiner) = joiners.iter().find(|joiner| !joiner.is_indexable()) {
            return Err(InternalError::factory_config(
                ConfigError::UnsupportedJoiner { joiner: *joiner },
            ));
        }

        Ok(Self { joiners, config })
    }

    #[must_use]
    pub fn joiners(&self) -> &[JoinerType] {
        &self.joiners
    }

    #[must_use]
    pub const fn config(&self) -> IndexerConfig {
        self.config
    }

    /// Level list for one side of the join, outermost first.
    ///
    /// The right bridge indexes right tuples and is queried with left
    /// properties, so every comparison is mirrored.
    #[must_use]
    pub fn levels(&self, is_left_bridge: bool) -> Vec<IndexLevel> {
        let mut levels: Vec<IndexLevel> = runs(&self.joiners)
            .into_iter()
            .map(|run| match run {
                Run::Equal(columns) => IndexLevel::Equal { columns },
                Run::Comparison(column) => {
                    let joiner = self.joiners[column];
                    IndexLevel::Comparison {
                        column,
                        joiner: if is_left_bridge { joiner } else { joiner.flip() },
                    }
                }
            })
            .collect();

        if self.config.fuse_ranges && !is_left_bridge {
            levels = self.fuse_ranges(levels);
        }
        if self.config.fuse_equal_comparison {
            fuse_trailing_equal_comparison(&mut levels);
        }

        levels
    }

    #[must_use]
    pub fn plan(&self, is_left_bridge: bool) -> IndexerPlan {
        IndexerPlan::new(self.levels(is_left_bridge))
    }

    /// Build an empty root node for one side of the join.
    #[must_use]
    pub fn build_indexer<T: Eq + Hash, V>(&self, is_left_bridge: bool) -> IndexerNode<T, V> {
        self.plan(is_left_bridge).build()
    }

    // Range levels take the unflipped joiners: they read `query joiner stored`.
    fn fuse_ranges(&self, levels: Vec<IndexLevel>) -> Vec<IndexLevel> {
        let mut fused = Vec::with_capacity(levels.len());
        let mut levels = levels.into_iter().peekable();

        while let Some(level) = levels.next() {
            let pair = match (&level, levels.peek()) {
                (
                    IndexLevel::Comparison { column: first, .. },
                    Some(IndexLevel::Comparison { column: second, .. }),
                ) => RangeSpec::try_pair(
                    RangeBound {
                        column: *first,
                        joiner: self.joiners[*first],
                    },
                    RangeBound {
                        column: *second,
                        joiner: self.joiners[*second],
                    },
                ),
                _ => None,
            };

            match pair {
                Some(spec) => {
                    levels.next();
                    fused.push(IndexLevel::Range(spec));
                }
                None => fused.push(level),
            }
        }

        fused
    }
}

///
/// Run
///

#[derive(Clone, Debug, Eq, PartialEq)]
enum Run {
    Equal(Range<usize>),
    Comparison(usize),
}

fn runs(joiners: &[JoinerType]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();

    for (column, joiner) in joiners.iter().enumerate() {
        match (joiner, runs.last_mut()) {
            (JoinerType::Equal, Some(Run::Equal(columns))) => columns.end = column + 1,
            (JoinerType::Equal, _) => runs.push(Run::Equal(column..column + 1)),
            _ => runs.push(Run::Comparison(column)),
        }
    }

    runs
}

fn fuse_trailing_equal_comparison(levels: &mut Vec<IndexLevel>) {
    let [.., IndexLevel::Equal { columns }, IndexLevel::Comparison { column, joiner }] =
        levels.as_slice()
    else {
        return;
    };
    let fused = IndexLevel::EqualsComparison {
        equal_columns: columns.clone(),
        column: *column,
        joiner: *joiner,
    };

    levels.truncate(levels.len() - 2);
    levels.push(fused);
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::IndexerFactory;
    use crate::{
        error::ConfigError,
        index::{
            IndexLevel, Indexer, IndexerConfig, IndexerKind, JoinerType,
            JoinerType::{Equal, GreaterThan, GreaterThanOrEqual, LessThan, LessThanOrEqual},
            RangeBound,
        },
    };

    #[test]
    fn no_joiners_build_a_leaf() {
        let factory = IndexerFactory::new([]).unwrap();

        assert!(factory.levels(true).is_empty());
        assert_eq!(
            factory.build_indexer::<u32, ()>(true).kind(),
            IndexerKind::None
        );
    }

    #[test]
    fn consecutive_equalities_share_one_level() {
        let factory = IndexerFactory::new([Equal, Equal, LessThan]).unwrap();

        assert_eq!(
            factory.levels(true),
            vec![
                IndexLevel::Equal { columns: 0..2 },
                IndexLevel::Comparison {
                    column: 2,
                    joiner: LessThan
                },
            ]
        );
    }

    #[test]
    fn comparisons_split_equality_runs() {
        let factory = IndexerFactory::new([Equal, GreaterThan, Equal, Equal]).unwrap();

        assert_eq!(
            factory.levels(true),
            vec![
                IndexLevel::Equal { columns: 0..1 },
                IndexLevel::Comparison {
                    column: 1,
                    joiner: GreaterThan
                },
                IndexLevel::Equal { columns: 2..4 },
            ]
        );
    }

    #[test]
    fn right_bridge_flips_comparisons() {
        let factory = IndexerFactory::new([Equal, LessThanOrEqual]).unwrap();

        assert_eq!(
            factory.levels(false)[1],
            IndexLevel::Comparison {
                column: 1,
                joiner: GreaterThanOrEqual
            }
        );
    }

    #[test]
    fn unsupported_joiner_fails_construction() {
        let err = IndexerFactory::new([Equal, JoinerType::Intersecting]).unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(
            err.config_error(),
            Some(&ConfigError::UnsupportedJoiner {
                joiner: JoinerType::Intersecting
            })
        );
    }

    #[test]
    fn trailing_equal_comparison_fuses_when_enabled() {
        let config = IndexerConfig {
            fuse_equal_comparison: true,
            fuse_ranges: false,
        };
        let factory = IndexerFactory::with_config([Equal, Equal, LessThan], config).unwrap();

        assert_eq!(
            factory.levels(true),
            vec![IndexLevel::EqualsComparison {
                equal_columns: 0..2,
                column: 2,
                joiner: LessThan
            }]
        );
    }

    #[test]
    fn bounding_comparisons_fuse_into_a_range_on_the_right_bridge_only() {
        let factory = IndexerFactory::with_config(
            [Equal, GreaterThanOrEqual, LessThan],
            IndexerConfig {
                fuse_equal_comparison: false,
                fuse_ranges: true,
            },
        )
        .unwrap();

        assert_eq!(factory.levels(true).len(), 3);

        let right = factory.levels(false);
        assert_eq!(right.len(), 2);
        let IndexLevel::Range(spec) = &right[1] else {
            panic!("expected a range level, got {:?}", right[1]);
        };
        assert_eq!(
            spec.lower,
            RangeBound {
                column: 1,
                joiner: GreaterThanOrEqual
            }
        );
        assert_eq!(
            spec.upper,
            RangeBound {
                column: 2,
                joiner: LessThan
            }
        );
    }

    #[test]
    fn same_direction_comparisons_never_fuse() {
        let factory = IndexerFactory::with_config(
            [LessThan, LessThanOrEqual],
            IndexerConfig::optimized(),
        )
        .unwrap();

        assert!(
            factory
                .levels(false)
                .iter()
                .all(|level| level.kind() == IndexerKind::Comparison)
        );
    }
}
