use crate::{
    error::{ConfigError, InternalError},
    index::{
        Bucket, ComparisonIndexer, EqualsComparisonIndexer, EqualsIndexer, IndexProperties,
        Indexer, IndexerKind, JoinerType, NoneIndexer, RangeIndexer,
    },
};
use std::{hash::Hash, ops::Range, sync::Arc};

///
/// IndexLevel
///
/// One level of a planned chain, with the columns it reads and the joiner
/// it answers (already flipped for the right bridge).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IndexLevel {
    Equal {
        columns: Range<usize>,
    },
    Comparison {
        column: usize,
        joiner: JoinerType,
    },
    EqualsComparison {
        equal_columns: Range<usize>,
        column: usize,
        joiner: JoinerType,
    },
    Range(RangeSpec),
}

impl IndexLevel {
    #[must_use]
    pub const fn kind(&self) -> IndexerKind {
        match self {
            Self::Equal { .. } => IndexerKind::Equals,
            Self::Comparison { .. } => IndexerKind::Comparison,
            Self::EqualsComparison { .. } => IndexerKind::EqualsComparison,
            Self::Range(_) => IndexerKind::Range,
        }
    }
}

///
/// RangeSpec
///
/// A validated lower-bound (`>`/`>=`) and upper-bound (`<`/`<=`) column pair,
/// given in either order. Joiners read `query joiner stored`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RangeSpec {
    pub lower: RangeBound,
    pub upper: RangeBound,
}

///
/// RangeBound
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RangeBound {
    pub column: usize,
    pub joiner: JoinerType,
}

impl RangeSpec {
    /// Validate two comparison columns as a range.
    pub fn new(first: RangeBound, second: RangeBound) -> Result<Self, InternalError> {
        Self::try_pair(first, second).ok_or_else(|| {
            InternalError::indexer_config(ConfigError::InvalidRange {
                first: first.joiner,
                second: second.joiner,
            })
        })
    }

    #[must_use]
    pub const fn try_pair(first: RangeBound, second: RangeBound) -> Option<Self> {
        if first.joiner.is_lower_bound() && second.joiner.is_upper_bound() {
            Some(Self {
                lower: first,
                upper: second,
            })
        } else if first.joiner.is_upper_bound() && second.joiner.is_lower_bound() {
            Some(Self {
                lower: second,
                upper: first,
            })
        } else {
            None
        }
    }

    /// Strict ranges cannot hold a single point.
    #[must_use]
    pub const fn admits_point(&self) -> bool {
        self.lower.joiner.is_inclusive() && self.upper.joiner.is_inclusive()
    }
}

///
/// IndexerPlan
///
/// Shared, immutable level list plus the position of the level a node
/// builds. Nodes hold the plan of their downstream levels and build child
/// nodes from it on demand.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexerPlan {
    levels: Arc<[IndexLevel]>,
    offset: usize,
}

impl IndexerPlan {
    #[must_use]
    pub fn new(levels: Vec<IndexLevel>) -> Self {
        Self {
            levels: levels.into(),
            offset: 0,
        }
    }

    #[must_use]
    pub fn head(&self) -> Option<&IndexLevel> {
        self.levels.get(self.offset)
    }

    /// The plan for everything below the head level.
    #[must_use]
    pub fn tail(&self) -> Self {
        Self {
            levels: Arc::clone(&self.levels),
            offset: (self.offset + 1).min(self.levels.len()),
        }
    }

    #[must_use]
    pub fn levels(&self) -> &[IndexLevel] {
        self.levels.get(self.offset..).unwrap_or_default()
    }

    #[must_use]
    pub fn build<T: Eq + Hash, V>(&self) -> IndexerNode<T, V> {
        IndexerNode::build(self)
    }
}

///
/// IndexerNode
///
/// Tagged variant over the five indexer kinds. The factory selects the
/// variant once per level; dispatch is a plain match from then on.
///

#[derive(Debug)]
pub enum IndexerNode<T, V> {
    None(NoneIndexer<T, V>),
    Equals(EqualsIndexer<T, V>),
    Comparison(ComparisonIndexer<T, V>),
    EqualsComparison(EqualsComparisonIndexer<T, V>),
    Range(RangeIndexer<T, V>),
}

impl<T: Eq + Hash, V> IndexerNode<T, V> {
    /// Build the node for the plan's head level.
    #[must_use]
    pub fn build(plan: &IndexerPlan) -> Self {
        match plan.head() {
            None => Self::None(NoneIndexer::new()),
            Some(IndexLevel::Equal { columns }) => {
                Self::Equals(EqualsIndexer::new(columns.clone(), plan.tail()))
            }
            Some(IndexLevel::Comparison { column, joiner }) => {
                Self::Comparison(ComparisonIndexer::new(*column, *joiner, plan.tail()))
            }
            Some(IndexLevel::EqualsComparison {
                equal_columns,
                column,
                joiner,
            }) => Self::EqualsComparison(EqualsComparisonIndexer::new(
                equal_columns.clone(),
                *column,
                *joiner,
            )),
            Some(IndexLevel::Range(spec)) => Self::Range(RangeIndexer::new(*spec, plan.tail())),
        }
    }
}

macro_rules! dispatch {
    ($node:expr, $indexer:ident => $body:expr) => {
        match $node {
            IndexerNode::None($indexer) => $body,
            IndexerNode::Equals($indexer) => $body,
            IndexerNode::Comparison($indexer) => $body,
            IndexerNode::EqualsComparison($indexer) => $body,
            IndexerNode::Range($indexer) => $body,
        }
    };
}

impl<T: Eq + Hash, V> Indexer<T, V> for IndexerNode<T, V> {
    fn kind(&self) -> IndexerKind {
        dispatch!(self, indexer => indexer.kind())
    }

    fn put(
        &mut self,
        properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        dispatch!(self, indexer => indexer.put(properties, tuple, value))
    }

    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        dispatch!(self, indexer => indexer.remove(properties, tuple))
    }

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        dispatch!(self, indexer => indexer.get(properties, tuple))
    }

    fn get_mut(
        &mut self,
        properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        dispatch!(self, indexer => indexer.get_mut(properties, tuple))
    }

    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        dispatch!(self, indexer => indexer.visit(properties, visitor))
    }

    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        dispatch!(self, indexer => indexer.visit_mut(properties, visitor))
    }

    fn count_values(&self) -> usize {
        dispatch!(self, indexer => indexer.count_values())
    }
}

///
/// TESTS
///
