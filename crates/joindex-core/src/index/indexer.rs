use crate::{
    error::InternalError,
    index::{Bucket, IndexProperties, JoinerType},
};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Bound};

///
/// Indexer
///
/// One level of an indexer chain. A level owns its downstream levels and
/// creates them lazily on the first `put` for a key; the `remove` that
/// empties a downstream level drops it.
///
/// Every level reads its own columns out of the same `IndexProperties`;
/// the caller passes the identical properties on `put`, `get` and `remove`
/// of one tuple.
///

pub trait Indexer<T, V> {
    fn kind(&self) -> IndexerKind;

    /// Index a tuple. Fails when the tuple is already present.
    fn put(&mut self, properties: &IndexProperties, tuple: T, value: V)
    -> Result<(), InternalError>;

    /// Remove a tuple and hand back its value. Fails when absent.
    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError>;

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError>;

    fn get_mut(&mut self, properties: &IndexProperties, tuple: &T)
    -> Result<&mut V, InternalError>;

    /// Call `visitor` once per non-empty terminal bucket matching the query.
    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError>;

    /// Call `visitor` once per matching entry, with mutable access to the value.
    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError>;

    /// Number of tuples indexed under this level.
    fn count_values(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.count_values() == 0
    }

    /// Number of tuples a `visit` with these properties would present.
    fn count_matches(&self, properties: &IndexProperties) -> Result<usize, InternalError> {
        let mut matches = 0;
        self.visit(properties, &mut |bucket| matches += bucket.len())?;

        Ok(matches)
    }
}

///
/// IndexerKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexerKind {
    None,
    Equals,
    Comparison,
    EqualsComparison,
    Range,
}

impl IndexerKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Equals => "equals",
            Self::Comparison => "comparison",
            Self::EqualsComparison => "equals_comparison",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for IndexerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Key bounds selecting every stored key `k` with `k joiner query`.
///
/// Comparisons map onto one-sided slices; any other joiner selects the
/// exact key. Never produces an inverted pair, so the result is always a
/// valid `BTreeMap::range` argument.
pub(crate) const fn slice_bounds<K>(joiner: JoinerType, query: &K) -> (Bound<&K>, Bound<&K>) {
    match joiner {
        JoinerType::LessThan => (Bound::Unbounded, Bound::Excluded(query)),
        JoinerType::LessThanOrEqual => (Bound::Unbounded, Bound::Included(query)),
        JoinerType::GreaterThan => (Bound::Excluded(query), Bound::Unbounded),
        JoinerType::GreaterThanOrEqual => (Bound::Included(query), Bound::Unbounded),
        _ => (Bound::Included(query), Bound::Included(query)),
    }
}

///
/// TESTS
///
