//! Module: index::properties
//! Responsibility: positional key extraction shared by every indexer level.
//! Does not own: which columns a level reads (decided by the factory plan).

use crate::{error::InternalError, obs::sink, value::IndexValue};
use std::{fmt, ops::Range};

///
/// IndexProperties
///
/// Immutable, positionally addressed key sequence produced from a tuple at
/// insert/remove/query time. Zero, one and many keys have dedicated variants
/// so the common single-key join never allocates a slice.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub enum IndexProperties {
    #[default]
    None,
    Single(IndexValue),
    Many(Box<[IndexValue]>),
}

impl IndexProperties {
    /// Build properties from an ordered value list, picking the smallest variant.
    #[must_use]
    pub fn new(values: Vec<IndexValue>) -> Self {
        match values.len() {
            0 => Self::None,
            1 => values
                .into_iter()
                .next()
                .map_or(Self::None, Self::Single),
            _ => Self::Many(values.into_boxed_slice()),
        }
    }

    #[must_use]
    pub fn single(value: impl Into<IndexValue>) -> Self {
        Self::Single(value.into())
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Single(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn as_slice(&self) -> &[IndexValue] {
        match self {
            Self::None => &[],
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }

    /// Borrow the key at one column.
    pub fn property(&self, index: usize) -> Result<&IndexValue, InternalError> {
        self.as_slice().get(index).ok_or_else(|| {
            sink::violation(InternalError::properties_contract(format!(
                "index property {index} requested but only {} present",
                self.len()
            )))
        })
    }

    /// Build the equality key for a contiguous column range.
    ///
    /// One column yields its value directly; wider ranges yield a composite
    /// compared positionally.
    pub fn key(&self, columns: &Range<usize>) -> Result<IndexKey, InternalError> {
        let values = self.as_slice().get(columns.clone()).ok_or_else(|| {
            sink::violation(InternalError::properties_contract(format!(
                "index properties {}..{} requested but only {} present",
                columns.start,
                columns.end,
                self.len()
            )))
        })?;

        Ok(match values {
            [single] => IndexKey::Single(single.clone()),
            many => IndexKey::Composite(many.into()),
        })
    }
}

impl<V: Into<IndexValue>> FromIterator<V> for IndexProperties {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for IndexProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.as_slice().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

///
/// IndexKey
///
/// Equality bucket key: one value, or a structural composite over a
/// contiguous column range compared by deep positional equality.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexKey {
    Single(IndexValue),
    Composite(Box<[IndexValue]>),
}

///
/// TESTS
///
