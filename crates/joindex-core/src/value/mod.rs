mod compare;
mod float;
mod tag;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};
use ulid::Ulid;

// re-exports
pub use compare::{canonical_cmp, strict_order_cmp};
pub use float::Float64;
pub use tag::ValueTag;

///
/// IndexValue
///
/// One comparable key value extracted from a tuple.
/// Every position of an index properties sequence holds the same variant
/// across all tuples fed into one indexer chain; mixed variants still order
/// deterministically by variant rank.
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum IndexValue {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float64(Float64),
    Text(String),
    Ulid(Ulid),
    Unit,
}

impl IndexValue {
    /// Construct a float value, rejecting non-finite input.
    #[must_use]
    pub fn float(v: f64) -> Option<Self> {
        Float64::try_new(v).map(Self::Float64)
    }

    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Ord for IndexValue {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl PartialOrd for IndexValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}u"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v:?}"),
            Self::Ulid(v) => write!(f, "{v}"),
            Self::Unit => write!(f, "()"),
        }
    }
}

macro_rules! impl_from_for_index_value {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for IndexValue {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_index_value! {
    bool => Bool,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    Float64 => Float64,
    String => Text,
    &str => Text,
    Ulid => Ulid,
}

impl From<()> for IndexValue {
    fn from((): ()) -> Self {
        Self::Unit
    }
}

impl<T: Into<Self>> From<Option<T>> for IndexValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
