use serde::{Deserialize, Serialize};
use std::fmt;

///
/// JoinerType
///
/// Relation between a left and a right key column, read left-to-right:
/// `LessThan` means `left < right`.
/// Only the first five kinds can be answered by an indexer chain.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum JoinerType {
    Equal = 0x01,
    LessThan = 0x02,
    LessThanOrEqual = 0x03,
    GreaterThan = 0x04,
    GreaterThanOrEqual = 0x05,
    Containing = 0x06,
    Intersecting = 0x07,
    Disjoint = 0x08,
}

impl JoinerType {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Swap the sides of the relation: `a < b` becomes `b > a`.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::LessThanOrEqual => Self::GreaterThanOrEqual,
            Self::GreaterThan => Self::LessThan,
            Self::GreaterThanOrEqual => Self::LessThanOrEqual,
            other => other,
        }
    }

    #[must_use]
    pub const fn is_indexable(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    #[must_use]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }

    #[must_use]
    pub const fn is_lower_bound(self) -> bool {
        matches!(self, Self::GreaterThan | Self::GreaterThanOrEqual)
    }

    #[must_use]
    pub const fn is_upper_bound(self) -> bool {
        matches!(self, Self::LessThan | Self::LessThanOrEqual)
    }

    #[must_use]
    pub const fn is_inclusive(self) -> bool {
        matches!(
            self,
            Self::Equal | Self::LessThanOrEqual | Self::GreaterThanOrEqual
        )
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equal => "EQUAL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Self::Containing => "CONTAINING",
            Self::Intersecting => "INTERSECTING",
            Self::Disjoint => "DISJOINT",
        }
    }
}

impl fmt::Display for JoinerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// TESTS
///
