use crate::value::IndexValue;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by ordering surfaces.
///
/// IMPORTANT:
/// Tag values define cross-variant key order and must remain fixed.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTag {
    Null = 1,
    Bool = 2,
    Int = 3,
    Uint = 4,
    Float64 = 5,
    Text = 6,
    Ulid = 7,
    Unit = 8,
}

impl ValueTag {
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool => "Bool",
            Self::Int => "Int",
            Self::Uint => "Uint",
            Self::Float64 => "Float64",
            Self::Text => "Text",
            Self::Ulid => "Ulid",
            Self::Unit => "Unit",
        }
    }
}

#[must_use]
pub(super) const fn canonical_tag(value: &IndexValue) -> ValueTag {
    match value {
        IndexValue::Null => ValueTag::Null,
        IndexValue::Bool(_) => ValueTag::Bool,
        IndexValue::Int(_) => ValueTag::Int,
        IndexValue::Uint(_) => ValueTag::Uint,
        IndexValue::Float64(_) => ValueTag::Float64,
        IndexValue::Text(_) => ValueTag::Text,
        IndexValue::Ulid(_) => ValueTag::Ulid,
        IndexValue::Unit => ValueTag::Unit,
    }
}

/// Stable rank used for cross-variant ordering.
#[must_use]
pub(super) const fn canonical_rank(value: &IndexValue) -> u8 {
    // Tags are 1-based; rank is 0-based.
    canonical_tag(value).to_u8() - 1
}
