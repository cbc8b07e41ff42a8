use crate::value::{IndexValue, tag};
use std::cmp::Ordering;

/// Total canonical comparator used by every ordered index level.
///
/// Ordering rules:
/// 1. Canonical variant rank
/// 2. Variant-specific comparison for same-ranked values
///
/// Mixed-variant comparisons are rank-only and must remain deterministic.
#[must_use]
pub fn canonical_cmp(left: &IndexValue, right: &IndexValue) -> Ordering {
    let rank = tag::canonical_rank(left).cmp(&tag::canonical_rank(right));
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Strict comparator for identical orderable variants.
///
/// Returns `None` for mismatched variants.
#[must_use]
pub fn strict_order_cmp(left: &IndexValue, right: &IndexValue) -> Option<Ordering> {
    match (left, right) {
        (IndexValue::Bool(a), IndexValue::Bool(b)) => Some(a.cmp(b)),
        (IndexValue::Int(a), IndexValue::Int(b)) => Some(a.cmp(b)),
        (IndexValue::Uint(a), IndexValue::Uint(b)) => Some(a.cmp(b)),
        (IndexValue::Float64(a), IndexValue::Float64(b)) => Some(a.cmp(b)),
        (IndexValue::Text(a), IndexValue::Text(b)) => Some(a.cmp(b)),
        (IndexValue::Ulid(a), IndexValue::Ulid(b)) => Some(a.cmp(b)),
        (IndexValue::Null, IndexValue::Null) | (IndexValue::Unit, IndexValue::Unit) => {
            Some(Ordering::Equal)
        }
        _ => None,
    }
}

fn canonical_cmp_same_rank(left: &IndexValue, right: &IndexValue) -> Ordering {
    // Same rank implies same variant, so the strict comparator always answers.
    strict_order_cmp(left, right).unwrap_or(Ordering::Equal)
}
