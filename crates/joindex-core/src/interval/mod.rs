mod cluster;
mod split_point;
mod tree;

#[cfg(test)]
mod tests;

use crate::{error::InternalError, obs::sink};
use std::fmt;

// re-exports
pub use cluster::{IntervalBreak, IntervalCluster};
pub use tree::IntervalTree;

///
/// Interval
///
/// A value placed on a comparable axis over the closed range `[start, end]`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Interval<I, P> {
    value: I,
    start: P,
    end: P,
}

impl<I, P: Ord> Interval<I, P> {
    pub fn new(value: I, start: P, end: P) -> Result<Self, InternalError> {
        if start > end {
            return Err(sink::violation(InternalError::interval_contract(
                "interval start lies after its end",
            )));
        }

        Ok(Self { value, start, end })
    }

    #[must_use]
    pub const fn value(&self) -> &I {
        &self.value
    }

    #[must_use]
    pub const fn start(&self) -> &P {
        &self.start
    }

    #[must_use]
    pub const fn end(&self) -> &P {
        &self.end
    }
}

impl<I: fmt::Display, P: fmt::Display> fmt::Display for Interval<I, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {}]", self.value, self.start, self.end)
    }
}

///
/// BreakRepairCase
///
/// Shape of the break repair after an insertion merged clusters, by which
/// of the touched breaks ended up inside the merged cluster.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BreakRepairCase {
    /// Every touched break is inside; all are deleted.
    AllSpanned,
    /// The first is inside, the last bounds the cluster; the last is relinked.
    FirstSpanned,
    /// The last is inside, the first bounds the cluster; the first is relinked.
    LastSpanned,
    /// Both ends bound the cluster; both are relinked, interior ones deleted.
    NoneSpanned,
}
