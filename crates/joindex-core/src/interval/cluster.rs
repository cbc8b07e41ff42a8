use crate::interval::IntervalTree;
use std::{fmt, hash::Hash, iter};

///
/// ClusterSpan
///
/// Derived state of one cluster, keyed in the tree by its start coordinate.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct ClusterSpan<P> {
    pub(super) end: P,
    pub(super) count: usize,
    pub(super) has_overlap: bool,
}

///
/// BreakLink
///
/// Gap to the next cluster, keyed in the tree by the previous cluster's start.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) struct BreakLink<P, D> {
    pub(super) next_start: P,
    pub(super) length: D,
}

///
/// IntervalCluster
///
/// Read-only view of a maximal run of overlapping or touching intervals.
///

pub struct IntervalCluster<'a, I, P, D> {
    pub(super) tree: &'a IntervalTree<I, P, D>,
    pub(super) start: &'a P,
    pub(super) span: &'a ClusterSpan<P>,
}

impl<'a, I, P, D> IntervalCluster<'a, I, P, D>
where
    I: Eq + Hash + Clone,
    P: Ord + Clone,
{
    #[must_use]
    pub const fn start(&self) -> &'a P {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> &'a P {
        &self.span.end
    }

    /// Registrations in the cluster, with multiplicity.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.span.count
    }

    /// Whether any two member intervals share more than an endpoint.
    #[must_use]
    pub const fn has_overlap(&self) -> bool {
        self.span.has_overlap
    }

    #[must_use]
    pub fn length(&self) -> D {
        (self.tree.difference)(self.start, &self.span.end)
    }

    /// Member values in start order, repeated by multiplicity.
    pub fn iter(&self) -> impl Iterator<Item = &'a I> + use<'a, I, P, D> {
        self.tree
            .split_points
            .range(self.start..=&self.span.end)
            .flat_map(|(_, point)| point.starting.iter())
            .flat_map(|(value, starting)| iter::repeat_n(value, starting.count))
    }
}

impl<I, P: fmt::Debug, D> fmt::Debug for IntervalCluster<'_, I, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalCluster")
            .field("start", self.start)
            .field("end", &self.span.end)
            .field("count", &self.span.count)
            .field("has_overlap", &self.span.has_overlap)
            .finish()
    }
}

///
/// IntervalBreak
///
/// Read-only view of the gap between two adjacent clusters.
///

pub struct IntervalBreak<'a, I, P, D> {
    pub(super) previous: IntervalCluster<'a, I, P, D>,
    pub(super) next: IntervalCluster<'a, I, P, D>,
    pub(super) length: &'a D,
}

impl<'a, I, P, D> IntervalBreak<'a, I, P, D> {
    #[must_use]
    pub const fn previous_cluster(&self) -> &IntervalCluster<'a, I, P, D> {
        &self.previous
    }

    #[must_use]
    pub const fn next_cluster(&self) -> &IntervalCluster<'a, I, P, D> {
        &self.next
    }

    /// Axis distance from the previous cluster's end to the next one's start.
    #[must_use]
    pub const fn length(&self) -> &'a D {
        self.length
    }
}

impl<I, P: fmt::Debug, D: fmt::Debug> fmt::Debug for IntervalBreak<'_, I, P, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalBreak")
            .field("previous", &self.previous)
            .field("next", &self.next)
            .field("length", self.length)
            .finish()
    }
}
