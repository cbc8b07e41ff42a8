use indexmap::IndexMap;
use std::hash::Hash;

///
/// SplitPoint
///
/// Every interval that starts or ends at one coordinate. A split point
/// exists only while at least one stored interval references it.
///

#[derive(Clone, Debug)]
pub(super) struct SplitPoint<I, P> {
    pub(super) starting: IndexMap<I, Starting<P>>,
    pub(super) ending: IndexMap<I, usize>,
}

///
/// Starting
///
/// Far end and multiplicity of an interval starting at a split point.
///

#[derive(Clone, Debug)]
pub(super) struct Starting<P> {
    pub(super) end: P,
    pub(super) count: usize,
}

impl<I: Eq + Hash, P: Ord> SplitPoint<I, P> {
    pub(super) fn new() -> Self {
        Self {
            starting: IndexMap::new(),
            ending: IndexMap::new(),
        }
    }

    pub(super) fn is_empty(&self) -> bool {
        self.starting.is_empty() && self.ending.is_empty()
    }

    /// Total registrations starting here, with multiplicity.
    pub(super) fn start_count(&self) -> usize {
        self.starting.values().map(|s| s.count).sum()
    }

    /// Registrations both starting and ending at `at`.
    pub(super) fn zero_length_count(&self, at: &P) -> usize {
        self.starting
            .values()
            .filter(|s| &s.end == at)
            .map(|s| s.count)
            .sum()
    }

    pub(super) fn end_count(&self) -> usize {
        self.ending.values().sum()
    }

    /// Furthest end among intervals starting here.
    pub(super) fn reach(&self) -> Option<&P> {
        self.starting.values().map(|s| &s.end).max()
    }
}
