use crate::{
    error::InternalError,
    index::{
        Bucket, IndexProperties, Indexer, IndexerKind, IndexerNode, IndexerPlan, RangeSpec,
        indexer::slice_bounds, none::absent_bucket,
    },
    obs::sink,
    value::IndexValue,
};
use std::{collections::BTreeMap, hash::Hash};

type UpperBuckets<T, V> = BTreeMap<IndexValue, IndexerNode<T, V>>;

///
/// RangeIndexer
///
/// Stores one range per tuple: the lower-bound column supplies the stored
/// lower key, the upper-bound column the stored upper key. A query matches
/// when `query_lower lower_joiner stored_lower` and
/// `query_upper upper_joiner stored_upper` both hold.
///
/// Queries are points: both query columns must hold the same value, and
/// `visit`/`visit_mut` reject anything else as a contract violation.
///
/// Under a strict joiner a range whose keys are equal can never hold a
/// point; such tuples live in a side bucket that is removable but never
/// visited.
///

#[derive(Debug)]
pub struct RangeIndexer<T, V> {
    spec: RangeSpec,
    downstream: IndexerPlan,
    buckets: BTreeMap<IndexValue, UpperBuckets<T, V>>,
    invalid: Option<Box<IndexerNode<T, V>>>,
    len: usize,
}

impl<T, V> RangeIndexer<T, V> {
    #[must_use]
    pub const fn new(spec: RangeSpec, downstream: IndexerPlan) -> Self {
        Self {
            spec,
            downstream,
            buckets: BTreeMap::new(),
            invalid: None,
            len: 0,
        }
    }

    #[must_use]
    pub const fn spec(&self) -> &RangeSpec {
        &self.spec
    }

    /// Tuples held in the never-visited side bucket.
    #[must_use]
    pub fn invalid_count(&self) -> usize
    where
        T: Eq + Hash,
    {
        self.invalid.as_ref().map_or(0, |node| node.count_values())
    }

    fn bounds<'p>(
        &self,
        properties: &'p IndexProperties,
    ) -> Result<(&'p IndexValue, &'p IndexValue), InternalError> {
        Ok((
            properties.property(self.spec.lower.column)?,
            properties.property(self.spec.upper.column)?,
        ))
    }

    fn point_query<'p>(
        &self,
        properties: &'p IndexProperties,
    ) -> Result<(&'p IndexValue, &'p IndexValue), InternalError> {
        let (lower, upper) = self.bounds(properties)?;
        if lower != upper {
            return Err(sink::violation(InternalError::indexer_contract(
                "range indexer queried with unequal bounds",
            )));
        }

        Ok((lower, upper))
    }

    fn is_degenerate(&self, lower: &IndexValue, upper: &IndexValue) -> bool {
        !self.spec.admits_point() && lower == upper
    }

    fn slot(&self, lower: &IndexValue, upper: &IndexValue) -> Option<&IndexerNode<T, V>> {
        if self.is_degenerate(lower, upper) {
            self.invalid.as_deref()
        } else {
            self.buckets.get(lower).and_then(|inner| inner.get(upper))
        }
    }

    fn slot_mut(
        &mut self,
        lower: &IndexValue,
        upper: &IndexValue,
    ) -> Option<&mut IndexerNode<T, V>> {
        if self.is_degenerate(lower, upper) {
            self.invalid.as_deref_mut()
        } else {
            self.buckets
                .get_mut(lower)
                .and_then(|inner| inner.get_mut(upper))
        }
    }
}

impl<T: Eq + Hash, V> RangeIndexer<T, V> {
    // Drop the slot for (lower, upper) and any map it leaves empty.
    fn prune(&mut self, lower: &IndexValue, upper: &IndexValue) {
        if self.is_degenerate(lower, upper) {
            if self.invalid.as_ref().is_some_and(|node| node.is_empty()) {
                self.invalid = None;
            }
            return;
        }
        if let Some(inner) = self.buckets.get_mut(lower) {
            if inner.get(upper).is_some_and(|node| node.is_empty()) {
                inner.remove(upper);
            }
            if inner.is_empty() {
                self.buckets.remove(lower);
            }
        }
    }
}

impl<T: Eq + Hash, V> Indexer<T, V> for RangeIndexer<T, V> {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Range
    }

    fn put(
        &mut self,
        properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        let (lower, upper) = self.bounds(properties)?;
        let downstream = &self.downstream;
        let slot: &mut IndexerNode<T, V> = if self.is_degenerate(lower, upper) {
            self.invalid
                .get_or_insert_with(|| Box::new(IndexerNode::build(downstream)))
        } else {
            self.buckets
                .entry(lower.clone())
                .or_default()
                .entry(upper.clone())
                .or_insert_with(|| IndexerNode::build(downstream))
        };
        if let Err(err) = slot.put(properties, tuple, value) {
            self.prune(lower, upper);
            return Err(err);
        }
        self.len += 1;

        Ok(())
    }

    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        let (lower, upper) = self.bounds(properties)?;
        let value = self
            .slot_mut(lower, upper)
            .ok_or_else(absent_bucket)?
            .remove(properties, tuple)?;
        self.prune(lower, upper);
        self.len -= 1;

        Ok(value)
    }

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        let (lower, upper) = self.bounds(properties)?;

        self.slot(lower, upper)
            .ok_or_else(absent_bucket)?
            .get(properties, tuple)
    }

    fn get_mut(
        &mut self,
        properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        let (lower, upper) = self.bounds(properties)?;

        self.slot_mut(lower, upper)
            .ok_or_else(absent_bucket)?
            .get_mut(properties, tuple)
    }

    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        let (query_lower, query_upper) = self.point_query(properties)?;
        let lower_slice = slice_bounds(self.spec.lower.joiner.flip(), query_lower);
        let upper_slice = slice_bounds(self.spec.upper.joiner.flip(), query_upper);

        for (_, inner) in self.buckets.range(lower_slice) {
            for (_, bucket) in inner.range(upper_slice) {
                bucket.visit(properties, visitor)?;
            }
        }

        Ok(())
    }

    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        let (query_lower, query_upper) = self.point_query(properties)?;
        let lower_slice = slice_bounds(self.spec.lower.joiner.flip(), query_lower);
        let upper_slice = slice_bounds(self.spec.upper.joiner.flip(), query_upper);

        for (_, inner) in self.buckets.range_mut(lower_slice) {
            for (_, bucket) in inner.range_mut(upper_slice) {
                bucket.visit_mut(properties, visitor)?;
            }
        }

        Ok(())
    }

    fn count_values(&self) -> usize {
        self.len
    }
}

///
/// TESTS
///
