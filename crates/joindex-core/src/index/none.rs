use crate::{
    error::InternalError,
    index::{Bucket, IndexProperties, Indexer, IndexerKind},
    obs::sink::{self, MetricsEvent},
};
use std::hash::Hash;

///
/// NoneIndexer
///
/// Terminal level: insertion-ordered tuple -> value map.
/// Ignores the properties entirely.
///

#[derive(Debug)]
pub struct NoneIndexer<T, V> {
    tuples: Bucket<T, V>,
}

impl<T, V> NoneIndexer<T, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            tuples: Bucket::new(),
        }
    }

    #[must_use]
    pub const fn tuples(&self) -> &Bucket<T, V> {
        &self.tuples
    }
}

impl<T, V> Default for NoneIndexer<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Eq + Hash, V> Indexer<T, V> for NoneIndexer<T, V> {
    fn kind(&self) -> IndexerKind {
        IndexerKind::None
    }

    fn put(
        &mut self,
        _properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        put_tuple(&mut self.tuples, IndexerKind::None, tuple, value)
    }

    fn remove(&mut self, _properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        remove_tuple(&mut self.tuples, IndexerKind::None, tuple)
    }

    fn get(&self, _properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        self.tuples.get(tuple).ok_or_else(absent_tuple)
    }

    fn get_mut(
        &mut self,
        _properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        self.tuples.get_mut(tuple).ok_or_else(absent_tuple)
    }

    fn visit(
        &self,
        _properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        visit_bucket(&self.tuples, IndexerKind::None, visitor);

        Ok(())
    }

    fn visit_mut(
        &mut self,
        _properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        visit_bucket_mut(&mut self.tuples, IndexerKind::None, visitor);

        Ok(())
    }

    fn count_values(&self) -> usize {
        self.tuples.len()
    }
}

// Terminal bucket helpers shared with the combined equality+ordering level.

pub(super) fn put_tuple<T: Eq + Hash, V>(
    bucket: &mut Bucket<T, V>,
    kind: IndexerKind,
    tuple: T,
    value: V,
) -> Result<(), InternalError> {
    if !bucket.insert(tuple, value) {
        return Err(sink::violation(InternalError::indexer_contract(
            "tuple is already indexed",
        )));
    }
    sink::record(MetricsEvent::TuplePut { kind });

    Ok(())
}

pub(super) fn remove_tuple<T: Eq + Hash, V>(
    bucket: &mut Bucket<T, V>,
    kind: IndexerKind,
    tuple: &T,
) -> Result<V, InternalError> {
    let value = bucket.remove(tuple).ok_or_else(absent_tuple)?;
    sink::record(MetricsEvent::TupleRemove { kind });

    Ok(value)
}

pub(super) fn visit_bucket<T, V>(
    bucket: &Bucket<T, V>,
    kind: IndexerKind,
    visitor: &mut dyn FnMut(&Bucket<T, V>),
) {
    if bucket.is_empty() {
        return;
    }
    sink::record(MetricsEvent::BucketVisit {
        kind,
        tuples: bucket.len() as u64,
    });
    visitor(bucket);
}

pub(super) fn visit_bucket_mut<T, V>(
    bucket: &mut Bucket<T, V>,
    kind: IndexerKind,
    visitor: &mut dyn FnMut(&T, &mut V),
) {
    if bucket.is_empty() {
        return;
    }
    sink::record(MetricsEvent::BucketVisit {
        kind,
        tuples: bucket.len() as u64,
    });
    for (tuple, value) in bucket.iter_mut() {
        visitor(tuple, value);
    }
}

pub(super) fn absent_tuple() -> InternalError {
    sink::violation(InternalError::indexer_contract("tuple is not indexed"))
}

pub(super) fn absent_bucket() -> InternalError {
    sink::violation(InternalError::indexer_contract(
        "no bucket holds the tuple's index properties",
    ))
}

///
/// TESTS
///
