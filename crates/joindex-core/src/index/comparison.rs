use crate::{
    error::InternalError,
    index::{
        Bucket, IndexProperties, Indexer, IndexerKind, IndexerNode, IndexerPlan, JoinerType,
        indexer::slice_bounds, none::absent_bucket,
    },
    value::IndexValue,
};
use std::{collections::BTreeMap, hash::Hash};

///
/// ComparisonIndexer
///
/// Ordered buckets keyed by one column. A query selects every bucket whose
/// stored key satisfies `stored joiner query` and delegates to each in
/// ascending key order.
///

#[derive(Debug)]
pub struct ComparisonIndexer<T, V> {
    column: usize,
    joiner: JoinerType,
    downstream: IndexerPlan,
    buckets: BTreeMap<IndexValue, IndexerNode<T, V>>,
    len: usize,
}

impl<T, V> ComparisonIndexer<T, V> {
    #[must_use]
    pub const fn new(column: usize, joiner: JoinerType, downstream: IndexerPlan) -> Self {
        Self {
            column,
            joiner,
            downstream,
            buckets: BTreeMap::new(),
            len: 0,
        }
    }

    #[must_use]
    pub const fn joiner(&self) -> JoinerType {
        self.joiner
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<T: Eq + Hash, V> Indexer<T, V> for ComparisonIndexer<T, V> {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Comparison
    }

    fn put(
        &mut self,
        properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        let key = properties.property(self.column)?;
        let downstream = &self.downstream;
        let bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| IndexerNode::build(downstream));
        if let Err(err) = bucket.put(properties, tuple, value) {
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
            return Err(err);
        }
        self.len += 1;

        Ok(())
    }

    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        let key = properties.property(self.column)?;
        let bucket = self.buckets.get_mut(key).ok_or_else(absent_bucket)?;
        let value = bucket.remove(properties, tuple)?;
        if bucket.is_empty() {
            self.buckets.remove(key);
        }
        self.len -= 1;

        Ok(value)
    }

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        let key = properties.property(self.column)?;

        self.buckets
            .get(key)
            .ok_or_else(absent_bucket)?
            .get(properties, tuple)
    }

    fn get_mut(
        &mut self,
        properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        let key = properties.property(self.column)?;

        self.buckets
            .get_mut(key)
            .ok_or_else(absent_bucket)?
            .get_mut(properties, tuple)
    }

    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        let query = properties.property(self.column)?;
        for (_, bucket) in self.buckets.range(slice_bounds(self.joiner, query)) {
            bucket.visit(properties, visitor)?;
        }

        Ok(())
    }

    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        let query = properties.property(self.column)?;
        for (_, bucket) in self.buckets.range_mut(slice_bounds(self.joiner, query)) {
            bucket.visit_mut(properties, visitor)?;
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
