use crate::{
    error::InternalError,
    index::{
        Bucket, IndexKey, IndexProperties, Indexer, IndexerKind, IndexerNode, IndexerPlan,
        none::absent_bucket,
    },
};
use std::{collections::HashMap, hash::Hash, ops::Range};

///
/// EqualsIndexer
///
/// Buckets tuples by exact equality of the key over a contiguous column
/// range, delegating each bucket to a downstream node.
///

#[derive(Debug)]
pub struct EqualsIndexer<T, V> {
    columns: Range<usize>,
    downstream: IndexerPlan,
    buckets: HashMap<IndexKey, IndexerNode<T, V>>,
    len: usize,
}

impl<T, V> EqualsIndexer<T, V> {
    #[must_use]
    pub fn new(columns: Range<usize>, downstream: IndexerPlan) -> Self {
        Self {
            columns,
            downstream,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    #[must_use]
    pub const fn columns(&self) -> &Range<usize> {
        &self.columns
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

impl<T: Eq + Hash, V> Indexer<T, V> for EqualsIndexer<T, V> {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Equals
    }

    fn put(
        &mut self,
        properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        let key = properties.key(&self.columns)?;
        let downstream = &self.downstream;
        let bucket = self
            .buckets
            .entry(key.clone())
            .or_insert_with(|| IndexerNode::build(downstream));
        if let Err(err) = bucket.put(properties, tuple, value) {
            if bucket.is_empty() {
                self.buckets.remove(&key);
            }
            return Err(err);
        }
        self.len += 1;

        Ok(())
    }

    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        let key = properties.key(&self.columns)?;
        let bucket = self.buckets.get_mut(&key).ok_or_else(absent_bucket)?;
        let value = bucket.remove(properties, tuple)?;
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        self.len -= 1;

        Ok(value)
    }

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        let key = properties.key(&self.columns)?;

        self.buckets
            .get(&key)
            .ok_or_else(absent_bucket)?
            .get(properties, tuple)
    }

    fn get_mut(
        &mut self,
        properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        let key = properties.key(&self.columns)?;

        self.buckets
            .get_mut(&key)
            .ok_or_else(absent_bucket)?
            .get_mut(properties, tuple)
    }

    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        let key = properties.key(&self.columns)?;

        match self.buckets.get(&key) {
            Some(bucket) => bucket.visit(properties, visitor),
            None => Ok(()),
        }
    }

    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        let key = properties.key(&self.columns)?;

        match self.buckets.get_mut(&key) {
            Some(bucket) => bucket.visit_mut(properties, visitor),
            None => Ok(()),
        }
    }

    fn count_values(&self) -> usize {
        self.len
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::EqualsIndexer;
    use crate::{
        index::{IndexProperties, Indexer, IndexerPlan},
        value::IndexValue,
    };

    fn props(a: i64, b: &str) -> IndexProperties {
        [IndexValue::Int(a), IndexValue::from(b)].into_iter().collect()
    }

    #[test]
    fn composite_key_matches_exactly() {
        let mut indexer = EqualsIndexer::new(0..2, IndexerPlan::new(Vec::new()));
        indexer.put(&props(1, "a"), "t1", ()).unwrap();
        indexer.put(&props(1, "b"), "t2", ()).unwrap();
        indexer.put(&props(2, "a"), "t3", ()).unwrap();

        let mut seen = Vec::new();
        indexer
            .visit(&props(1, "a"), &mut |bucket| seen.extend(bucket.keys().copied()))
            .unwrap();

        assert_eq!(seen, vec!["t1"]);
        assert_eq!(indexer.count_matches(&props(3, "a")).unwrap(), 0);
    }

    #[test]
    fn emptied_bucket_is_dropped() {
        let mut indexer = EqualsIndexer::new(0..1, IndexerPlan::new(Vec::new()));
        let key = IndexProperties::single(7);
        indexer.put(&key, 1_u32, "one").unwrap();
        indexer.put(&key, 2, "two").unwrap();

        assert_eq!(indexer.remove(&key, &1).unwrap(), "one");
        assert_eq!(indexer.bucket_count(), 1);
        assert_eq!(indexer.remove(&key, &2).unwrap(), "two");
        assert_eq!(indexer.bucket_count(), 0);
        assert!(indexer.is_empty());
    }

    #[test]
    fn removing_from_a_missing_bucket_is_a_contract_violation() {
        let mut indexer = EqualsIndexer::<u32, ()>::new(0..1, IndexerPlan::new(Vec::new()));

        let err = indexer.remove(&IndexProperties::single(1), &1).unwrap_err();
        assert!(err.is_contract_violation());
    }
}
