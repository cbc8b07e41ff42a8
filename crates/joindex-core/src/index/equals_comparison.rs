use crate::{
    error::InternalError,
    index::{
        Bucket, IndexKey, IndexProperties, Indexer, IndexerKind, JoinerType,
        indexer::slice_bounds,
        none::{
            absent_bucket, absent_tuple, put_tuple, remove_tuple, visit_bucket, visit_bucket_mut,
        },
    },
    value::IndexValue,
};
use indexmap::IndexMap;
use std::{
    collections::{BTreeMap, HashMap},
    hash::Hash,
    ops::Range,
};

type OrderedBuckets<T, V> = BTreeMap<IndexValue, Bucket<T, V>>;

///
/// EqualsComparisonIndexer
///
/// Terminal level fusing an equality run with one trailing comparison:
/// equality key -> ordering key -> tuple map. Empty tuple maps and empty
/// ordered maps are dropped as soon as they empty.
///

#[derive(Debug)]
pub struct EqualsComparisonIndexer<T, V> {
    equal_columns: Range<usize>,
    column: usize,
    joiner: JoinerType,
    buckets: HashMap<IndexKey, OrderedBuckets<T, V>>,
    len: usize,
}

impl<T, V> EqualsComparisonIndexer<T, V> {
    #[must_use]
    pub fn new(equal_columns: Range<usize>, column: usize, joiner: JoinerType) -> Self {
        Self {
            equal_columns,
            column,
            joiner,
            buckets: HashMap::new(),
            len: 0,
        }
    }

    fn ordered(
        &self,
        properties: &IndexProperties,
    ) -> Result<Option<&OrderedBuckets<T, V>>, InternalError> {
        let key = properties.key(&self.equal_columns)?;

        Ok(self.buckets.get(&key))
    }
}

impl<T: Eq + Hash, V> EqualsComparisonIndexer<T, V> {
    /// Union every matching tuple map into one map, ascending by ordering key.
    pub fn get_matches(
        &self,
        properties: &IndexProperties,
    ) -> Result<IndexMap<&T, &V>, InternalError> {
        let query = properties.property(self.column)?;
        let mut matches = IndexMap::new();
        if let Some(ordered) = self.ordered(properties)? {
            for (_, bucket) in ordered.range(slice_bounds(self.joiner, query)) {
                matches.extend(bucket.iter());
            }
        }

        Ok(matches)
    }
}

impl<T: Eq + Hash, V> Indexer<T, V> for EqualsComparisonIndexer<T, V> {
    fn kind(&self) -> IndexerKind {
        IndexerKind::EqualsComparison
    }

    fn put(
        &mut self,
        properties: &IndexProperties,
        tuple: T,
        value: V,
    ) -> Result<(), InternalError> {
        let key = properties.key(&self.equal_columns)?;
        let ordering_key = properties.property(self.column)?;
        let bucket = self
            .buckets
            .entry(key)
            .or_default()
            .entry(ordering_key.clone())
            .or_default();
        put_tuple(bucket, IndexerKind::EqualsComparison, tuple, value)?;
        self.len += 1;

        Ok(())
    }

    fn remove(&mut self, properties: &IndexProperties, tuple: &T) -> Result<V, InternalError> {
        let key = properties.key(&self.equal_columns)?;
        let ordering_key = properties.property(self.column)?;

        let ordered = self.buckets.get_mut(&key).ok_or_else(absent_bucket)?;
        let bucket = ordered.get_mut(ordering_key).ok_or_else(absent_bucket)?;
        let value = remove_tuple(bucket, IndexerKind::EqualsComparison, tuple)?;
        if bucket.is_empty() {
            ordered.remove(ordering_key);
            if ordered.is_empty() {
                self.buckets.remove(&key);
            }
        }
        self.len -= 1;

        Ok(value)
    }

    fn get(&self, properties: &IndexProperties, tuple: &T) -> Result<&V, InternalError> {
        let ordering_key = properties.property(self.column)?;

        self.ordered(properties)?
            .and_then(|ordered| ordered.get(ordering_key))
            .ok_or_else(absent_bucket)?
            .get(tuple)
            .ok_or_else(absent_tuple)
    }

    fn get_mut(
        &mut self,
        properties: &IndexProperties,
        tuple: &T,
    ) -> Result<&mut V, InternalError> {
        let key = properties.key(&self.equal_columns)?;
        let ordering_key = properties.property(self.column)?;

        self.buckets
            .get_mut(&key)
            .and_then(|ordered| ordered.get_mut(ordering_key))
            .ok_or_else(absent_bucket)?
            .get_mut(tuple)
            .ok_or_else(absent_tuple)
    }

    fn visit(
        &self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&Bucket<T, V>),
    ) -> Result<(), InternalError> {
        let query = properties.property(self.column)?;
        let Some(ordered) = self.ordered(properties)? else {
            return Ok(());
        };
        for (_, bucket) in ordered.range(slice_bounds(self.joiner, query)) {
            visit_bucket(bucket, IndexerKind::EqualsComparison, visitor);
        }

        Ok(())
    }

    fn visit_mut(
        &mut self,
        properties: &IndexProperties,
        visitor: &mut dyn FnMut(&T, &mut V),
    ) -> Result<(), InternalError> {
        let key = properties.key(&self.equal_columns)?;
        let query = properties.property(self.column)?;
        let Some(ordered) = self.buckets.get_mut(&key) else {
            return Ok(());
        };
        for (_, bucket) in ordered.range_mut(slice_bounds(self.joiner, query)) {
            visit_bucket_mut(bucket, IndexerKind::EqualsComparison, visitor);
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

#[cfg(test)]
mod tests {
    use super::EqualsComparisonIndexer;
    use crate::{
        index::{IndexProperties, Indexer, JoinerType},
        value::IndexValue,
    };

    fn props(group: &str, at: i64) -> IndexProperties {
        [IndexValue::from(group), IndexValue::Int(at)]
            .into_iter()
            .collect()
    }

    fn indexer() -> EqualsComparisonIndexer<&'static str, i64> {
        let mut indexer = EqualsComparisonIndexer::new(0..1, 1, JoinerType::LessThanOrEqual);
        indexer.put(&props("a", 5), "a5", 5).unwrap();
        indexer.put(&props("a", 1), "a1", 1).unwrap();
        indexer.put(&props("a", 3), "a3", 3).unwrap();
        indexer.put(&props("b", 2), "b2", 2).unwrap();

        indexer
    }

    #[test]
    fn get_matches_unions_in_ascending_key_order() {
        let indexer = indexer();
        let matches = indexer.get_matches(&props("a", 4)).unwrap();

        let tuples: Vec<_> = matches.keys().map(|t| **t).collect();
        assert_eq!(tuples, vec!["a1", "a3"]);
        assert_eq!(indexer.count_matches(&props("b", 9)).unwrap(), 1);
        assert_eq!(indexer.count_matches(&props("c", 9)).unwrap(), 0);
    }

    #[test]
    fn remove_cleans_inner_then_outer_maps() {
        let mut indexer = indexer();
        assert_eq!(indexer.remove(&props("b", 2), &"b2").unwrap(), 2);
        assert_eq!(indexer.count_matches(&props("b", 9)).unwrap(), 0);

        let err = indexer.remove(&props("b", 2), &"b2").unwrap_err();
        assert!(err.is_contract_violation());
        assert_eq!(indexer.count_values(), 3);
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut indexer = indexer();
        *indexer.get_mut(&props("a", 3), &"a3").unwrap() = 30;

        assert_eq!(*indexer.get(&props("a", 3), &"a3").unwrap(), 30);
        assert!(indexer.get(&props("a", 4), &"a3").is_err());
    }
}
