//! Module: join::node
//! Responsibility: keep two indexer chains and the out tuples of a
//! two-input join consistent under insert, update and retract.
//! Does not own: downstream propagation (flushed through a callback).

use crate::{
    error::InternalError,
    index::{Bucket, IndexProperties, Indexer, IndexerFactory, IndexerNode},
    join::{
        JoinEvent,
        state::{OutTuples, TupleState},
    },
    obs::sink,
};
use std::{collections::HashMap, fmt, hash::Hash};

type Mapping<T> = Box<dyn Fn(&T) -> IndexProperties + Send + Sync>;

///
/// BiJoinNode
///
/// Joins left tuples against right tuples on the joiners of one factory.
/// Left tuples are indexed on the left bridge and remember their matched
/// right partners; right tuples are indexed on the right bridge.
///
/// Changes accumulate as out tuple state transitions and reach the caller
/// only on `flush`.
///

pub struct BiJoinNode<L, R> {
    left_mapping: Mapping<L>,
    right_mapping: Mapping<R>,
    left_store: HashMap<L, IndexProperties>,
    right_store: HashMap<R, IndexProperties>,
    left_index: IndexerNode<L, Bucket<R, ()>>,
    right_index: IndexerNode<R, ()>,
    out: OutTuples<L, R>,
}

impl<L, R> BiJoinNode<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    pub fn new(
        factory: &IndexerFactory,
        left_mapping: impl Fn(&L) -> IndexProperties + Send + Sync + 'static,
        right_mapping: impl Fn(&R) -> IndexProperties + Send + Sync + 'static,
    ) -> Self {
        Self {
            left_mapping: Box::new(left_mapping),
            right_mapping: Box::new(right_mapping),
            left_store: HashMap::new(),
            right_store: HashMap::new(),
            left_index: factory.build_indexer(true),
            right_index: factory.build_indexer(false),
            out: OutTuples::new(),
        }
    }

    #[must_use]
    pub fn left_len(&self) -> usize {
        self.left_store.len()
    }

    #[must_use]
    pub fn right_len(&self) -> usize {
        self.right_store.len()
    }

    /// Out tuples currently tracked, including ones pending retraction.
    #[must_use]
    pub fn out_len(&self) -> usize {
        self.out.len()
    }

    /// Out tuples waiting for the next flush.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.out.dirty_len()
    }

    #[must_use]
    pub fn state(&self, left: &L, right: &R) -> Option<TupleState> {
        self.out.state(left, right)
    }

    ///
    /// LEFT
    ///

    pub fn insert_left(&mut self, left: L) -> Result<(), InternalError> {
        if self.left_store.contains_key(&left) {
            return Err(duplicate("left"));
        }
        let properties = (self.left_mapping)(&left);
        self.index_left(left.clone(), &properties)?;
        self.left_store.insert(left, properties);

        Ok(())
    }

    /// Re-evaluate a left tuple. Unknown tuples are inserted.
    pub fn update_left(&mut self, left: L) -> Result<(), InternalError> {
        let Some(old) = self.left_store.get(&left).cloned() else {
            return self.insert_left(left);
        };
        let new = (self.left_mapping)(&left);

        if old == new {
            let partners = self.left_index.get(&old, &left)?;
            for right in partners.keys() {
                self.out.update(&left, right)?;
            }

            return Ok(());
        }

        let partners = self.left_index.remove(&old, &left)?;
        for right in partners.keys() {
            self.out.retract(&left, right)?;
        }
        if let Err(err) = self.index_left(left.clone(), &new) {
            self.left_store.remove(&left);
            return Err(err);
        }
        self.left_store.insert(left, new);

        Ok(())
    }

    /// Retract a left tuple. Unknown tuples are ignored.
    pub fn retract_left(&mut self, left: &L) -> Result<(), InternalError> {
        let Some(properties) = self.left_store.remove(left) else {
            return Ok(());
        };
        let partners = self.left_index.remove(&properties, left)?;
        for right in partners.keys() {
            self.out.retract(left, right)?;
        }

        Ok(())
    }

    // Nothing changes unless both the visit and the put succeed.
    fn index_left(&mut self, left: L, properties: &IndexProperties) -> Result<(), InternalError> {
        let mut partners = Bucket::new();
        self.right_index.visit(properties, &mut |bucket| {
            for right in bucket.keys() {
                partners.insert(right.clone(), ());
            }
        })?;
        self.left_index.put(properties, left.clone(), partners)?;

        for right in self.left_index.get(properties, &left)?.keys() {
            self.out.create(left.clone(), right.clone())?;
        }

        Ok(())
    }

    ///
    /// RIGHT
    ///

    pub fn insert_right(&mut self, right: R) -> Result<(), InternalError> {
        if self.right_store.contains_key(&right) {
            return Err(duplicate("right"));
        }
        let properties = (self.right_mapping)(&right);
        self.index_right(right.clone(), &properties)?;
        self.right_store.insert(right, properties);

        Ok(())
    }

    /// Re-evaluate a right tuple. Unknown tuples are inserted.
    pub fn update_right(&mut self, right: R) -> Result<(), InternalError> {
        let Some(old) = self.right_store.get(&right).cloned() else {
            return self.insert_right(right);
        };
        let new = (self.right_mapping)(&right);

        if old == new {
            let mut lefts = Vec::new();
            let mut orphaned = false;
            self.left_index.visit(&old, &mut |bucket| {
                for (left, partners) in bucket.iter() {
                    if partners.contains(&right) {
                        lefts.push(left.clone());
                    } else {
                        orphaned = true;
                    }
                }
            })?;
            if orphaned {
                return Err(orphan());
            }
            for left in &lefts {
                self.out.update(left, &right)?;
            }

            return Ok(());
        }

        self.deindex_right(&old, &right)?;
        if let Err(err) = self.index_right(right.clone(), &new) {
            self.right_store.remove(&right);
            return Err(err);
        }
        self.right_store.insert(right, new);

        Ok(())
    }

    /// Retract a right tuple. Unknown tuples are ignored.
    pub fn retract_right(&mut self, right: &R) -> Result<(), InternalError> {
        let Some(properties) = self.right_store.remove(right) else {
            return Ok(());
        };

        self.deindex_right(&properties, right)
    }

    fn index_right(&mut self, right: R, properties: &IndexProperties) -> Result<(), InternalError> {
        self.right_index.put(properties, right.clone(), ())?;

        let mut lefts = Vec::new();
        let visited = self.left_index.visit_mut(properties, &mut |left, partners| {
            partners.insert(right.clone(), ());
            lefts.push(left.clone());
        });
        if let Err(err) = visited {
            self.right_index.remove(properties, &right)?;
            return Err(err);
        }

        for left in lefts {
            self.out.create(left, right.clone())?;
        }

        Ok(())
    }

    fn deindex_right(
        &mut self,
        properties: &IndexProperties,
        right: &R,
    ) -> Result<(), InternalError> {
        self.right_index.remove(properties, right)?;

        let mut lefts = Vec::new();
        let mut orphaned = false;
        self.left_index.visit_mut(properties, &mut |left, partners| {
            if partners.remove(right).is_some() {
                lefts.push(left.clone());
            } else {
                orphaned = true;
            }
        })?;
        if orphaned {
            return Err(orphan());
        }

        for left in &lefts {
            self.out.retract(left, right)?;
        }

        Ok(())
    }

    ///
    /// PROPAGATION
    ///

    /// Emit one event per dirty out tuple and settle the queue.
    pub fn flush(
        &mut self,
        mut callback: impl FnMut(JoinEvent<'_, L, R>),
    ) -> Result<(), InternalError> {
        self.out.flush(&mut callback)
    }
}

impl<L, R> fmt::Debug for BiJoinNode<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiJoinNode")
            .field("left", &self.left_len())
            .field("right", &self.right_len())
            .field("out", &self.out_len())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

fn duplicate(side: &str) -> InternalError {
    sink::violation(InternalError::join_contract(format!(
        "the {side} tuple was already inserted"
    )))
}

fn orphan() -> InternalError {
    sink::violation(InternalError::join_contract(
        "a matched left tuple has no record of its right partner",
    ))
}
