//! Module: index::bucket
//! Responsibility: the insertion-ordered tuple -> value map at the end of
//! every indexer chain.
//! Does not own: key decomposition or metrics; callers record those.

use indexmap::{Equivalent, IndexMap, map::MutableKeys};
use std::hash::{Hash, Hasher};

///
/// Bucket
///
/// Removal retires the slot in place instead of shifting its successors,
/// and retired slots are swept out once they outnumber live ones. Put,
/// remove and lookup are amortized O(1); iteration skips retired slots and
/// stays in insertion order.
///

#[derive(Debug)]
pub struct Bucket<T, V> {
    slots: IndexMap<Slot<T>, Option<V>>,
    live: usize,
    next_retired: u64,
}

impl<T, V> Bucket<T, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: IndexMap::new(),
            live: 0,
            next_retired: 1,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Live and retired slots currently held.
    #[must_use]
    pub fn capacity_in_use(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, &V)> {
        self.slots
            .iter()
            .filter_map(|(slot, value)| Some((&slot.tuple, value.as_ref()?)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &T> {
        self.iter().map(|(tuple, _)| tuple)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&T, &mut V)> {
        self.slots
            .iter_mut()
            .filter_map(|(slot, value)| Some((&slot.tuple, value.as_mut()?)))
    }
}

impl<T: Eq + Hash, V> Bucket<T, V> {
    #[must_use]
    pub fn contains(&self, tuple: &T) -> bool {
        self.get(tuple).is_some()
    }

    #[must_use]
    pub fn get(&self, tuple: &T) -> Option<&V> {
        self.slots.get(&Live(tuple)).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, tuple: &T) -> Option<&mut V> {
        self.slots.get_mut(&Live(tuple)).and_then(Option::as_mut)
    }

    /// Append a tuple. Returns `false` and drops the arguments when the
    /// tuple is already live.
    pub fn insert(&mut self, tuple: T, value: V) -> bool {
        if self.contains(&tuple) {
            return false;
        }
        self.slots.insert(Slot { tuple, retired: 0 }, Some(value));
        self.live += 1;

        true
    }

    pub fn remove(&mut self, tuple: &T) -> Option<V> {
        let (_, slot, value) = self.slots.get_full_mut2(&Live(tuple))?;
        let value = value.take()?;
        // retired slots never compare equal to anything else
        slot.retired = self.next_retired;
        self.next_retired += 1;
        self.live -= 1;

        if self.slots.len() > 2 * self.live {
            self.compact();
        }

        Some(value)
    }

    fn compact(&mut self) {
        self.slots.retain(|_, value| value.is_some());
        self.next_retired = 1;
    }
}

impl<T, V> Default for Bucket<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

///
/// Slot
///
/// Hashes by tuple alone so a retired slot and a live one for the same
/// tuple land in the same hash chain; `retired == 0` marks a live slot.
///

#[derive(Debug)]
struct Slot<T> {
    tuple: T,
    retired: u64,
}

impl<T: Hash> Hash for Slot<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tuple.hash(state);
    }
}

impl<T: Eq> PartialEq for Slot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.retired == other.retired && self.tuple == other.tuple
    }
}

impl<T: Eq> Eq for Slot<T> {}

// Lookup key matching only the live slot of a tuple.
struct Live<'a, T>(&'a T);

impl<T: Hash> Hash for Live<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<T: Eq> Equivalent<Slot<T>> for Live<'_, T> {
    fn equivalent(&self, slot: &Slot<T>) -> bool {
        slot.retired == 0 && slot.tuple == *self.0
    }
}

///
/// TESTS
///
