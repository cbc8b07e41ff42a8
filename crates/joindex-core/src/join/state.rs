use crate::{
    error::InternalError,
    join::JoinEvent,
    obs::sink::{self, MetricsEvent},
};
use std::{
    collections::{HashMap, VecDeque, hash_map::Entry},
    fmt,
    hash::Hash,
};

///
/// TupleState
///
/// Lifecycle of one out tuple between flushes. `Ok` tuples are settled;
/// every other state is queued exactly once until the next flush.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TupleState {
    Creating,
    Ok,
    Updating,
    Dying,
    Aborting,
}

impl fmt::Display for TupleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Creating => "CREATING",
            Self::Ok => "OK",
            Self::Updating => "UPDATING",
            Self::Dying => "DYING",
            Self::Aborting => "ABORTING",
        };
        f.write_str(label)
    }
}

///
/// OutTuples
///
/// Out tuple states keyed by their (left, right) pair, plus the dirty
/// queue of pairs awaiting propagation.
///

pub(super) struct OutTuples<L, R> {
    states: HashMap<(L, R), TupleState>,
    dirty: VecDeque<(L, R)>,
}

impl<L, R> OutTuples<L, R>
where
    L: Eq + Hash + Clone,
    R: Eq + Hash + Clone,
{
    pub(super) fn new() -> Self {
        Self {
            states: HashMap::new(),
            dirty: VecDeque::new(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.states.len()
    }

    pub(super) fn dirty_len(&self) -> usize {
        self.dirty.len()
    }

    pub(super) fn state(&self, left: &L, right: &R) -> Option<TupleState> {
        self.states.get(&(left.clone(), right.clone())).copied()
    }

    pub(super) fn create(&mut self, left: L, right: R) -> Result<(), InternalError> {
        match self.states.entry((left, right)) {
            Entry::Vacant(slot) => {
                self.dirty.push_back(slot.key().clone());
                slot.insert(TupleState::Creating);
            }
            Entry::Occupied(mut slot) => {
                let next = match *slot.get() {
                    // still queued; the pending retraction becomes an update
                    TupleState::Dying => TupleState::Updating,
                    TupleState::Aborting => TupleState::Creating,
                    state => return Err(unexpected(state, "create")),
                };
                slot.insert(next);
            }
        }

        Ok(())
    }

    pub(super) fn update(&mut self, left: &L, right: &R) -> Result<(), InternalError> {
        let pair = (left.clone(), right.clone());
        let Some(state) = self.states.get_mut(&pair) else {
            return Err(missing("update"));
        };
        match *state {
            TupleState::Ok => {
                *state = TupleState::Updating;
                self.dirty.push_back(pair);
            }
            TupleState::Creating | TupleState::Updating => {}
            other => return Err(unexpected(other, "update")),
        }

        Ok(())
    }

    pub(super) fn retract(&mut self, left: &L, right: &R) -> Result<(), InternalError> {
        let pair = (left.clone(), right.clone());
        let Some(state) = self.states.get_mut(&pair) else {
            return Err(missing("retract"));
        };
        match *state {
            TupleState::Creating => *state = TupleState::Aborting,
            TupleState::Ok => {
                *state = TupleState::Dying;
                self.dirty.push_back(pair);
            }
            TupleState::Updating => *state = TupleState::Dying,
            other => return Err(unexpected(other, "retract")),
        }

        Ok(())
    }

    /// Drain the dirty queue in arrival order, settling or dropping each pair.
    pub(super) fn flush(
        &mut self,
        callback: &mut dyn FnMut(JoinEvent<'_, L, R>),
    ) -> Result<(), InternalError> {
        let (mut inserts, mut updates, mut retracts) = (0, 0, 0);

        while let Some(pair) = self.dirty.pop_front() {
            let Some(state) = self.states.get_mut(&pair) else {
                return Err(missing("flush"));
            };
            let (left, right) = &pair;
            match *state {
                TupleState::Creating => {
                    callback(JoinEvent::Insert { left, right });
                    *state = TupleState::Ok;
                    inserts += 1;
                }
                TupleState::Updating => {
                    callback(JoinEvent::Update { left, right });
                    *state = TupleState::Ok;
                    updates += 1;
                }
                TupleState::Dying => {
                    self.states.remove(&pair);
                    callback(JoinEvent::Retract { left, right });
                    retracts += 1;
                }
                TupleState::Aborting => {
                    self.states.remove(&pair);
                }
                TupleState::Ok => return Err(unexpected(TupleState::Ok, "flush")),
            }
        }

        sink::record(MetricsEvent::JoinFlush {
            inserts,
            updates,
            retracts,
        });

        Ok(())
    }
}

fn unexpected(state: TupleState, action: &str) -> InternalError {
    sink::violation(InternalError::join_contract(format!(
        "cannot {action} an out tuple in state {state}"
    )))
}

fn missing(action: &str) -> InternalError {
    sink::violation(InternalError::join_contract(format!(
        "cannot {action} an out tuple that does not exist"
    )))
}
