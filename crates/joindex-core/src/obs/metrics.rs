use crate::index::IndexerKind;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for index and interval operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub indexers: BTreeMap<IndexerKind, IndexerCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Indexer leaves
    pub tuple_puts: u64,
    pub tuple_removes: u64,
    pub bucket_visits: u64,
    pub tuples_visited: u64,

    // Protocol
    pub contract_violations: u64,

    // Interval tree
    pub interval_inserts: u64,
    pub interval_removes: u64,
    pub clusters_created: u64,
    pub cluster_merges: u64,
    pub clusters_merged: u64,
    pub cluster_splits: u64,
    pub cluster_refreshes: u64,
    pub break_repairs: u64,

    // Join node flushes
    pub join_inserts: u64,
    pub join_updates: u64,
    pub join_retracts: u64,
}

///
/// IndexerCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct IndexerCounters {
    pub puts: u64,
    pub removes: u64,
    pub bucket_visits: u64,
    pub tuples_visited: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters (useful in tests).
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Point-in-time counter report.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub indexer_counters: Vec<IndexerSummary>,
}

///
/// IndexerSummary
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IndexerSummary {
    pub kind: IndexerKind,
    pub puts: u64,
    pub removes: u64,
    pub bucket_visits: u64,
    pub avg_tuples_per_visit: f64,
}

/// Build a report from the current thread's counters.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    with_state(|state| {
        let mut indexer_counters: Vec<IndexerSummary> = state
            .indexers
            .iter()
            .map(|(kind, counters)| IndexerSummary {
                kind: *kind,
                puts: counters.puts,
                removes: counters.removes,
                bucket_visits: counters.bucket_visits,
                avg_tuples_per_visit: if counters.bucket_visits == 0 {
                    0.0
                } else {
                    counters.tuples_visited as f64 / counters.bucket_visits as f64
                },
            })
            .collect();

        // busiest indexer kinds first
        indexer_counters.sort_by(|a, b| {
            (b.puts + b.removes)
                .cmp(&(a.puts + a.removes))
                .then_with(|| a.kind.cmp(&b.kind))
        });

        EventReport {
            counters: Some(state.clone()),
            indexer_counters,
        }
    })
}
