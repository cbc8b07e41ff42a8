//! Metrics sink boundary.
//!
//! Index and interval logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between index maintenance
//! and the thread-local metrics state.
use crate::{
    error::ErrorOrigin,
    index::IndexerKind,
    interval::BreakRepairCase,
    obs::metrics::{self, EventReport},
};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// ClusterChange
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClusterChange {
    Created,
    Merged { clusters: u64 },
    Split { fragments: u64 },
    Refreshed,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    TuplePut {
        kind: IndexerKind,
    },
    TupleRemove {
        kind: IndexerKind,
    },
    BucketVisit {
        kind: IndexerKind,
        tuples: u64,
    },
    ContractViolation {
        origin: ErrorOrigin,
    },
    IntervalDelta {
        inserts: u64,
        removes: u64,
    },
    Cluster {
        change: ClusterChange,
    },
    BreakRepair {
        case: BreakRepairCase,
    },
    JoinFlush {
        inserts: u64,
        updates: u64,
        retracts: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::TuplePut { kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.tuple_puts = m.ops.tuple_puts.saturating_add(1);
                    let entry = m.indexers.entry(kind).or_default();
                    entry.puts = entry.puts.saturating_add(1);
                });
            }

            MetricsEvent::TupleRemove { kind } => {
                metrics::with_state_mut(|m| {
                    m.ops.tuple_removes = m.ops.tuple_removes.saturating_add(1);
                    let entry = m.indexers.entry(kind).or_default();
                    entry.removes = entry.removes.saturating_add(1);
                });
            }

            MetricsEvent::BucketVisit { kind, tuples } => {
                metrics::with_state_mut(|m| {
                    m.ops.bucket_visits = m.ops.bucket_visits.saturating_add(1);
                    m.ops.tuples_visited = m.ops.tuples_visited.saturating_add(tuples);
                    let entry = m.indexers.entry(kind).or_default();
                    entry.bucket_visits = entry.bucket_visits.saturating_add(1);
                    entry.tuples_visited = entry.tuples_visited.saturating_add(tuples);
                });
            }

            MetricsEvent::ContractViolation { origin: _ } => {
                metrics::with_state_mut(|m| {
                    m.ops.contract_violations = m.ops.contract_violations.saturating_add(1);
                });
            }

            MetricsEvent::IntervalDelta { inserts, removes } => {
                metrics::with_state_mut(|m| {
                    m.ops.interval_inserts = m.ops.interval_inserts.saturating_add(inserts);
                    m.ops.interval_removes = m.ops.interval_removes.saturating_add(removes);
                });
            }

            MetricsEvent::Cluster { change } => {
                metrics::with_state_mut(|m| match change {
                    ClusterChange::Created => {
                        m.ops.clusters_created = m.ops.clusters_created.saturating_add(1);
                    }
                    ClusterChange::Merged { clusters } => {
                        m.ops.cluster_merges = m.ops.cluster_merges.saturating_add(1);
                        m.ops.clusters_merged = m.ops.clusters_merged.saturating_add(clusters);
                    }
                    ClusterChange::Split { fragments: _ } => {
                        m.ops.cluster_splits = m.ops.cluster_splits.saturating_add(1);
                    }
                    ClusterChange::Refreshed => {
                        m.ops.cluster_refreshes = m.ops.cluster_refreshes.saturating_add(1);
                    }
                });
            }

            MetricsEvent::BreakRepair { case: _ } => {
                metrics::with_state_mut(|m| {
                    m.ops.break_repairs = m.ops.break_repairs.saturating_add(1);
                });
            }

            MetricsEvent::JoinFlush {
                inserts,
                updates,
                retracts,
            } => {
                metrics::with_state_mut(|m| {
                    m.ops.join_inserts = m.ops.join_inserts.saturating_add(inserts);
                    m.ops.join_updates = m.ops.join_updates.saturating_add(updates);
                    m.ops.join_retracts = m.ops.join_retracts.saturating_add(retracts);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Record a contract violation and hand the error back for propagation.
pub(crate) fn violation(err: crate::error::InternalError) -> crate::error::InternalError {
    record(MetricsEvent::ContractViolation { origin: err.origin });
    err
}

/// Snapshot the current thread's metrics state.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state for the current thread.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
