//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Index and interval code never touches counters directly; everything is
//! routed through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, IndexerCounters, IndexerSummary};
pub use sink::{
    ClusterChange, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all,
    with_metrics_sink,
};
