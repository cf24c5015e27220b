//! Observability: runtime counters and the sink they flow through.
//!
//! Engine code never touches `metrics` directly; it emits `MetricsEvent`s
//! through `sink::record`.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TypeCounters, TypeSummary};
pub use sink::{MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink};
