//! Metrics sink boundary.
//!
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
//! This module is the only bridge between engine code and the
//! thread-local metrics state.

use crate::obs::metrics::{self, EventReport};
use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    MergeStart {
        type_path: &'a str,
    },
    MergeFinish {
        type_path: &'a str,
        fields_applied: u64,
    },
    MergeFailed {
        type_path: &'a str,
    },
    DocumentRead {
        type_path: &'a str,
        fields_present: u64,
    },
    DocumentRejected {
        type_path: &'a str,
    },
    RegistryMiss {
        type_path: &'a str,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// ThreadMetricsSink
/// Default sink; writes into the thread-local `EventState`.

pub(crate) struct ThreadMetricsSink;

impl MetricsSink for ThreadMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::MergeStart { type_path } => {
                m.ops.merge_calls = m.ops.merge_calls.saturating_add(1);
                let entry = metrics::type_entry(m, type_path);
                entry.merge_calls = entry.merge_calls.saturating_add(1);
            }

            MetricsEvent::MergeFinish {
                type_path,
                fields_applied,
            } => {
                m.ops.fields_applied = m.ops.fields_applied.saturating_add(fields_applied);
                let entry = metrics::type_entry(m, type_path);
                entry.fields_applied = entry.fields_applied.saturating_add(fields_applied);
            }

            MetricsEvent::MergeFailed { type_path } => {
                m.ops.merge_failures = m.ops.merge_failures.saturating_add(1);
                let entry = metrics::type_entry(m, type_path);
                entry.merge_failures = entry.merge_failures.saturating_add(1);
            }

            MetricsEvent::DocumentRead {
                type_path,
                fields_present,
            } => {
                m.ops.documents_read = m.ops.documents_read.saturating_add(1);
                m.ops.fields_present = m.ops.fields_present.saturating_add(fields_present);
                let entry = metrics::type_entry(m, type_path);
                entry.documents_read = entry.documents_read.saturating_add(1);
            }

            MetricsEvent::DocumentRejected { type_path } => {
                m.ops.documents_rejected = m.ops.documents_rejected.saturating_add(1);
                let entry = metrics::type_entry(m, type_path);
                entry.documents_rejected = entry.documents_rejected.saturating_add(1);
            }

            MetricsEvent::RegistryMiss { type_path } => {
                m.ops.registry_misses = m.ops.registry_misses.saturating_add(1);
                let entry = metrics::type_entry(m, type_path);
                entry.registry_misses = entry.registry_misses.saturating_add(1);
            }
        });
    }
}

pub(crate) const THREAD_METRICS_SINK: ThreadMetricsSink = ThreadMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // - `ptr` comes from a live `&dyn MetricsSink` installed by
        //   `with_metrics_sink`, which restores the previous slot on every
        //   exit (unwind included) through `Guard::drop`.
        // - `record` is synchronous and never keeps `ptr` past this call.
        // - Only a shared reference is materialized.
        unsafe { (&*ptr).record(event) };
    } else {
        THREAD_METRICS_SINK.record(event);
    }
}

/// Snapshot the current thread's metrics.
#[must_use]
pub fn metrics_report() -> EventReport {
    metrics::report()
}

/// Reset all metrics state.
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
    // - The pointer is installed only for this dynamic scope; `Guard`
    //   restores the previous slot on all exits.
    // - `record` dereferences it synchronously and never persists it.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn miss() -> MetricsEvent<'static> {
        MetricsEvent::RegistryMiss {
            type_path: "obs::tests::Entity",
        }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        with_metrics_sink(&outer, || {
            record(miss());
            with_metrics_sink(&inner, || record(miss()));
            record(miss());
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(miss());
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();

        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        SINK_OVERRIDE.with(|cell| assert!(cell.borrow().is_none()));
    }

    #[test]
    fn merge_events_accumulate_per_type() {
        metrics_reset_all();

        record(MetricsEvent::MergeStart {
            type_path: "app::Person",
        });
        record(MetricsEvent::MergeFinish {
            type_path: "app::Person",
            fields_applied: 3,
        });
        record(MetricsEvent::MergeStart {
            type_path: "app::Person",
        });
        record(MetricsEvent::MergeFinish {
            type_path: "app::Person",
            fields_applied: 1,
        });

        let report = metrics_report();
        assert_eq!(report.counters.ops.merge_calls, 2);
        assert_eq!(report.counters.ops.fields_applied, 4);

        let summary = &report.type_summaries[0];
        assert_eq!(summary.path, "app::Person");
        assert!((summary.avg_fields_per_merge - 2.0).abs() < f64::EPSILON);
    }
}
