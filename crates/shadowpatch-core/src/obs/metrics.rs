use serde::{Deserialize, Serialize};
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for merge and read operations.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub types: BTreeMap<String, TypeCounters>,
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Merge engine
    pub merge_calls: u64,
    pub merge_failures: u64,
    pub fields_applied: u64,

    // Document reader
    pub documents_read: u64,
    pub documents_rejected: u64,
    pub fields_present: u64,

    // Registry
    pub registry_misses: u64,
}

///
/// TypeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeCounters {
    pub merge_calls: u64,
    pub merge_failures: u64,
    pub fields_applied: u64,
    pub documents_read: u64,
    pub documents_rejected: u64,
    pub registry_misses: u64,
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

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Counters for `type_path`, created on first use.
pub(crate) fn type_entry<'a>(m: &'a mut EventState, type_path: &str) -> &'a mut TypeCounters {
    m.types.entry(type_path.to_string()).or_default()
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: EventState,
    pub type_summaries: Vec<TypeSummary>,
}

///
/// TypeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TypeSummary {
    pub path: String,
    pub merge_calls: u64,
    pub merge_failures: u64,
    pub avg_fields_per_merge: f64,
    pub documents_read: u64,
    pub documents_rejected: u64,
}

#[expect(clippy::cast_precision_loss)]
fn average(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Snapshot counters plus per-type summaries, busiest types first.
pub(crate) fn report() -> EventReport {
    let counters = with_state(Clone::clone);

    let mut type_summaries: Vec<TypeSummary> = counters
        .types
        .iter()
        .map(|(path, c)| TypeSummary {
            path: path.clone(),
            merge_calls: c.merge_calls,
            merge_failures: c.merge_failures,
            avg_fields_per_merge: average(c.fields_applied, c.merge_calls),
            documents_read: c.documents_read,
            documents_rejected: c.documents_rejected,
        })
        .collect();

    type_summaries.sort_by(|a, b| {
        b.merge_calls
            .cmp(&a.merge_calls)
            .then_with(|| a.path.cmp(&b.path))
    });

    EventReport {
        counters,
        type_summaries,
    }
}
