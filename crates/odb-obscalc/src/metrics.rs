//! Engine-wide counters, read by diagnostics and tests without touching
//! the entry table's lock.

use std::sync::atomic::{AtomicU64, Ordering};

/// Cumulative counts of events the engine has processed, independent of
/// the entry table's current (instantaneous) state distribution exposed
/// by [`crate::queue::EntryTable::state_counts`].
#[derive(Default)]
pub struct EngineMetrics {
    invalidations_applied: AtomicU64,
    computations_started: AtomicU64,
    computations_succeeded: AtomicU64,
    computations_retried: AtomicU64,
    leases_reclaimed: AtomicU64,
}

impl EngineMetrics {
    /// A fresh, zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_computation_started(&self) {
        self.computations_started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.computations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_retry(&self) {
        self.computations_retried.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_lease_reclaimed(&self) {
        self.leases_reclaimed.fetch_add(1, Ordering::Relaxed);
    }

    /// Total invalidations ever applied to the entry table.
    pub fn invalidations_applied(&self) -> u64 {
        self.invalidations_applied.load(Ordering::Relaxed)
    }

    /// Total pipeline runs a worker has started.
    pub fn computations_started(&self) -> u64 {
        self.computations_started.load(Ordering::Relaxed)
    }

    /// Total pipeline runs that settled with a result (success or
    /// terminal failure).
    pub fn computations_succeeded(&self) -> u64 {
        self.computations_succeeded.load(Ordering::Relaxed)
    }

    /// Total pipeline runs that hit a transient failure and were sent to
    /// `Retry`.
    pub fn computations_retried(&self) -> u64 {
        self.computations_retried.load(Ordering::Relaxed)
    }

    /// Total expired leases reclaimed by a sweep.
    pub fn leases_reclaimed(&self) -> u64 {
        self.leases_reclaimed.load(Ordering::Relaxed)
    }
}
