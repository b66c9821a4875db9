//! The shared table of per-observation [`Entry`] rows and the batch-pop
//! operation workers use to claim `Pending` work (§4.8, §5 "per-row
//! version check (CAS on `lastUpdate`)").

use std::collections::HashMap;
use std::sync::Mutex;

use odb_core::ObservationId;
use odb_time::Timestamp;

use crate::config::BackoffConfig;
use crate::entry::{Entry, EntryState, Lease, ObscalcResult};

/// The obscalc engine's shared queue: every observation it has ever seen
/// invalidated, keyed by observation id (§3 "A meta row is created when
/// an observation is first seen").
///
/// Guarded by a single mutex rather than per-row locks: every operation
/// here is a short, non-suspending table scan or field update (§5
/// "Suspension points" excludes this table), so a single lock never
/// blocks on I/O.
pub struct EntryTable {
    rows: Mutex<HashMap<ObservationId, Entry>>,
}

impl Default for EntryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryTable {
    /// An empty table.
    pub fn new() -> Self {
        Self { rows: Mutex::new(HashMap::new()) }
    }

    /// Record an invalidation for `observation_id` at `now` (§4.8
    /// "Invalidation bumps `lastInvalidation`, moves state to `Pending`").
    ///
    /// Creates the row if this is the first time the observation has
    /// been seen. A row mid-`Calculating` is left alone — the worker
    /// observes the advanced `lastInvalidation` on completion and
    /// requeues itself (§4.8 "Cancellation").
    pub fn invalidate(&self, observation_id: ObservationId, now: Timestamp) {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&observation_id) {
            Some(entry) => {
                entry.last_invalidation = now;
                if matches!(entry.state, EntryState::Ready | EntryState::Retry) {
                    entry.state = EntryState::Pending;
                    entry.retry_at = None;
                }
            }
            None => {
                rows.insert(observation_id, Entry::new(observation_id, now));
            }
        }
    }

    /// Move every `Retry` row whose `retry_at` has elapsed back to
    /// `Pending` (§4.8 "`Retry` → at `retryAt`, becomes `Pending`"), and
    /// reclaim any `Calculating` row whose lease has expired (§4.8
    /// "Concurrency", "An expired lease returns the entry to `Pending`").
    pub fn sweep(&self, now: Timestamp) {
        let mut rows = self.rows.lock().unwrap();
        for entry in rows.values_mut() {
            match entry.state {
                EntryState::Retry => {
                    if entry.retry_at.is_some_and(|at| at <= now) {
                        entry.state = EntryState::Pending;
                        entry.retry_at = None;
                    }
                }
                EntryState::Calculating => {
                    if entry.lease.is_some_and(|lease| lease.expires_at <= now) {
                        entry.state = EntryState::Pending;
                        entry.lease = None;
                        entry.snapshot_invalidation = None;
                    }
                }
                EntryState::Pending | EntryState::Ready => {}
            }
        }
    }

    /// Claim up to `limit` `Pending` rows ordered by `last_invalidation`
    /// ascending (§4.8 "worker selects a batch of `Pending` entries
    /// ordered by `lastInvalidation` ascending"), transitioning each to
    /// `Calculating` under `lease` and snapshotting the invalidation
    /// timestamp it is computing against.
    pub fn claim_batch(&self, limit: usize, lease: Lease) -> Vec<ObservationId> {
        let mut rows = self.rows.lock().unwrap();
        let mut candidates: Vec<ObservationId> = rows
            .iter()
            .filter(|(_, e)| e.state == EntryState::Pending)
            .map(|(id, _)| *id)
            .collect();
        candidates.sort_by_key(|id| rows[id].last_invalidation);
        candidates.truncate(limit);

        for id in &candidates {
            let entry = rows.get_mut(id).expect("candidate drawn from this table");
            entry.state = EntryState::Calculating;
            entry.snapshot_invalidation = Some(entry.last_invalidation);
            entry.lease = Some(lease);
        }
        candidates
    }

    /// Record a successful computation for `observation_id` (§4.8
    /// "writes `Result`, bumps `lastUpdate`, reads back current
    /// `lastInvalidation`").
    ///
    /// If `lastInvalidation` has not advanced since the lease snapshot,
    /// the row becomes `Ready` and `failure_count` resets to zero;
    /// otherwise it returns to `Pending` without discarding `result`
    /// (§4.8 "A successful write resets ... only if `lastInvalidation`
    /// has not advanced during computation").
    pub fn complete(&self, observation_id: ObservationId, result: ObscalcResult, now: Timestamp) {
        let mut rows = self.rows.lock().unwrap();
        let Some(entry) = rows.get_mut(&observation_id) else { return };

        entry.result = Some(result);
        entry.last_update = now;
        entry.lease = None;

        let stale = entry.snapshot_invalidation != Some(entry.last_invalidation);
        entry.snapshot_invalidation = None;
        if stale {
            entry.state = EntryState::Pending;
        } else {
            entry.state = EntryState::Ready;
            entry.failure_count = 0;
            entry.retry_at = None;
        }
    }

    /// Record a failed computation for `observation_id`: `Retry` with an
    /// incremented failure count and `retry_at` set from `backoff`,
    /// keyed on the new failure count and scaled by `jitter_factor`
    /// (§4.8 "On failure": `retryAt = now + min(maxBackoff, base ·
    /// 2^(failureCount-1) · jitter)`).
    pub fn fail(
        &self,
        observation_id: ObservationId,
        backoff: &BackoffConfig,
        jitter_factor: f64,
        now: Timestamp,
    ) -> u32 {
        let mut rows = self.rows.lock().unwrap();
        let Some(entry) = rows.get_mut(&observation_id) else { return 0 };

        entry.lease = None;
        entry.snapshot_invalidation = None;
        entry.state = EntryState::Retry;
        entry.failure_count += 1;
        let wait = backoff.backoff_for(entry.failure_count, jitter_factor);
        entry.retry_at = Some(now.plus_micros(wait.as_micros().min(i64::MAX as u128) as i64));
        entry.failure_count
    }

    /// A snapshot copy of one observation's current entry, if it has
    /// been seen.
    pub fn get(&self, observation_id: ObservationId) -> Option<Entry> {
        self.rows.lock().unwrap().get(&observation_id).cloned()
    }

    /// The number of rows currently in each [`EntryState`], in
    /// `(pending, calculating, ready, retry)` order.
    pub fn state_counts(&self) -> (usize, usize, usize, usize) {
        let rows = self.rows.lock().unwrap();
        let mut counts = (0, 0, 0, 0);
        for entry in rows.values() {
            match entry.state {
                EntryState::Pending => counts.0 += 1,
                EntryState::Calculating => counts.1 += 1,
                EntryState::Ready => counts.2 += 1,
                EntryState::Retry => counts.3 += 1,
            }
        }
        counts
    }

    /// Total number of rows tracked, regardless of state.
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// `true` if no row has ever been recorded.
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().is_empty()
    }
}
