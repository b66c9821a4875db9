//! A single worker's claim-compute-settle loop (§4.8 "worker selects a
//! batch of `Pending` entries ... transitions each to `Calculating`").

use std::sync::Arc;

use odb_core::ObservationId;
use odb_time::Timestamp;
use rand::Rng;

use crate::config::ObscalcConfig;
use crate::entry::Lease;
use crate::metrics::EngineMetrics;
use crate::pipeline::{self, ObscalcContext, RunOutcome};
use crate::queue::EntryTable;

/// Everything one worker thread needs to run its claim-compute-settle
/// loop, shared with every other worker (§5 "multiple generations for
/// different observations may run concurrently on distinct threads").
pub struct Worker {
    /// This worker's identity, recorded in every lease it acquires.
    pub id: u32,
    /// The shared entry table.
    pub table: Arc<EntryTable>,
    /// The shared pipeline context (C1–C7 collaborators).
    pub context: Arc<ObscalcContext>,
    /// Engine configuration (batch size via lease duration, backoff shape).
    pub config: ObscalcConfig,
    /// Shared counters.
    pub metrics: Arc<EngineMetrics>,
}

impl Worker {
    /// Claim up to `batch_size` `Pending` rows and run the pipeline for
    /// each, settling every one before returning. Returns the number of
    /// rows processed (§4.8 "Calculating").
    pub fn run_batch(&self, batch_size: usize) -> usize {
        let now = Timestamp::now();
        let lease = Lease { worker_id: self.id, expires_at: now.plus_micros(micros(self.config.lease_duration)) };
        let claimed = self.table.claim_batch(batch_size, lease);

        for observation_id in &claimed {
            self.settle_one(*observation_id);
        }
        claimed.len()
    }

    fn settle_one(&self, observation_id: ObservationId) {
        self.metrics.record_computation_started();
        match pipeline::run(&self.context, observation_id) {
            RunOutcome::Settled(result) => {
                self.metrics.record_success();
                self.table.complete(observation_id, result, Timestamp::now());
            }
            RunOutcome::Transient(error) => {
                self.metrics.record_retry();
                tracing::warn!(observation_id = observation_id.0, %error, "transient obscalc failure");
                let jitter_factor = sample_jitter_factor(self.config.backoff.jitter);
                self.table.fail(observation_id, &self.config.backoff, jitter_factor, Timestamp::now());
            }
        }
    }
}

/// A jitter factor sampled from `[1 - jitter, 1 + jitter]`, or `1.0` when
/// jitter is disabled (§4.8 "On failure").
fn sample_jitter_factor(jitter: f64) -> f64 {
    if jitter <= 0.0 {
        1.0
    } else {
        rand::rng().random_range((1.0 - jitter).max(0.0)..=(1.0 + jitter))
    }
}
