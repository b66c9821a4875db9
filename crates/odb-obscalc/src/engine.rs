//! The engine that ties [`EntryTable`], [`IngressQueue`], [`Worker`]s, and
//! the periodic sweep together (§4.8, §5 "multiple generations ... run
//! concurrently on distinct threads").
//!
//! Two ways to drive it, mirroring the teacher's lockstep/realtime split:
//! [`ObscalcEngine::step`] runs one synchronous round for deterministic
//! tests, while [`ObscalcEngine::spawn`] starts a worker pool plus a
//! background sweep thread for production use.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use odb_time::Timestamp;

use crate::config::{ConfigError, ObscalcConfig};
use crate::ingress::{Invalidation, IngressQueue};
use crate::metrics::EngineMetrics;
use crate::pipeline::ObscalcContext;
use crate::queue::EntryTable;
use crate::worker::Worker;

/// Idle backoff applied by a worker thread that claimed nothing, so a
/// quiet engine does not spin (no counterpart in the spec; purely an
/// implementation detail of the background thread loop).
const IDLE_SLEEP: Duration = Duration::from_millis(10);

/// Shared state for one running obscalc engine: the entry table every
/// worker claims from, the inbound invalidation queue, the C1–C7
/// collaborators, and the cumulative counters.
pub struct ObscalcEngine {
    table: Arc<EntryTable>,
    ingress: Arc<IngressQueue>,
    metrics: Arc<EngineMetrics>,
    context: Arc<ObscalcContext>,
    config: ObscalcConfig,
}

impl ObscalcEngine {
    /// Build an engine from its pipeline context and configuration,
    /// rejecting a configuration [`ObscalcConfig::validate`] would refuse.
    pub fn new(context: ObscalcContext, config: ObscalcConfig, ingress_capacity: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table: Arc::new(EntryTable::new()),
            ingress: Arc::new(IngressQueue::bounded(ingress_capacity)),
            metrics: Arc::new(EngineMetrics::new()),
            context: Arc::new(context),
            config,
        })
    }

    /// A clonable sender producers use to queue invalidations (§5
    /// "Invalidations are non-blocking").
    pub fn sender(&self) -> crossbeam_channel::Sender<Invalidation> {
        self.ingress.sender()
    }

    /// The shared entry table, for read-only inspection (state, counts).
    pub fn table(&self) -> &EntryTable {
        &self.table
    }

    /// Cumulative engine counters.
    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// Drain every queued invalidation into the entry table.
    fn apply_ingress(&self, now: Timestamp) {
        for invalidation in self.ingress.drain() {
            self.table.invalidate(invalidation.observation_id, invalidation.received);
            self.metrics.record_invalidation();
            let _ = now;
        }
    }

    /// Run one synchronous round: apply queued invalidations, sweep
    /// expired leases and elapsed retries back to `Pending`, then claim
    /// and settle up to `batch_size` rows on a single ad hoc worker.
    ///
    /// Deterministic and single-threaded — the lockstep equivalent for
    /// tests that need to observe the table between rounds.
    pub fn step(&self, batch_size: usize) -> usize {
        let now = Timestamp::now();
        self.apply_ingress(now);
        self.table.sweep(now);

        let worker = Worker {
            id: 0,
            table: Arc::clone(&self.table),
            context: Arc::clone(&self.context),
            config: self.config.clone(),
            metrics: Arc::clone(&self.metrics),
        };
        worker.run_batch(batch_size)
    }

    /// Spawn [`ObscalcConfig::resolved_worker_count`] worker threads and
    /// one periodic sweep thread, returning a [`EngineHandle`] that joins
    /// them all on [`EngineHandle::shutdown`].
    pub fn spawn(self: Arc<Self>, batch_size: usize) -> EngineHandle {
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let worker_count = self.config.resolved_worker_count();

        let mut threads = Vec::with_capacity(worker_count + 1);
        for id in 0..worker_count as u32 {
            let engine = Arc::clone(&self);
            let shutdown = Arc::clone(&shutdown_flag);
            let handle = thread::Builder::new()
                .name(format!("obscalc-worker-{id}"))
                .spawn(move || {
                    let worker = Worker {
                        id,
                        table: Arc::clone(&engine.table),
                        context: Arc::clone(&engine.context),
                        config: engine.config.clone(),
                        metrics: Arc::clone(&engine.metrics),
                    };
                    while !shutdown.load(Ordering::Acquire) {
                        if worker.run_batch(batch_size) == 0 {
                            thread::sleep(IDLE_SLEEP);
                        }
                    }
                })
                .expect("failed to spawn obscalc worker thread");
            threads.push(handle);
        }

        let sweep_interval = self.config.tick_interval;
        let engine = Arc::clone(&self);
        let shutdown = Arc::clone(&shutdown_flag);
        let sweep_handle = thread::Builder::new()
            .name("obscalc-sweep".into())
            .spawn(move || {
                while !shutdown.load(Ordering::Acquire) {
                    engine.apply_ingress(Timestamp::now());
                    engine.table.sweep(Timestamp::now());
                    thread::sleep(sweep_interval);
                }
            })
            .expect("failed to spawn obscalc sweep thread");
        threads.push(sweep_handle);

        EngineHandle { shutdown_flag, threads }
    }
}

/// A running engine's background threads, joined on [`Self::shutdown`].
pub struct EngineHandle {
    shutdown_flag: Arc<AtomicBool>,
    threads: Vec<JoinHandle<()>>,
}

impl EngineHandle {
    /// Signal every worker and the sweep thread to stop after their
    /// current iteration, then join them all.
    pub fn shutdown(mut self) {
        self.shutdown_flag.store(true, Ordering::Release);
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown_flag.store(true, Ordering::Release);
        for handle in self.threads.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use odb_core::{GenError, IntegrationTime, ObservationId, ObservationSource};
    use odb_itc::{ItcBackend, ItcClient, ItcClientConfig, ItcInput, ItcVersions};

    use super::*;
    use crate::ingress::InvalidationCause;
    use crate::pipeline::default_smart_gcal;
    use crate::source::EmptyHistory;

    /// Every observation is unauthorized, so [`odb_core::resolver::resolve`]
    /// fails fast with [`GenError::NotAuthorized`] before anything else in
    /// the pipeline runs — enough to exercise the engine's plumbing without
    /// constructing a full [`odb_core::GenParams`].
    struct NoSuchObservation;

    impl ObservationSource for NoSuchObservation {
        fn is_authorized(&self, _observation_id: ObservationId) -> bool {
            false
        }
        fn program_id(&self, _observation_id: ObservationId) -> Option<odb_core::ProgramId> {
            None
        }
        fn instrument_mode(&self, _observation_id: ObservationId) -> Option<odb_core::InstrumentModeKind> {
            None
        }
        fn asterism(&self, _observation_id: ObservationId) -> Vec<odb_core::RawAsterismEntry> {
            Vec::new()
        }
        fn constraints(&self, _observation_id: ObservationId) -> Option<odb_core::Constraints> {
            None
        }
        fn exposure_time_mode(&self, _observation_id: ObservationId) -> Option<odb_core::ExposureTimeMode> {
            None
        }
        fn explicit_spatial_offsets(&self, _observation_id: ObservationId) -> Option<Vec<odb_core::Offset>> {
            None
        }
        fn explicit_wavelength_dithers(&self, _observation_id: ObservationId) -> Option<Vec<f64>> {
            None
        }
        fn acquisition_overrides(&self, _observation_id: ObservationId) -> odb_core::AcquisitionOverrides {
            Default::default()
        }
    }

    /// Never actually invoked by these tests (resolution fails first), but
    /// [`ItcClient`] needs a concrete backend to construct.
    struct UnreachableItcBackend;

    impl ItcBackend for UnreachableItcBackend {
        fn spectroscopy(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
            unreachable!("resolution fails before the ITC is consulted")
        }
        fn imaging(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
            unreachable!("resolution fails before the ITC is consulted")
        }
        fn spectroscopy_graphs(&self, _input: &ItcInput) -> Result<Vec<f64>, GenError> {
            unreachable!("resolution fails before the ITC is consulted")
        }
        fn versions(&self) -> ItcVersions {
            unreachable!("resolution fails before the ITC is consulted")
        }
    }

    fn test_engine() -> ObscalcEngine {
        let context = ObscalcContext {
            observations: Arc::new(NoSuchObservation),
            execution: Arc::new(EmptyHistory),
            workflow: Arc::new(EmptyHistory),
            itc: Arc::new(ItcClient::init(Arc::new(UnreachableItcBackend), ItcClientConfig::default())),
            smart_gcal: default_smart_gcal(),
            future_limit: 5,
        atom_count_ceiling: 100_000,
        };
        ObscalcEngine::new(context, ObscalcConfig::default(), 64).unwrap()
    }

    #[test]
    fn step_settles_a_queued_invalidation_into_an_error_result() {
        let engine = test_engine();
        engine
            .sender()
            .send(Invalidation {
                observation_id: ObservationId(1),
                cause: InvalidationCause::ObservationEdit,
                received: Timestamp::now(),
            })
            .unwrap();

        let settled = engine.step(10);
        assert_eq!(settled, 1);
        let entry = engine.table().get(ObservationId(1)).unwrap();
        assert!(entry.result.is_some());
    }

    #[test]
    fn spawn_and_shutdown_round_trips_cleanly() {
        let engine = Arc::new(test_engine());
        engine
            .sender()
            .send(Invalidation {
                observation_id: ObservationId(7),
                cause: InvalidationCause::Tick,
                received: Timestamp::now(),
            })
            .unwrap();

        let handle = Arc::clone(&engine).spawn(4);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while engine.table().get(ObservationId(7)).map(|e| e.result.is_none()).unwrap_or(true) {
            if std::time::Instant::now() > deadline {
                panic!("observation 7 never settled within 2s");
            }
            thread::sleep(Duration::from_millis(10));
        }
        handle.shutdown();
    }
}
