//! Reusable ITC backend fixtures for pipeline and engine testing.
//!
//! Two standard backends, mirroring a constant-value / deterministic-
//! failure pair:
//!
//! - [`ConstantItcBackend`] — always returns the same integration time.
//! - [`FailingItcBackend`] — fails deterministically after N calls, then
//!   recovers, for exercising obscalc's retry/backoff path.

use std::sync::atomic::{AtomicUsize, Ordering};

use odb_core::{GenError, IntegrationTime, TimeSpan};
use odb_itc::{ItcBackend, ItcInput, ItcVersions};

/// Always resolves to the same [`IntegrationTime`], regardless of input.
///
/// Useful for exercising the digest/workflow pipeline without modeling a
/// real calculator: if the returned time shows up unchanged downstream,
/// the plumbing between C2 and the rest of the pipeline is working.
pub struct ConstantItcBackend {
    result: IntegrationTime,
}

impl ConstantItcBackend {
    /// A backend that always resolves to `exposure_time` repeated
    /// `exposure_count` times, bypassing any S/N modeling.
    pub fn new(exposure_time: TimeSpan, exposure_count: u32) -> Self {
        Self { result: IntegrationTime::from_time_and_count(exposure_time, exposure_count) }
    }
}

impl ItcBackend for ConstantItcBackend {
    fn spectroscopy(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
        Ok(self.result.clone())
    }

    fn imaging(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
        Ok(self.result.clone())
    }

    fn spectroscopy_graphs(&self, _input: &ItcInput) -> Result<Vec<f64>, GenError> {
        Ok(Vec::new())
    }

    fn versions(&self) -> ItcVersions {
        ItcVersions { server: "test-fixture".to_string(), data: None }
    }
}

/// Fails deterministically after a configurable number of successful
/// calls, then keeps failing — for exercising obscalc's transient-error
/// retry path (§4.8 "On failure").
///
/// Uses `AtomicUsize` for the call counter so it satisfies `Send + Sync`.
pub struct FailingItcBackend {
    succeed_count: usize,
    calls: AtomicUsize,
    result: IntegrationTime,
}

impl FailingItcBackend {
    /// A backend that succeeds `succeed_count` times, returning
    /// `exposure_time`/`exposure_count`, then fails on every subsequent
    /// call with [`GenError::ItcError`].
    pub fn new(succeed_count: usize, exposure_time: TimeSpan, exposure_count: u32) -> Self {
        Self {
            succeed_count,
            calls: AtomicUsize::new(0),
            result: IntegrationTime::from_time_and_count(exposure_time, exposure_count),
        }
    }

    /// How many times a solving method has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }

    fn solve(&self) -> Result<IntegrationTime, GenError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n < self.succeed_count {
            Ok(self.result.clone())
        } else {
            Err(GenError::ItcError(format!("deliberate failure on call {}", n + 1)))
        }
    }
}

impl ItcBackend for FailingItcBackend {
    fn spectroscopy(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
        self.solve()
    }

    fn imaging(&self, _input: &ItcInput) -> Result<IntegrationTime, GenError> {
        self.solve()
    }

    fn spectroscopy_graphs(&self, _input: &ItcInput) -> Result<Vec<f64>, GenError> {
        Ok(Vec::new())
    }

    fn versions(&self) -> ItcVersions {
        ItcVersions { server: "test-fixture".to_string(), data: None }
    }
}
