//! The boundary between this crate and the (out-of-scope) integration
//! time calculator service itself.

use crate::types::{ItcInput, ItcVersions};
use odb_core::{GenError, IntegrationTime};

/// A raw integration-time calculator call, independent of caching.
///
/// Implementors perform the actual (out-of-scope) remote computation;
/// [`crate::ItcClient`] wraps an implementation with the singleflight
/// cache described in §4.2.
pub trait ItcBackend: Send + Sync {
    /// Solve for the spectroscopic integration time.
    fn spectroscopy(&self, input: &ItcInput) -> Result<IntegrationTime, GenError>;

    /// Solve for the imaging integration time.
    fn imaging(&self, input: &ItcInput) -> Result<IntegrationTime, GenError>;

    /// Compute the supporting signal/background graphs for a spectroscopic
    /// input (used by client-facing diagnostics, not by generation itself).
    fn spectroscopy_graphs(&self, input: &ItcInput) -> Result<Vec<f64>, GenError>;

    /// The calculator and reference-data versions currently in use.
    fn versions(&self) -> ItcVersions;
}
