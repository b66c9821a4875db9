//! Request/response types exchanged with the integration time calculator
//! (§4.2).

use odb_core::{AsterismMember, Constraints, InstrumentModeKind, SignalToNoise};

/// Everything the calculator needs to solve for an integration time: the
/// target(s), the instrument configuration, the observing conditions, and
/// the requested signal-to-noise (§4.2 `SignalToNoise` mode; the
/// `TimeAndCount` mode never constructs one of these — see
/// [`crate::ItcClient::integration_time`]).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ItcInput {
    /// Asterism members contributing flux (and, for spectroscopy, the
    /// one used as the signal source).
    pub asterism: Vec<AsterismMember>,
    /// The observation's instrument mode and configuration.
    pub mode: InstrumentModeKind,
    /// Observing conditions constraints.
    pub constraints: Constraints,
    /// The signal-to-noise to solve for.
    pub requested_snr: SignalToNoise,
}

impl ItcInput {
    /// A stable cache-key fingerprint for this input, salted with
    /// `commit_hash` so a calculator or model change invalidates cached
    /// results without an explicit cache sweep (§9 "Cache keys").
    pub fn fingerprint(&self, commit_hash: &str) -> [u8; 16] {
        let canonical = format!("{commit_hash}|{self:?}");
        md5::compute(canonical.as_bytes()).0
    }
}

/// The calculator and reference-data versions backing a computation,
/// returned by [`crate::ItcClient::versions`].
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItcVersions {
    /// Version of the calculator service itself.
    pub server: String,
    /// Version of the spectral/atmospheric reference data in use, if the
    /// calculator reports one.
    pub data: Option<String>,
}
