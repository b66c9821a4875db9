//! Capability traits at the seams between the generator and its
//! (out-of-scope) collaborators.

use crate::domain::{Atom, InstrumentConfig, Offset};
use crate::error::GenError;
use crate::genparams::GenParams;
use crate::id::ObservationId;

/// Concrete step type threaded through the generator.
pub type ConcreteStep = crate::domain::Step<InstrumentConfig>;
/// Concrete atom type threaded through the generator.
pub type ConcreteAtom = Atom<InstrumentConfig>;

/// A restartable pull-iterator over atoms (§9 "Lazy atom streams").
///
/// Protosequences are conceptually infinite; implementors must never
/// materialize the whole stream. A `None` result means the stream has
/// permanently ended (only the science stream of a finite-exposure-count
/// observation ever does this — acquisition and most science streams are
/// unbounded and are instead truncated externally by `futureLimit` and
/// the atom-count ceiling).
pub trait AtomStream: Send {
    /// Produce the next atom, or `None` if the stream has ended.
    fn next_atom(&mut self) -> Option<ConcreteAtom>;

    /// Pull up to `limit` atoms, stopping early if the stream ends.
    fn take(&mut self, limit: usize) -> Vec<ConcreteAtom> {
        let mut out = Vec::with_capacity(limit.min(1024));
        for _ in 0..limit {
            match self.next_atom() {
                Some(atom) => out.push(atom),
                None => break,
            }
        }
        out
    }
}

/// Deterministic, instrument-specific static configuration (stage,
/// detector, nod-and-shuffle, etc.) produced by C3 (§4.3).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StaticConfig {
    /// Human-readable stage mode (e.g. "follow-xyz", "fixed").
    pub stage_mode: String,
    /// Detector identifier/name.
    pub detector: String,
    /// `true` if nod-and-shuffle is enabled for this configuration.
    ///
    /// Always `false` for the instrument families in scope (§4.3).
    pub nod_and_shuffle: bool,
}

/// The shared capability set implemented by each instrument-mode family
/// (GMOS long-slit, GMOS imaging, Flamingos-2 long-slit) — §9
/// "Polymorphism over instruments", §4.4 "Dispatch shape".
///
/// The generator is generic over `dyn InstrumentMode` and never matches
/// on instrument tags outside these implementations.
pub trait InstrumentMode: Send + Sync {
    /// Produce the deterministic static configuration for `params` (C3).
    fn static_config(&self, params: &GenParams) -> StaticConfig;

    /// Produce the acquisition protosequence (C4).
    fn proto_acquisition(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError>;

    /// Produce the science protosequence (C4).
    fn proto_science(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError>;

    /// The set of spatial offsets this configuration will cycle through,
    /// used to seed the digest's offset set without fully materializing
    /// the stream (§4.5 "union of telescope offsets used").
    fn digest_offsets(&self, params: &GenParams) -> Vec<Offset>;

    /// Validate `params` against this instrument's constraints (e.g.
    /// Flamingos-2's on-slit requirement), independent of generation.
    fn validate(&self, params: &GenParams) -> Result<(), GenError>;
}

/// A single entry resolved from the (out-of-scope) persistence layer for
/// one asterism member.
#[derive(Clone, Debug, PartialEq)]
pub struct RawAsterismEntry {
    /// The target, or `None` if it has been deleted (§8 scenario E).
    pub target: Option<crate::domain::AsterismMember>,
}

/// The boundary between the generator and the (out-of-scope) persistence
/// layer: everything C1 needs to resolve one observation's [`GenParams`]
/// (§4.1, §9's `SnapshotAccess`-style arena boundary).
pub trait ObservationSource: Send + Sync {
    /// `true` if the caller is authorized to generate this observation.
    fn is_authorized(&self, observation_id: ObservationId) -> bool;

    /// The observation's owning program, if the observation exists.
    fn program_id(&self, observation_id: ObservationId) -> Option<crate::id::ProgramId>;

    /// The observation's configured instrument mode, if any.
    fn instrument_mode(
        &self,
        observation_id: ObservationId,
    ) -> Option<crate::genparams::InstrumentModeKind>;

    /// The observation's asterism, including deleted-target placeholders.
    fn asterism(&self, observation_id: ObservationId) -> Vec<RawAsterismEntry>;

    /// The observation's conditions constraints, if configured.
    fn constraints(&self, observation_id: ObservationId) -> Option<crate::genparams::Constraints>;

    /// The observation's exposure-time mode, if configured.
    fn exposure_time_mode(
        &self,
        observation_id: ObservationId,
    ) -> Option<crate::genparams::ExposureTimeMode>;

    /// Explicit spatial offset override, if the user supplied one.
    fn explicit_spatial_offsets(&self, observation_id: ObservationId) -> Option<Vec<Offset>>;

    /// Explicit wavelength dither override, if the user supplied one.
    fn explicit_wavelength_dithers(&self, observation_id: ObservationId) -> Option<Vec<f64>>;

    /// Acquisition-phase overrides.
    fn acquisition_overrides(
        &self,
        observation_id: ObservationId,
    ) -> crate::genparams::AcquisitionOverrides;
}
