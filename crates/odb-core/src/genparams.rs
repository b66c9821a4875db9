//! `GenParams`: the fully resolved, validated input to sequence generation.

use crate::domain::{AsterismMember, F2Disperser, F2ReadMode, GmosGrating, Offset, Site, TimeSpan};
use crate::id::{ObservationId, ProgramId};
use crate::physics::{Extinction, SignalToNoise};

/// The instrument mode and its instrument-specific configuration,
/// resolved from the observation (§3 `GenParams`).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum InstrumentModeKind {
    /// GMOS long-slit spectroscopy.
    GmosLongSlit {
        /// North or south focal plane.
        site: Site,
        /// Dispersing grating.
        grating: GmosGrating,
        /// Optional blocking filter.
        filter: Option<String>,
        /// Focal plane unit (slit) name.
        fpu: String,
        /// Central wavelength, nanometers.
        central_wavelength_nm: f64,
    },
    /// GMOS imaging.
    GmosImaging {
        /// North or south focal plane.
        site: Site,
        /// Filters to image through, in the order requested.
        filters: Vec<String>,
        /// Whether a single pre-imaging pass precedes the main sequence.
        pre_imaging: bool,
        /// `true` interleaves exposures across filters each cycle;
        /// `false` groups all exposures of one filter before the next.
        interleave_filters: bool,
    },
    /// Flamingos-2 long-slit spectroscopy.
    Flamingos2LongSlit {
        /// Dispersing grism.
        disperser: F2Disperser,
        /// Blocking filter.
        filter: String,
        /// Focal plane unit (slit) name.
        fpu: String,
        /// Length of the slit, arcseconds (used by the on-slit check, §4.4).
        slit_length_arcsec: f64,
    },
}

/// An atmospheric/seeing constraint percentile bin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Percentile {
    /// Best 20% of conditions.
    P20,
    /// Best 50% of conditions.
    P50,
    /// Best 70% of conditions.
    P70,
    /// Best 80% of conditions.
    P80,
    /// No constraint.
    Any,
}

/// The observing conditions constraint set for an observation.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Constraints {
    /// Image quality percentile.
    pub image_quality: Percentile,
    /// Cloud extinction bound.
    pub cloud_extinction: Extinction,
    /// Sky background percentile.
    pub sky_background: Percentile,
    /// Water vapor percentile.
    pub water_vapor: Percentile,
}

/// How the exposure time/count is determined (§4.2).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ExposureTimeMode {
    /// Solve for exposure count/time to reach a target signal-to-noise
    /// via the ITC.
    SignalToNoise(SignalToNoise),
    /// Use an explicit time and count directly, bypassing the ITC
    /// (§4.2 "the result is constructed directly from (t,c)").
    TimeAndCount {
        /// Exposure time per frame.
        time: TimeSpan,
        /// Number of exposures.
        count: u32,
    },
}

/// User overrides applied to the acquisition sub-sequence (§4.4, §8 scenario D).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AcquisitionOverrides {
    /// Force every Flamingos-2 science step's read mode, overriding the
    /// instrument's computed default.
    pub explicit_read_mode: Option<F2ReadMode>,
}

/// The fully resolved, validated input to sequence generation (§3, §4.1).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenParams {
    /// The observation being generated.
    pub observation_id: ObservationId,
    /// The owning program.
    pub program_id: ProgramId,
    /// Instrument mode and its configuration.
    pub mode: InstrumentModeKind,
    /// Resolved asterism members, each with SED presence checked.
    pub asterism: Vec<AsterismMember>,
    /// Observing conditions constraints.
    pub constraints: Constraints,
    /// How exposure time/count is determined.
    pub exposure_time_mode: ExposureTimeMode,
    /// Explicit spatial offset override, if the user supplied one.
    pub explicit_spatial_offsets: Option<Vec<Offset>>,
    /// Explicit wavelength dither override (nanometers), if supplied.
    pub explicit_wavelength_dithers: Option<Vec<f64>>,
    /// Acquisition-phase overrides.
    pub acquisition_overrides: AcquisitionOverrides,
}

impl GenParams {
    /// Compute the deterministic MD5 params fingerprint (§3), salted with
    /// the process `commit_hash` so a code change invalidates cached
    /// results without an explicit sweep (§9 "Cache keys").
    pub fn fingerprint(&self, commit_hash: &str) -> [u8; 16] {
        let canonical = format!("{commit_hash}|{self:?}");
        md5::compute(canonical.as_bytes()).0
    }
}
