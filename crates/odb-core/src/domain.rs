//! The sequence data model: atoms, steps, and their configuration (§3).

use crate::id::{AtomId, StepId, TargetId};
use crate::physics::SignalToNoise;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// A non-negative duration, in microseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimeSpan(u64);

impl TimeSpan {
    /// Construct from whole microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Construct from whole seconds.
    pub fn from_seconds(seconds: f64) -> Self {
        Self((seconds.max(0.0) * 1_000_000.0).round() as u64)
    }

    /// The duration in microseconds.
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// The duration in fractional seconds.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Zero duration.
    pub const ZERO: Self = Self(0);

    /// Sum two durations, saturating at `u64::MAX`.
    pub fn plus(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply by a non-negative integer count, saturating at `u64::MAX`.
    pub fn times(self, count: u32) -> Self {
        Self(self.0.saturating_mul(u64::from(count)))
    }

    /// The shorter of two durations.
    pub fn min(self, other: Self) -> Self {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

impl std::iter::Sum for TimeSpan {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::plus)
    }
}

/// Achieved-vs-requested signal-to-noise, as reported by the ITC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SnrResult {
    /// The ITC reports this S/N is achieved by the computed exposure count.
    Achieved(SignalToNoise),
    /// The caller requested this S/N; the ITC solved for exposure count.
    Requested(SignalToNoise),
}

/// The result of an ITC spectroscopy/imaging call: exposure time, count,
/// and the resulting signal-to-noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntegrationTime {
    /// Exposure time per frame.
    pub exposure_time: TimeSpan,
    /// Number of exposures (frames) to reach the target S/N.
    pub exposure_count: u32,
    /// The signal-to-noise this integration time achieves or was requested
    /// for, or `None` when the time and count were given explicitly and no
    /// ITC call was made (§4.2 `TimeAndCount` bypass).
    pub signal_to_noise: Option<SnrResult>,
    /// `true` if the ITC flagged the source as saturating the detector.
    pub source_too_bright: bool,
}

impl IntegrationTime {
    /// Construct directly from an explicit time and count, bypassing the
    /// ITC (§4.2 `TimeAndCount` mode).
    pub fn from_time_and_count(exposure_time: TimeSpan, exposure_count: u32) -> Self {
        Self {
            exposure_time,
            exposure_count,
            signal_to_noise: None,
            source_too_bright: false,
        }
    }
}

/// Accounting bucket a step's time is charged against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ChargeClass {
    /// Charged against the PI's program time allocation.
    Program,
    /// Charged against partner time.
    Partner,
    /// Not charged to any allocation (e.g. acquisition, daytime calibration).
    NonCharged,
}

/// The observing class of a step or whole sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ObserveClass {
    /// A science exposure.
    Science,
    /// A calibration taken at night, charged.
    NightCal,
    /// A calibration taken during the day, not charged.
    DayCal,
    /// Target acquisition.
    Acquisition,
    /// A calibration charged to the program.
    ProgramCal,
    /// A calibration charged to the partner.
    PartnerCal,
}

impl ObserveClass {
    /// The charge class this observe class is billed against.
    pub fn charge_class(self) -> ChargeClass {
        match self {
            Self::Science | Self::ProgramCal => ChargeClass::Program,
            Self::PartnerCal => ChargeClass::Partner,
            Self::NightCal | Self::DayCal | Self::Acquisition => ChargeClass::NonCharged,
        }
    }

    /// `true` for any calibration variant (used by §4.5's "least-specific
    /// non-calibration class" rule).
    pub fn is_calibration(self) -> bool {
        matches!(self, Self::NightCal | Self::DayCal | Self::ProgramCal | Self::PartnerCal)
    }

    /// The least-specific non-calibration class among a sequence of step
    /// classes, per §4.5's digest rule: `Science` if any science step is
    /// present, else the first calibration/acquisition class seen.
    pub fn least_specific(classes: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut fallback = None;
        for c in classes {
            if c == Self::Science {
                return Some(Self::Science);
            }
            fallback.get_or_insert(c);
        }
        fallback
    }
}

/// A calibration lamp, as used by [`StepConfig::Gcal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ArcLamp {
    /// Copper-argon arc lamp.
    CuAr,
    /// Thorium-argon arc lamp.
    ThAr,
    /// Xenon arc lamp.
    Xe,
}

/// A flat-field lamp, as used by [`StepConfig::Gcal`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FlatLamp {
    /// Quartz-halogen continuum lamp.
    Quartz,
    /// Infrared continuum lamp.
    Ir,
}

/// The lamp used by a calibration step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GcalLamp {
    /// An arc (wavelength-calibration) lamp.
    Arc(ArcLamp),
    /// A flat-field (continuum) lamp.
    Flat(FlatLamp),
}

/// The diffuser position for a GCAL calibration unit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GcalDiffuser {
    /// Infrared-optimized diffuser.
    Ir,
    /// Visible-optimized diffuser.
    Visible,
}

/// The shutter position for a GCAL calibration unit step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GcalShutter {
    /// Shutter open (lamp light reaches the instrument).
    Open,
    /// Shutter closed (dark calibration).
    Closed,
}

/// The configuration of a Gemini Calibration Unit (GCAL) step.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GcalConfig {
    /// The lamp in use.
    pub lamp: GcalLamp,
    /// Optional filter wheel position.
    pub filter: Option<String>,
    /// Diffuser position.
    pub diffuser: GcalDiffuser,
    /// Shutter position.
    pub shutter: GcalShutter,
}

impl GcalConfig {
    /// A standard wavelength-calibration ("arc") configuration.
    pub fn arc(lamp: ArcLamp) -> Self {
        Self {
            lamp: GcalLamp::Arc(lamp),
            filter: None,
            diffuser: GcalDiffuser::Visible,
            shutter: GcalShutter::Open,
        }
    }

    /// A standard flat-field configuration.
    pub fn flat(lamp: FlatLamp) -> Self {
        Self {
            lamp: GcalLamp::Flat(lamp),
            filter: None,
            diffuser: GcalDiffuser::Visible,
            shutter: GcalShutter::Open,
        }
    }
}

/// What kind of step this is, independent of instrument (§3 `Step`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StepConfig {
    /// A bias frame (zero exposure time, shutter closed).
    Bias,
    /// A dark frame (shutter closed, non-zero exposure).
    Dark,
    /// A calibration-unit exposure.
    Gcal(GcalConfig),
    /// A science exposure of the target.
    Science,
    /// A calibration whose exact GCAL configuration is resolved later by
    /// smart-gcal lookup (not specified by this crate — §1 out-of-scope).
    SmartGcal,
}

/// Whether the telescope guides during a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Guiding {
    /// Closed-loop guiding active.
    Enabled,
    /// Guiding off.
    Disabled,
}

/// A sky offset, `(p, q)` in arcseconds; `q` is along-slit.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    /// Offset perpendicular to the slit, arcseconds.
    pub p: f64,
    /// Offset along the slit, arcseconds.
    pub q: f64,
}

impl Offset {
    /// The zero offset.
    pub const ZERO: Self = Self { p: 0.0, q: 0.0 };

    /// Construct from `(p, q)` arcseconds.
    pub fn new(p: f64, q: f64) -> Self {
        Self { p, q }
    }
}

impl Eq for Offset {}
impl Hash for Offset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.p.to_bits().hash(state);
        self.q.to_bits().hash(state);
    }
}

impl PartialOrd for Offset {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Offset {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.p
            .total_cmp(&other.p)
            .then_with(|| self.q.total_cmp(&other.q))
    }
}

/// The telescope's configuration for a step: sky offset and guiding state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TelescopeConfig {
    /// Sky offset for this step.
    pub offset: Offset,
    /// Guiding state for this step.
    pub guiding: Guiding,
}

/// One instrument+telescope configuration, yielding zero or more datasets.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Step<C> {
    /// Fresh identity minted at generation time.
    pub id: StepId,
    /// Instrument-specific configuration (grating, filter, exposure, etc).
    pub instrument_config: C,
    /// What kind of step this is.
    pub step_config: StepConfig,
    /// Telescope offset and guiding state.
    pub telescope_config: TelescopeConfig,
    /// Accounting/observing classification.
    pub observe_class: ObserveClass,
    /// `true` if execution must pause after this step for operator review.
    pub breakpoint: bool,
}

/// A content fingerprint over everything that determines whether an
/// executed step satisfies a planned step (§4.5 "step fingerprints").
///
/// Deliberately excludes [`StepId`]: two steps with identical
/// configuration but different ids fingerprint equal, which is exactly
/// what the execution merge needs to match "the oldest matching
/// unexecuted step" regardless of identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StepFingerprint(u64);

impl<C: Hash> Step<C> {
    /// Compute this step's fingerprint for execution matching.
    pub fn fingerprint(&self) -> StepFingerprint {
        let mut hasher = DefaultHasher::new();
        self.instrument_config.hash(&mut hasher);
        self.step_config.hash(&mut hasher);
        self.telescope_config.hash(&mut hasher);
        StepFingerprint(hasher.finish())
    }
}

/// Whether an atom belongs to the acquisition or science phase (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SequenceType {
    /// Target acquisition.
    Acquisition,
    /// Science observation.
    Science,
}

/// A contiguous, non-interruptible group of steps (§3, Glossary).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Atom<C> {
    /// Fresh identity minted at generation time, or preserved across a
    /// merge for an in-progress atom (§4.5, §9 "Ownership of atom identity").
    pub id: AtomId,
    /// Acquisition or science.
    pub sequence_type: SequenceType,
    /// Non-empty ordered list of steps.
    pub steps: Vec<Step<C>>,
    /// Human-readable description (e.g. "Cycle 3, dither 0").
    pub description: String,
}

/// An [`Atom`] was constructed with an empty step list, violating the
/// "non-empty ordered list" invariant (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmptyAtomError;

impl std::fmt::Display for EmptyAtomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "an atom must contain at least one step")
    }
}

impl std::error::Error for EmptyAtomError {}

impl<C> Atom<C> {
    /// Construct an atom, rejecting an empty step list.
    pub fn new(
        sequence_type: SequenceType,
        steps: Vec<Step<C>>,
        description: impl Into<String>,
    ) -> Result<Self, EmptyAtomError> {
        if steps.is_empty() {
            return Err(EmptyAtomError);
        }
        Ok(Self {
            id: AtomId::new(),
            sequence_type,
            steps,
            description: description.into(),
        })
    }
}

/// A (target, profile, band) member of an observation's asterism (§3).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AsterismMember {
    /// The target this entry refers to.
    pub target_id: TargetId,
    /// Source brightness profile.
    pub profile: SourceProfile,
    /// Band the profile's magnitude/SED is measured in.
    pub band: Band,
    /// `true` if the target carries a defined spectral energy distribution.
    ///
    /// A missing SED short-circuits generation with `MissingSed` (§4.1).
    pub has_sed: bool,
}

/// A source's assumed spatial brightness distribution.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum SourceProfile {
    /// An unresolved point source.
    Point,
    /// A uniform, spatially extended source.
    Uniform,
    /// A Gaussian profile with the given FWHM in arcseconds.
    Gaussian {
        /// Full width at half maximum, arcseconds.
        fwhm_arcsec: f64,
    },
}

/// A Gemini GMOS grating. The default wavelength-dither list is keyed by
/// grating (§4.4 "wavelength dither list D (default by grating)").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GmosGrating {
    /// B1200 high-resolution blue grating.
    B1200,
    /// R831 medium-resolution red grating.
    R831,
    /// B600 medium-resolution blue grating.
    B600,
    /// R400 low-resolution red grating.
    R400,
    /// R150 low-resolution survey grating.
    R150,
}

/// A Flamingos-2 disperser (grism).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum F2Disperser {
    /// R1200 J/H grism.
    R1200JH,
    /// R1200 H/K grism.
    R1200HK,
    /// R3000 cross-dispersed grism.
    R3000,
}

/// Which Gemini focal plane an observation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Site {
    /// Gemini North (Maunakea).
    North,
    /// Gemini South (Cerro Pachón).
    South,
}

/// A Flamingos-2 detector read mode. Normally chosen by the generator
/// from the target's brightness; may be overridden by the user
/// (§8 scenario D).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum F2ReadMode {
    /// Fastest, noisiest mode — used for bright targets.
    Bright,
    /// Balanced mode for moderate targets.
    Medium,
    /// Slowest, lowest-noise mode — used for faint targets.
    Faint,
}

/// Wavelength, stored as whole picometers so it can derive `Eq`/`Hash`
/// exactly (unlike `f64`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct WavelengthPm(pub i64);

impl WavelengthPm {
    /// Construct from nanometers.
    pub fn from_nm(nm: f64) -> Self {
        Self((nm * 1000.0).round() as i64)
    }

    /// Convert to nanometers.
    pub fn to_nm(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// The instrument-specific configuration half of a [`Step`] (the other
/// half being [`StepConfig`] and [`TelescopeConfig`]).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum InstrumentConfig {
    /// GMOS (north or south) spectroscopic configuration.
    GmosLongSlit {
        /// North or south focal plane.
        site: Site,
        /// Dispersing grating.
        grating: GmosGrating,
        /// Optional blocking filter.
        filter: Option<String>,
        /// Focal plane unit (slit) name.
        fpu: String,
        /// Central wavelength for this step (includes any dither offset).
        central_wavelength: WavelengthPm,
        /// Exposure time for this step.
        exposure_time: TimeSpan,
    },
    /// GMOS imaging configuration.
    GmosImaging {
        /// North or south focal plane.
        site: Site,
        /// Filter for this step.
        filter: String,
        /// Exposure time for this step.
        exposure_time: TimeSpan,
    },
    /// Flamingos-2 spectroscopic configuration.
    Flamingos2LongSlit {
        /// Dispersing grism.
        disperser: F2Disperser,
        /// Blocking filter.
        filter: String,
        /// Focal plane unit (slit) name.
        fpu: String,
        /// Detector read mode.
        read_mode: F2ReadMode,
        /// Exposure time for this step.
        exposure_time: TimeSpan,
    },
}

impl InstrumentConfig {
    /// The exposure time carried by this configuration.
    pub fn exposure_time(&self) -> TimeSpan {
        match self {
            Self::GmosLongSlit { exposure_time, .. }
            | Self::GmosImaging { exposure_time, .. }
            | Self::Flamingos2LongSlit { exposure_time, .. } => *exposure_time,
        }
    }
}

/// A photometric band used to characterize a target's brightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Band {
    /// U band.
    U,
    /// B band.
    B,
    /// V band.
    V,
    /// R band.
    R,
    /// I band.
    I,
    /// J band.
    J,
    /// H band.
    H,
    /// K band.
    K,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observe_class_charge_class_mapping() {
        assert_eq!(ObserveClass::Science.charge_class(), ChargeClass::Program);
        assert_eq!(ObserveClass::PartnerCal.charge_class(), ChargeClass::Partner);
        assert_eq!(ObserveClass::Acquisition.charge_class(), ChargeClass::NonCharged);
    }

    #[test]
    fn least_specific_prefers_science() {
        let classes = [ObserveClass::NightCal, ObserveClass::Science, ObserveClass::DayCal];
        assert_eq!(ObserveClass::least_specific(classes), Some(ObserveClass::Science));
    }

    #[test]
    fn least_specific_falls_back_to_first_calibration() {
        let classes = [ObserveClass::NightCal, ObserveClass::DayCal];
        assert_eq!(ObserveClass::least_specific(classes), Some(ObserveClass::NightCal));
    }

    #[test]
    fn empty_atom_is_rejected() {
        let result = Atom::<()>::new(SequenceType::Science, vec![], "empty");
        assert_eq!(result, Err(EmptyAtomError));
    }

    #[test]
    fn step_fingerprint_ignores_id() {
        let step_a = Step {
            id: StepId::new(),
            instrument_config: "gmos-n".to_string(),
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset::ZERO,
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        };
        let mut step_b = step_a.clone();
        step_b.id = StepId::new();
        assert_ne!(step_a.id, step_b.id);
        assert_eq!(step_a.fingerprint(), step_b.fingerprint());
    }

    #[test]
    fn step_fingerprint_differs_on_offset() {
        let mut step = Step {
            id: StepId::new(),
            instrument_config: "gmos-n".to_string(),
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset::ZERO,
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        };
        let fp_a = step.fingerprint();
        step.telescope_config.offset = Offset::new(0.0, 5.0);
        assert_ne!(fp_a, step.fingerprint());
    }

    #[test]
    fn time_span_arithmetic() {
        let a = TimeSpan::from_seconds(1.5);
        let b = a.times(3);
        assert_eq!(b.as_seconds(), 4.5);
    }
}
