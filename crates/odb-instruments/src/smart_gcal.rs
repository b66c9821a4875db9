//! The smart-gcal lookup boundary.
//!
//! Deciding the exact GCAL lamp/filter/diffuser configuration for a
//! [`odb_core::StepConfig::SmartGcal`] step from a wavelength and
//! instrument configuration is table-driven and out of scope for this
//! crate (§1 Non-goals; domain note on `StepConfig::SmartGcal`). This
//! trait is the seam a caller hooks a real lookup table into; the
//! protosequence generator itself always emits explicit `Gcal` steps
//! (conservatively assuming every cycle needs a fresh arc and flat) and
//! never constructs a `SmartGcal` step on its own.

use odb_core::GcalConfig;

/// A wavelength, in nanometers, to resolve a calibration configuration for.
pub type LookupWavelengthNm = f64;

/// Resolves the GCAL configuration smart-gcal would choose for a given
/// wavelength, if a fresh calibration is needed at all.
pub trait SmartGcalLookup: Send + Sync {
    /// `true` if the wavelength configuration at `wavelength_nm` requires
    /// a fresh arc/flat pair relative to the last one taken.
    fn requires_fresh_calibration(&self, wavelength_nm: LookupWavelengthNm) -> bool;

    /// The arc configuration smart-gcal would select for `wavelength_nm`.
    fn arc_for(&self, wavelength_nm: LookupWavelengthNm) -> GcalConfig;

    /// The flat configuration smart-gcal would select for `wavelength_nm`.
    fn flat_for(&self, wavelength_nm: LookupWavelengthNm) -> GcalConfig;
}

/// A lookup that always reports a fresh calibration is needed, using the
/// instrument-family defaults in [`crate::defaults`]. This is the
/// generator's built-in behavior when no real smart-gcal table is wired
/// up.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysFreshSmartGcal;

impl SmartGcalLookup for AlwaysFreshSmartGcal {
    fn requires_fresh_calibration(&self, _wavelength_nm: LookupWavelengthNm) -> bool {
        true
    }

    fn arc_for(&self, _wavelength_nm: LookupWavelengthNm) -> GcalConfig {
        GcalConfig::arc(odb_core::ArcLamp::CuAr)
    }

    fn flat_for(&self, _wavelength_nm: LookupWavelengthNm) -> GcalConfig {
        GcalConfig::flat(odb_core::FlatLamp::Quartz)
    }
}
