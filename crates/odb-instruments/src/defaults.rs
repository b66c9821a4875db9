//! Per-instrument default tables consulted by the protosequence generator
//! when the observation does not supply an explicit override (§4.4).

use odb_core::{F2Disperser, GmosGrating, Offset};

/// Default wavelength dither list `D`, in nanometers relative to the
/// central wavelength, keyed by grating. Coarser gratings get larger
/// dithers so the dispersed spectrum still covers chip gaps at every
/// step.
pub fn wavelength_dithers_nm(grating: GmosGrating) -> &'static [f64] {
    match grating {
        GmosGrating::B1200 => &[0.0, 2.0],
        GmosGrating::R831 => &[0.0, 5.0, -5.0],
        GmosGrating::B600 => &[0.0, 3.0],
        GmosGrating::R400 => &[0.0, 10.0],
        GmosGrating::R150 => &[0.0, 15.0],
    }
}

/// Default spatial offset list `Q` for GMOS long-slit: a two-point
/// along-slit nod used to keep the object off bad pixels/cosmic rays
/// between cycles.
pub fn gmos_spatial_offsets() -> &'static [Offset] {
    const Q: [Offset; 2] = [Offset { p: 0.0, q: 0.0 }, Offset { p: 0.0, q: 1.5 }];
    &Q
}

/// The along-slit nod magnitude (arcsec) used by the Flamingos-2 ABBA
/// pattern, independent of disperser (§4.4 "four science steps at q, -q,
/// -q, q").
pub fn f2_nod_arcsec(_disperser: F2Disperser) -> f64 {
    3.0
}

/// Default calibration-unit exposure times, in seconds, shared by every
/// instrument family: an arc is brief (a handful of emission lines are
/// enough to solve the wavelength fit); a flat integrates longer for good
/// continuum signal.
pub const ARC_EXPOSURE_SECONDS: f64 = 20.0;
/// See [`ARC_EXPOSURE_SECONDS`].
pub const FLAT_EXPOSURE_SECONDS: f64 = 10.0;

/// Baseline exposure time (seconds) used for a GMOS imaging pre-imaging
/// pass, independent of the science filters' ITC-derived exposure time.
pub const PRE_IMAGING_EXPOSURE_SECONDS: f64 = 30.0;

/// Upper bound on the exposure time (seconds) used for the fine-image and
/// slit-image acquisition steps when the coarse-image ITC result flagged
/// the source as saturating the detector (§4.4 "the remaining two use the
/// scaled baseline").
pub const SCALED_ACQUISITION_EXPOSURE_SECONDS: f64 = 5.0;
