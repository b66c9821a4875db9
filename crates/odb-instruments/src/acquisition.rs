//! The acquisition sub-sequence, shared by every instrument family
//! (§4.4 "Acquisition sub-sequence").
//!
//! Three steps: a coarse field image, a fine field image, and a
//! through-slit image, all at `p,q = 0`. The coarse step's exposure time
//! is the acquisition ITC result verbatim, even when the ITC flags the
//! source as saturating the detector; the remaining two steps use a
//! scaled-down baseline in that case.

use crate::defaults::SCALED_ACQUISITION_EXPOSURE_SECONDS;
use odb_core::{
    Atom, EmptyAtomError, Guiding, IntegrationTime, ObserveClass, Offset, SequenceType, Step,
    StepConfig, TelescopeConfig, TimeSpan,
};

/// Build the three-step acquisition atom, given the acquisition ITC
/// result and a way to build this instrument's configuration for a given
/// exposure time.
pub fn build_acquisition_atom<C>(
    acq_result: IntegrationTime,
    config_for: impl Fn(TimeSpan) -> C,
) -> Result<Atom<C>, EmptyAtomError> {
    let coarse_time = acq_result.exposure_time;
    let baseline = if acq_result.source_too_bright {
        acq_result
            .exposure_time
            .min(TimeSpan::from_seconds(SCALED_ACQUISITION_EXPOSURE_SECONDS))
    } else {
        acq_result.exposure_time
    };

    let step = |time: TimeSpan, guiding: Guiding| Step {
        id: odb_core::StepId::new(),
        instrument_config: config_for(time),
        step_config: StepConfig::Science,
        telescope_config: TelescopeConfig {
            offset: Offset::ZERO,
            guiding,
        },
        observe_class: ObserveClass::Acquisition,
        breakpoint: false,
    };

    Atom::new(
        SequenceType::Acquisition,
        vec![
            step(coarse_time, Guiding::Disabled),
            step(baseline, Guiding::Disabled),
            step(baseline, Guiding::Enabled),
        ],
        "acquisition: coarse, fine, slit",
    )
}
