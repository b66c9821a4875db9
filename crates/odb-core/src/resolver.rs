//! The params resolver (C1, §4.1): gathers one observation's generator
//! inputs into a fully validated [`GenParams`].

use crate::domain::AsterismMember;
use crate::error::GenError;
use crate::genparams::{Constraints, GenParams, Percentile};
use crate::id::ObservationId;
use crate::physics::Extinction;
use crate::traits::ObservationSource;

/// Resolve `observation_id` into a fully validated [`GenParams`].
///
/// Pure with respect to `source` (no mutation of source tables, §4.1
/// "Contract"). Fails fast with the first applicable [`GenError`]:
/// authorization, then mode, then asterism/SED, then exposure mode.
#[tracing::instrument(skip(source))]
pub fn resolve(
    source: &dyn ObservationSource,
    observation_id: ObservationId,
) -> Result<GenParams, GenError> {
    if !source.is_authorized(observation_id) {
        return Err(GenError::NotAuthorized);
    }

    let program_id = source
        .program_id(observation_id)
        .ok_or(GenError::MissingTarget)?;

    let mode = source
        .instrument_mode(observation_id)
        .ok_or(GenError::MissingMode)?;

    let asterism = resolve_asterism(source, observation_id)?;

    let exposure_time_mode = source
        .exposure_time_mode(observation_id)
        .ok_or(GenError::InvalidExposureTimeMode)?;

    let constraints = source.constraints(observation_id).unwrap_or(Constraints {
        image_quality: Percentile::Any,
        cloud_extinction: Extinction::from_millimags(0).expect("0 is in range"),
        sky_background: Percentile::Any,
        water_vapor: Percentile::Any,
    });

    Ok(GenParams {
        observation_id,
        program_id,
        mode,
        asterism,
        constraints,
        exposure_time_mode,
        explicit_spatial_offsets: source.explicit_spatial_offsets(observation_id),
        explicit_wavelength_dithers: source.explicit_wavelength_dithers(observation_id),
        acquisition_overrides: source.acquisition_overrides(observation_id),
    })
}

/// Resolve the asterism, dropping deleted-target placeholders (§8
/// scenario E) and failing if none remain (§8 scenario F) or any
/// remaining target lacks an SED (§4.1).
fn resolve_asterism(
    source: &dyn ObservationSource,
    observation_id: ObservationId,
) -> Result<Vec<AsterismMember>, GenError> {
    let raw = source.asterism(observation_id);
    let present: Vec<AsterismMember> = raw.into_iter().filter_map(|entry| entry.target).collect();

    if present.is_empty() {
        return Err(GenError::MissingTarget);
    }

    for member in &present {
        if !member.has_sed {
            return Err(GenError::MissingSed(member.target_id));
        }
    }

    Ok(present)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Band, SourceProfile};
    use crate::genparams::{ExposureTimeMode, InstrumentModeKind};
    use crate::id::{ProgramId, TargetId};
    use crate::traits::RawAsterismEntry;

    struct Fixture {
        authorized: bool,
        program_id: Option<ProgramId>,
        mode: Option<InstrumentModeKind>,
        asterism: Vec<RawAsterismEntry>,
        exposure_time_mode: Option<ExposureTimeMode>,
    }

    impl ObservationSource for Fixture {
        fn is_authorized(&self, _: ObservationId) -> bool {
            self.authorized
        }
        fn program_id(&self, _: ObservationId) -> Option<ProgramId> {
            self.program_id
        }
        fn instrument_mode(&self, _: ObservationId) -> Option<InstrumentModeKind> {
            self.mode.clone()
        }
        fn asterism(&self, _: ObservationId) -> Vec<RawAsterismEntry> {
            self.asterism.clone()
        }
        fn constraints(&self, _: ObservationId) -> Option<Constraints> {
            None
        }
        fn exposure_time_mode(&self, _: ObservationId) -> Option<ExposureTimeMode> {
            self.exposure_time_mode
        }
        fn explicit_spatial_offsets(&self, _: ObservationId) -> Option<Vec<crate::domain::Offset>> {
            None
        }
        fn explicit_wavelength_dithers(&self, _: ObservationId) -> Option<Vec<f64>> {
            None
        }
        fn acquisition_overrides(&self, _: ObservationId) -> crate::genparams::AcquisitionOverrides {
            Default::default()
        }
    }

    fn member(id: u64, has_sed: bool) -> RawAsterismEntry {
        RawAsterismEntry {
            target: Some(AsterismMember {
                target_id: TargetId(id),
                profile: SourceProfile::Point,
                band: Band::V,
                has_sed,
            }),
        }
    }

    fn deleted() -> RawAsterismEntry {
        RawAsterismEntry { target: None }
    }

    fn f2_mode() -> InstrumentModeKind {
        InstrumentModeKind::Flamingos2LongSlit {
            disperser: crate::domain::F2Disperser::R1200JH,
            filter: "JH".into(),
            fpu: "2pix".into(),
            slit_length_arcsec: 180.0,
        }
    }

    fn base_fixture() -> Fixture {
        Fixture {
            authorized: true,
            program_id: Some(ProgramId(1)),
            mode: Some(f2_mode()),
            asterism: vec![member(1, true)],
            exposure_time_mode: Some(ExposureTimeMode::TimeAndCount {
                time: crate::domain::TimeSpan::from_seconds(60.0),
                count: 1,
            }),
        }
    }

    #[test]
    fn resolve_succeeds_on_complete_input() {
        let fx = base_fixture();
        assert!(resolve(&fx, ObservationId(1)).is_ok());
    }

    #[test]
    fn resolve_rejects_unauthorized() {
        let mut fx = base_fixture();
        fx.authorized = false;
        assert_eq!(resolve(&fx, ObservationId(1)), Err(GenError::NotAuthorized));
    }

    #[test]
    fn resolve_rejects_missing_mode() {
        let mut fx = base_fixture();
        fx.mode = None;
        assert_eq!(resolve(&fx, ObservationId(1)), Err(GenError::MissingMode));
    }

    #[test]
    fn resolve_empty_asterism_fails() {
        let mut fx = base_fixture();
        fx.asterism = vec![deleted()];
        assert_eq!(resolve(&fx, ObservationId(1)), Err(GenError::MissingTarget));
    }

    #[test]
    fn resolve_two_targets_one_deleted_uses_remaining() {
        let mut fx = base_fixture();
        fx.asterism = vec![member(1, true), deleted()];
        let params = resolve(&fx, ObservationId(1)).unwrap();
        assert_eq!(params.asterism.len(), 1);
    }

    #[test]
    fn resolve_missing_sed_short_circuits() {
        let mut fx = base_fixture();
        fx.asterism = vec![member(1, false)];
        assert_eq!(
            resolve(&fx, ObservationId(1)),
            Err(GenError::MissingSed(TargetId(1)))
        );
    }

    #[test]
    fn resolve_missing_exposure_mode_fails() {
        let mut fx = base_fixture();
        fx.exposure_time_mode = None;
        assert_eq!(
            resolve(&fx, ObservationId(1)),
            Err(GenError::InvalidExposureTimeMode)
        );
    }
}
