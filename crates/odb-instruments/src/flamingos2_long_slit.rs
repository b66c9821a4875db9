//! Flamingos-2 long-slit spectroscopy (§4.4 "Flamingos-2 long-slit").
//!
//! The ABBA nod pattern replaces GMOS long-slit's dither-and-offset cycle:
//! each cycle nods the target between `+q` and `-q` along the slit,
//! bracketed by an arc and flat when smart-gcal calls for fresh
//! calibration. Flamingos-2 also carries an on-slit requirement that GMOS
//! long-slit does not: a nod whose magnitude reaches half the slit length
//! would walk the source off the slit, so `validate` rejects it up front
//! rather than discovering it mid-generation.

use crate::acquisition::build_acquisition_atom;
use crate::defaults::{f2_nod_arcsec, ARC_EXPOSURE_SECONDS, FLAT_EXPOSURE_SECONDS};
use crate::smart_gcal::{AlwaysFreshSmartGcal, SmartGcalLookup};
use crate::streams::OnceAtomStream;
use odb_core::{
    ArcLamp, AtomStream, ConcreteAtom, ConcreteStep, F2Disperser, F2ReadMode, FlatLamp, GcalConfig,
    GenError, GenParams, Guiding, InstrumentConfig, InstrumentMode, InstrumentModeKind, Offset,
    ObserveClass, SequenceType, Step, StepConfig, StepId, TelescopeConfig, TimeSpan,
};
use odb_itc::ItcClient;
use std::sync::Arc;

/// Flamingos-2 long-slit spectroscopy.
pub struct Flamingos2LongSlit {
    itc: Arc<ItcClient>,
    smart_gcal: Arc<dyn SmartGcalLookup>,
}

impl Flamingos2LongSlit {
    /// Construct a Flamingos-2 long-slit instrument mode backed by `itc`,
    /// using the always-fresh smart-gcal stub.
    pub fn new(itc: Arc<ItcClient>) -> Self {
        Self::with_smart_gcal(itc, Arc::new(AlwaysFreshSmartGcal))
    }

    /// Construct with an explicit smart-gcal lookup.
    pub fn with_smart_gcal(itc: Arc<ItcClient>, smart_gcal: Arc<dyn SmartGcalLookup>) -> Self {
        Self { itc, smart_gcal }
    }

    fn mode_fields(
        params: &GenParams,
    ) -> Result<(F2Disperser, String, String, f64), GenError> {
        match &params.mode {
            InstrumentModeKind::Flamingos2LongSlit {
                disperser,
                filter,
                fpu,
                slit_length_arcsec,
            } => Ok((*disperser, filter.clone(), fpu.clone(), *slit_length_arcsec)),
            _ => Err(GenError::MissingMode),
        }
    }

    fn read_mode(params: &GenParams) -> F2ReadMode {
        params
            .acquisition_overrides
            .explicit_read_mode
            .unwrap_or(F2ReadMode::Medium)
    }
}

impl InstrumentMode for Flamingos2LongSlit {
    fn static_config(&self, _params: &GenParams) -> odb_core::StaticConfig {
        odb_core::StaticConfig {
            stage_mode: "fixed".to_string(),
            detector: "F2".to_string(),
            nod_and_shuffle: false,
        }
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_acquisition(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (disperser, filter, fpu, _) = Self::mode_fields(params)?;
        let acq_result = self.itc.integration_time(params, true)?;
        let read_mode = Self::read_mode(params);
        let atom = build_acquisition_atom(acq_result, move |time| InstrumentConfig::Flamingos2LongSlit {
            disperser,
            filter: filter.clone(),
            fpu: fpu.clone(),
            read_mode,
            exposure_time: time,
        })
        .expect("acquisition atom always has three steps");
        Ok(Box::new(OnceAtomStream::new(atom)))
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_science(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (disperser, filter, fpu, _) = Self::mode_fields(params)?;
        let exposure = self.itc.integration_time(params, true)?;
        let read_mode = Self::read_mode(params);
        let nod = f2_nod_arcsec(disperser);
        Ok(Box::new(F2ScienceStream {
            disperser,
            filter,
            fpu,
            read_mode,
            nod,
            exposure_time: exposure.exposure_time,
            total_exposures: exposure.exposure_count.max(1),
            emitted: 0,
            cycle: 0,
            smart_gcal: self.smart_gcal.clone(),
        }))
    }

    fn digest_offsets(&self, params: &GenParams) -> Vec<Offset> {
        let nod = Self::mode_fields(params)
            .map(|(disperser, ..)| f2_nod_arcsec(disperser))
            .unwrap_or(0.0);
        vec![Offset::new(0.0, nod), Offset::new(0.0, -nod)]
    }

    fn validate(&self, params: &GenParams) -> Result<(), GenError> {
        let (disperser, _, _, slit_length_arcsec) = Self::mode_fields(params)?;
        let half_slit = slit_length_arcsec / 2.0;
        let on_slit = match &params.explicit_spatial_offsets {
            Some(offsets) => offsets.iter().any(|o| o.q.abs() < half_slit),
            None => {
                let nod = f2_nod_arcsec(disperser);
                nod.abs() < half_slit
            }
        };
        if !on_slit {
            return Err(GenError::NotOnSlit);
        }
        Ok(())
    }
}

struct F2ScienceStream {
    disperser: F2Disperser,
    filter: String,
    fpu: String,
    read_mode: F2ReadMode,
    nod: f64,
    exposure_time: TimeSpan,
    total_exposures: u32,
    emitted: u32,
    cycle: u32,
    smart_gcal: Arc<dyn SmartGcalLookup>,
}

impl F2ScienceStream {
    fn science_step(&self, q: f64) -> ConcreteStep {
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::Flamingos2LongSlit {
                disperser: self.disperser,
                filter: self.filter.clone(),
                fpu: self.fpu.clone(),
                read_mode: self.read_mode,
                exposure_time: self.exposure_time,
            },
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset::new(0.0, q),
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        }
    }

    fn calibration_step(&self, arc: bool) -> ConcreteStep {
        let config = if arc {
            GcalConfig::arc(ArcLamp::ThAr)
        } else {
            GcalConfig::flat(FlatLamp::Ir)
        };
        let exposure = if arc {
            ARC_EXPOSURE_SECONDS
        } else {
            FLAT_EXPOSURE_SECONDS
        };
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::Flamingos2LongSlit {
                disperser: self.disperser,
                filter: self.filter.clone(),
                fpu: self.fpu.clone(),
                read_mode: self.read_mode,
                exposure_time: TimeSpan::from_seconds(exposure),
            },
            step_config: StepConfig::Gcal(config),
            telescope_config: TelescopeConfig {
                offset: Offset::ZERO,
                guiding: Guiding::Disabled,
            },
            observe_class: ObserveClass::DayCal,
            breakpoint: false,
        }
    }
}

impl AtomStream for F2ScienceStream {
    fn next_atom(&mut self) -> Option<ConcreteAtom> {
        if self.emitted >= self.total_exposures {
            return None;
        }

        let cycle = self.cycle;
        self.cycle += 1;
        let remaining = self.total_exposures - self.emitted;
        // Flamingos-2 long-slit params carry no central wavelength, so the
        // lookup is queried at a nominal wavelength of zero.
        let bundle_calibration = self.smart_gcal.requires_fresh_calibration(0.0);

        let mut steps = Vec::with_capacity(6);
        if bundle_calibration {
            steps.push(self.calibration_step(true));
        }

        let pattern = [self.nod, -self.nod, -self.nod, self.nod];
        let take = (remaining as usize).min(pattern.len());
        for &q in &pattern[..take] {
            steps.push(self.science_step(q));
        }
        self.emitted += take as u32;

        if bundle_calibration {
            steps.push(self.calibration_step(false));
        }

        Some(
            odb_core::Atom::new(SequenceType::Science, steps, format!("ABBA cycle {cycle}"))
                .expect("cycle always emits at least one science step"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odb_core::{
        AsterismMember, Band, Constraints, Extinction, ExposureTimeMode, ObservationId, Percentile,
        ProgramId, SignalToNoise, SourceProfile, TargetId,
    };
    use odb_itc::{ItcBackend, ItcClientConfig, ItcInput, ItcVersions};

    struct FixedBackend;
    impl ItcBackend for FixedBackend {
        fn spectroscopy(&self, _input: &ItcInput) -> Result<odb_core::IntegrationTime, GenError> {
            Ok(odb_core::IntegrationTime {
                exposure_time: TimeSpan::from_seconds(120.0),
                exposure_count: 6,
                signal_to_noise: Some(odb_core::SnrResult::Achieved(
                    SignalToNoise::from_milli(20_000).unwrap(),
                )),
                source_too_bright: false,
            })
        }
        fn imaging(&self, _input: &ItcInput) -> Result<odb_core::IntegrationTime, GenError> {
            unimplemented!()
        }
        fn spectroscopy_graphs(&self, _input: &ItcInput) -> Result<Vec<f64>, GenError> {
            Ok(vec![])
        }
        fn versions(&self) -> ItcVersions {
            ItcVersions {
                server: "fixed".to_string(),
                data: None,
            }
        }
    }

    fn mode() -> Flamingos2LongSlit {
        let itc = Arc::new(ItcClient::init(Arc::new(FixedBackend), ItcClientConfig::default()));
        Flamingos2LongSlit::new(itc)
    }

    fn params(slit_length_arcsec: f64) -> GenParams {
        GenParams {
            observation_id: ObservationId(1),
            program_id: ProgramId(1),
            mode: InstrumentModeKind::Flamingos2LongSlit {
                disperser: F2Disperser::R1200JH,
                filter: "JH".to_string(),
                fpu: "2pix-slit".to_string(),
                slit_length_arcsec,
            },
            asterism: vec![AsterismMember {
                target_id: TargetId(1),
                profile: SourceProfile::Point,
                band: Band::J,
                has_sed: true,
            }],
            constraints: Constraints {
                image_quality: Percentile::P70,
                cloud_extinction: Extinction::from_millimags(0).unwrap(),
                sky_background: Percentile::Any,
                water_vapor: Percentile::Any,
            },
            exposure_time_mode: ExposureTimeMode::SignalToNoise(
                SignalToNoise::from_milli(20_000).unwrap(),
            ),
            explicit_spatial_offsets: None,
            explicit_wavelength_dithers: None,
            acquisition_overrides: Default::default(),
        }
    }

    #[test]
    fn validate_rejects_a_nod_too_large_for_the_slit() {
        let tiny_slit = params(1.0);
        assert_eq!(mode().validate(&tiny_slit), Err(GenError::NotOnSlit));
    }

    #[test]
    fn validate_accepts_a_comfortable_slit() {
        let roomy_slit = params(60.0);
        assert!(mode().validate(&roomy_slit).is_ok());
    }

    #[test]
    fn validate_rejects_explicit_offsets_all_off_slit() {
        let mut p = params(60.0);
        p.explicit_spatial_offsets = Some(vec![Offset::new(0.0, 40.0), Offset::new(0.0, -40.0)]);
        assert_eq!(mode().validate(&p), Err(GenError::NotOnSlit));
    }

    #[test]
    fn validate_accepts_explicit_offsets_with_one_on_slit() {
        let mut p = params(1.0);
        p.explicit_spatial_offsets = Some(vec![Offset::new(0.0, 10.0), Offset::new(0.0, 0.1)]);
        assert!(mode().validate(&p).is_ok());
    }

    #[test]
    fn science_stream_follows_abba_nod_pattern() {
        let mut stream = mode().proto_science(&params(60.0)).unwrap();
        let atom = stream.next_atom().unwrap();
        let qs: Vec<f64> = atom
            .steps
            .iter()
            .filter(|s| s.step_config == StepConfig::Science)
            .map(|s| s.telescope_config.offset.q)
            .collect();
        let nod = f2_nod_arcsec(F2Disperser::R1200JH);
        assert_eq!(qs, vec![nod, -nod, -nod, nod]);
    }

    #[test]
    fn first_cycle_bundles_arc_and_flat_under_default_smart_gcal() {
        let mut stream = mode().proto_science(&params(60.0)).unwrap();
        let atom = stream.next_atom().unwrap();
        assert!(matches!(
            atom.steps.first().unwrap().step_config,
            StepConfig::Gcal(_)
        ));
        assert!(matches!(
            atom.steps.last().unwrap().step_config,
            StepConfig::Gcal(_)
        ));
    }

    #[test]
    fn science_stream_terminates_at_total_exposures() {
        let mut stream = mode().proto_science(&params(60.0)).unwrap();
        let atoms = stream.take(100);
        let science_steps: usize = atoms
            .iter()
            .flat_map(|a| &a.steps)
            .filter(|s| s.step_config == StepConfig::Science)
            .count();
        assert_eq!(science_steps, 6);
    }

    #[test]
    fn acquisition_is_a_single_atom() {
        let mut stream = mode().proto_acquisition(&params(60.0)).unwrap();
        assert!(stream.next_atom().is_some());
        assert!(stream.next_atom().is_none());
    }

    #[test]
    fn atom_and_step_ids_are_unique_across_the_stream() {
        let mut stream = mode().proto_science(&params(60.0)).unwrap();
        let atoms = stream.take(100);
        let mut atom_ids = std::collections::HashSet::new();
        let mut step_ids = std::collections::HashSet::new();
        for atom in &atoms {
            assert!(atom_ids.insert(atom.id));
            for step in &atom.steps {
                assert!(step_ids.insert(step.id));
            }
        }
    }
}
