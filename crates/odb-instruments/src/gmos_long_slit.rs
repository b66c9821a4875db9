//! GMOS long-slit spectroscopy (§4.4 "Science sub-sequence (GMOS
//! long-slit)").

use crate::acquisition::build_acquisition_atom;
use crate::defaults::{self, ARC_EXPOSURE_SECONDS, FLAT_EXPOSURE_SECONDS};
use crate::smart_gcal::{AlwaysFreshSmartGcal, SmartGcalLookup};
use crate::streams::OnceAtomStream;
use odb_core::{
    AtomStream, ConcreteAtom, ConcreteStep, GenError, GenParams, GmosGrating, Guiding,
    InstrumentConfig, InstrumentMode, InstrumentModeKind, Offset, ObserveClass, SequenceType,
    Site, StaticConfig, Step, StepConfig, StepId, TelescopeConfig, TimeSpan, WavelengthPm,
};
use odb_itc::ItcClient;
use std::sync::Arc;

/// GMOS (north or south) long-slit spectroscopy.
pub struct GmosLongSlit {
    itc: Arc<ItcClient>,
    smart_gcal: Arc<dyn SmartGcalLookup>,
}

impl GmosLongSlit {
    /// Construct a GMOS long-slit instrument mode backed by `itc`, using
    /// the conservative built-in smart-gcal stand-in (§4.4; see
    /// [`crate::smart_gcal`]).
    pub fn new(itc: Arc<ItcClient>) -> Self {
        Self {
            itc,
            smart_gcal: Arc::new(AlwaysFreshSmartGcal),
        }
    }

    /// As [`Self::new`], but with an explicit smart-gcal lookup.
    pub fn with_smart_gcal(itc: Arc<ItcClient>, smart_gcal: Arc<dyn SmartGcalLookup>) -> Self {
        Self { itc, smart_gcal }
    }

    fn mode_fields(params: &GenParams) -> Result<(Site, GmosGrating, Option<String>, String, f64), GenError> {
        match &params.mode {
            InstrumentModeKind::GmosLongSlit {
                site,
                grating,
                filter,
                fpu,
                central_wavelength_nm,
            } => Ok((*site, *grating, filter.clone(), fpu.clone(), *central_wavelength_nm)),
            _ => Err(GenError::MissingMode),
        }
    }

    /// Wavelength dither list `D`: the observation's explicit override, if
    /// supplied, else the grating's default table (§4.4).
    fn resolved_dithers(params: &GenParams, grating: GmosGrating) -> Vec<f64> {
        params
            .explicit_wavelength_dithers
            .clone()
            .unwrap_or_else(|| defaults::wavelength_dithers_nm(grating).to_vec())
    }

    /// Spatial offset list `Q`: the observation's explicit override, if
    /// supplied, else the instrument's default two-point nod (§4.4).
    fn resolved_offsets(params: &GenParams) -> Vec<Offset> {
        params
            .explicit_spatial_offsets
            .clone()
            .unwrap_or_else(|| defaults::gmos_spatial_offsets().to_vec())
    }
}

impl InstrumentMode for GmosLongSlit {
    fn static_config(&self, params: &GenParams) -> StaticConfig {
        let site = Self::mode_fields(params).map(|fields| fields.0).unwrap_or(Site::North);
        StaticConfig {
            stage_mode: "follow-xyz".to_string(),
            detector: match site {
                Site::North => "GMOS-N".to_string(),
                Site::South => "GMOS-S".to_string(),
            },
            nod_and_shuffle: false,
        }
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_acquisition(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (site, ..) = Self::mode_fields(params)?;
        let mut acq_params = params.clone();
        acq_params.mode = InstrumentModeKind::GmosImaging {
            site,
            filters: vec!["acq".to_string()],
            pre_imaging: false,
            interleave_filters: false,
        };
        let acq_result = self.itc.integration_time(&acq_params, true)?;
        let atom = build_acquisition_atom(acq_result, move |time| InstrumentConfig::GmosImaging {
            site,
            filter: "acq".to_string(),
            exposure_time: time,
        })
        .expect("acquisition atom always has three steps");
        Ok(Box::new(OnceAtomStream::new(atom)))
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_science(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (site, grating, filter, fpu, base_wavelength_nm) = Self::mode_fields(params)?;
        let exposure = self.itc.integration_time(params, true)?;
        // N, the cycle-exposure count (§4.4): the ITC solves for how many
        // science exposures make up one dither cycle. A full sweep through
        // the dither list D is one complete science sequence, so the
        // total exposure count is N times |D|.
        let cycle_size = exposure.exposure_count.max(1);
        let dithers = Self::resolved_dithers(params, grating);
        let offsets = Self::resolved_offsets(params);
        let total_exposures = cycle_size * dithers.len() as u32;
        let total_cycles = (total_exposures + cycle_size - 1) / cycle_size;
        Ok(Box::new(GmosScienceStream {
            site,
            grating,
            filter,
            fpu,
            base_wavelength_nm,
            dithers,
            offsets,
            exposure_time: exposure.exposure_time,
            cycle_size,
            total_exposures,
            total_cycles,
            next_i: 0,
            smart_gcal: self.smart_gcal.clone(),
        }))
    }

    fn digest_offsets(&self, params: &GenParams) -> Vec<Offset> {
        Self::resolved_offsets(params)
    }

    fn validate(&self, params: &GenParams) -> Result<(), GenError> {
        Self::mode_fields(params).map(|_| ())
    }
}

struct GmosScienceStream {
    site: Site,
    grating: GmosGrating,
    filter: Option<String>,
    fpu: String,
    base_wavelength_nm: f64,
    /// Wavelength dither list `D`.
    dithers: Vec<f64>,
    /// Spatial offset list `Q`.
    offsets: Vec<Offset>,
    exposure_time: TimeSpan,
    /// Cycle-exposure count `N`: how many science steps make up one atom.
    cycle_size: u32,
    /// Total science exposures across the whole stream.
    total_exposures: u32,
    /// `⌈totalExposures/N⌉`, the number of cycles this stream emits.
    total_cycles: u32,
    next_i: u32,
    smart_gcal: Arc<dyn SmartGcalLookup>,
}

impl GmosScienceStream {
    fn science_config(&self, central_wavelength_nm: f64) -> InstrumentConfig {
        InstrumentConfig::GmosLongSlit {
            site: self.site,
            grating: self.grating,
            filter: self.filter.clone(),
            fpu: self.fpu.clone(),
            central_wavelength: WavelengthPm::from_nm(central_wavelength_nm),
            exposure_time: self.exposure_time,
        }
    }

    fn calibration_config(&self, central_wavelength_nm: f64, exposure_seconds: f64) -> InstrumentConfig {
        InstrumentConfig::GmosLongSlit {
            site: self.site,
            grating: self.grating,
            filter: self.filter.clone(),
            fpu: self.fpu.clone(),
            central_wavelength: WavelengthPm::from_nm(central_wavelength_nm),
            exposure_time: TimeSpan::from_seconds(exposure_seconds),
        }
    }
}

impl AtomStream for GmosScienceStream {
    fn next_atom(&mut self) -> Option<ConcreteAtom> {
        if self.next_i >= self.total_cycles {
            return None;
        }
        let i = self.next_i;
        self.next_i += 1;

        let k = (i as usize) % self.dithers.len();
        let central_wavelength_nm = self.base_wavelength_nm + self.dithers[k];

        let already_emitted = i * self.cycle_size;
        let n_this_cycle = self
            .total_exposures
            .saturating_sub(already_emitted)
            .min(self.cycle_size)
            .max(1) as usize;

        let mut steps = Vec::with_capacity(2 + n_this_cycle);
        if self.smart_gcal.requires_fresh_calibration(central_wavelength_nm) {
            let arc_cfg = self.smart_gcal.arc_for(central_wavelength_nm);
            let flat_cfg = self.smart_gcal.flat_for(central_wavelength_nm);
            steps.push(Step {
                id: StepId::new(),
                instrument_config: self.calibration_config(central_wavelength_nm, ARC_EXPOSURE_SECONDS),
                step_config: StepConfig::Gcal(arc_cfg),
                telescope_config: TelescopeConfig {
                    offset: Offset::ZERO,
                    guiding: Guiding::Disabled,
                },
                observe_class: ObserveClass::NightCal,
                breakpoint: false,
            });
            steps.push(Step {
                id: StepId::new(),
                instrument_config: self.calibration_config(central_wavelength_nm, FLAT_EXPOSURE_SECONDS),
                step_config: StepConfig::Gcal(flat_cfg),
                telescope_config: TelescopeConfig {
                    offset: Offset::ZERO,
                    guiding: Guiding::Disabled,
                },
                observe_class: ObserveClass::NightCal,
                breakpoint: false,
            });
        }

        for j in 0..n_this_cycle {
            let offset_index = (i as usize + j) % self.offsets.len();
            let offset = self.offsets[offset_index];
            steps.push(Step {
                id: StepId::new(),
                instrument_config: self.science_config(central_wavelength_nm),
                step_config: StepConfig::Science,
                telescope_config: TelescopeConfig {
                    offset,
                    guiding: Guiding::Enabled,
                },
                observe_class: ObserveClass::Science,
                breakpoint: false,
            });
        }

        Some(
            odb_core::Atom::new(
                SequenceType::Science,
                steps,
                format!("cycle {i}, \u{3bb}{central_wavelength_nm:.1}nm, dither {k}"),
            )
            .expect("every cycle emits at least one science step"),
        )
    }
}
