//! GMOS imaging (§4.4 "GMOS imaging").

use crate::acquisition::build_acquisition_atom;
use crate::defaults::PRE_IMAGING_EXPOSURE_SECONDS;
use crate::streams::OnceAtomStream;
use odb_core::{
    AtomStream, ConcreteAtom, ConcreteStep, GenError, GenParams, Guiding, InstrumentConfig,
    InstrumentMode, InstrumentModeKind, Offset, ObserveClass, SequenceType, Site, StaticConfig,
    Step, StepConfig, StepId, TelescopeConfig, TimeSpan,
};
use odb_itc::ItcClient;
use std::sync::Arc;

/// GMOS (north or south) imaging.
pub struct GmosImaging {
    itc: Arc<ItcClient>,
}

impl GmosImaging {
    /// Construct a GMOS imaging instrument mode backed by `itc`.
    pub fn new(itc: Arc<ItcClient>) -> Self {
        Self { itc }
    }

    fn mode_fields(params: &GenParams) -> Result<(Site, Vec<String>, bool, bool), GenError> {
        match &params.mode {
            InstrumentModeKind::GmosImaging {
                site,
                filters,
                pre_imaging,
                interleave_filters,
            } => Ok((*site, filters.clone(), *pre_imaging, *interleave_filters)),
            _ => Err(GenError::MissingMode),
        }
    }
}

impl InstrumentMode for GmosImaging {
    fn static_config(&self, params: &GenParams) -> StaticConfig {
        let site = Self::mode_fields(params).map(|f| f.0).unwrap_or(Site::North);
        StaticConfig {
            stage_mode: "fixed".to_string(),
            detector: match site {
                Site::North => "GMOS-N".to_string(),
                Site::South => "GMOS-S".to_string(),
            },
            nod_and_shuffle: false,
        }
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_acquisition(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (site, filters, ..) = Self::mode_fields(params)?;
        let first_filter = filters.into_iter().next().unwrap_or_else(|| "acq".to_string());
        let mut acq_params = params.clone();
        acq_params.mode = InstrumentModeKind::GmosImaging {
            site,
            filters: vec![first_filter.clone()],
            pre_imaging: false,
            interleave_filters: false,
        };
        let acq_result = self.itc.integration_time(&acq_params, true)?;
        let atom = build_acquisition_atom(acq_result, move |time| InstrumentConfig::GmosImaging {
            site,
            filter: first_filter.clone(),
            exposure_time: time,
        })
        .expect("acquisition atom always has three steps");
        Ok(Box::new(OnceAtomStream::new(atom)))
    }

    #[tracing::instrument(skip(self, params))]
    fn proto_science(&self, params: &GenParams) -> Result<Box<dyn AtomStream>, GenError> {
        let (site, filters, pre_imaging, interleave_filters) = Self::mode_fields(params)?;
        if filters.is_empty() {
            return Err(GenError::InvalidExposureTimeMode);
        }
        let exposure = self.itc.integration_time(params, true)?;
        let total_exposures = exposure.exposure_count.max(1);
        Ok(Box::new(GmosImagingStream {
            site,
            filters,
            interleave_filters,
            exposure_time: exposure.exposure_time,
            total_exposures,
            pre_imaging_pending: pre_imaging,
            next_cycle: 0,
            filter_index: 0,
            emitted_in_filter: 0,
        }))
    }

    fn digest_offsets(&self, _params: &GenParams) -> Vec<Offset> {
        vec![Offset::ZERO]
    }

    fn validate(&self, params: &GenParams) -> Result<(), GenError> {
        let (_, filters, ..) = Self::mode_fields(params)?;
        if filters.is_empty() {
            return Err(GenError::InvalidExposureTimeMode);
        }
        Ok(())
    }
}

struct GmosImagingStream {
    site: Site,
    filters: Vec<String>,
    interleave_filters: bool,
    exposure_time: TimeSpan,
    total_exposures: u32,
    pre_imaging_pending: bool,
    next_cycle: u32,
    filter_index: usize,
    emitted_in_filter: u32,
}

impl GmosImagingStream {
    fn science_step(&self, filter: String, exposure_time: TimeSpan) -> ConcreteStep {
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::GmosImaging {
                site: self.site,
                filter,
                exposure_time,
            },
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset::ZERO,
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        }
    }
}

impl AtomStream for GmosImagingStream {
    fn next_atom(&mut self) -> Option<ConcreteAtom> {
        if self.pre_imaging_pending {
            self.pre_imaging_pending = false;
            let first = self.filters[0].clone();
            let mut step =
                self.science_step(first, TimeSpan::from_seconds(PRE_IMAGING_EXPOSURE_SECONDS));
            step.observe_class = ObserveClass::Acquisition;
            return Some(
                odb_core::Atom::new(SequenceType::Science, vec![step], "pre-imaging pass").unwrap(),
            );
        }

        if self.interleave_filters {
            if self.next_cycle >= self.total_exposures {
                return None;
            }
            let cycle = self.next_cycle;
            self.next_cycle += 1;
            let steps: Vec<ConcreteStep> = self
                .filters
                .iter()
                .map(|f| self.science_step(f.clone(), self.exposure_time))
                .collect();
            return Some(
                odb_core::Atom::new(SequenceType::Science, steps, format!("interleaved cycle {cycle}"))
                    .expect("at least one filter is always configured"),
            );
        }

        loop {
            if self.filter_index >= self.filters.len() {
                return None;
            }
            if self.emitted_in_filter >= self.total_exposures {
                self.filter_index += 1;
                self.emitted_in_filter = 0;
                continue;
            }
            let filter = self.filters[self.filter_index].clone();
            let exposure_ordinal = self.emitted_in_filter;
            self.emitted_in_filter += 1;
            let step = self.science_step(filter.clone(), self.exposure_time);
            return Some(
                odb_core::Atom::new(
                    SequenceType::Science,
                    vec![step],
                    format!("{filter} exposure {exposure_ordinal}"),
                )
                .unwrap(),
            );
        }
    }
}
