//! Benchmark profiles for the ODB observation sequence generator.
//!
//! Provides pre-built [`GenParams`] profiles for each in-scope instrument
//! family, parameterized by exposure count so benchmarks can scale the
//! size of the protosequence they pull from:
//!
//! - [`gmos_imaging_profile`]: GMOS imaging, `n` exposures
//! - [`gmos_long_slit_profile`]: GMOS long-slit, `n` exposures
//! - [`flamingos2_long_slit_profile`]: Flamingos-2 long-slit, `n` exposures

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use odb_core::{
    AcquisitionOverrides, AsterismMember, Band, Constraints, Extinction, ExposureTimeMode,
    F2Disperser, GenParams, GmosGrating, InstrumentModeKind, ObservationId, Percentile,
    ProgramId, Site, SourceProfile, TargetId, TimeSpan,
};

fn base_params(observation_id: ObservationId, mode: InstrumentModeKind, exposure_count: u32) -> GenParams {
    GenParams {
        observation_id,
        program_id: ProgramId(1),
        mode,
        asterism: vec![AsterismMember {
            target_id: TargetId(1),
            profile: SourceProfile::Point,
            band: Band::V,
            has_sed: true,
        }],
        constraints: Constraints {
            image_quality: Percentile::P70,
            cloud_extinction: Extinction::from_millimags(0).unwrap(),
            sky_background: Percentile::Any,
            water_vapor: Percentile::Any,
        },
        exposure_time_mode: ExposureTimeMode::TimeAndCount { time: TimeSpan::from_seconds(60.0), count: exposure_count },
        explicit_spatial_offsets: None,
        explicit_wavelength_dithers: None,
        acquisition_overrides: AcquisitionOverrides::default(),
    }
}

/// A GMOS imaging observation requesting `exposure_count` exposures.
pub fn gmos_imaging_profile(observation_id: ObservationId, exposure_count: u32) -> GenParams {
    base_params(
        observation_id,
        InstrumentModeKind::GmosImaging {
            site: Site::North,
            filters: vec!["g".to_string(), "r".to_string()],
            pre_imaging: false,
            interleave_filters: true,
        },
        exposure_count,
    )
}

/// A GMOS long-slit observation requesting `exposure_count` exposures.
pub fn gmos_long_slit_profile(observation_id: ObservationId, exposure_count: u32) -> GenParams {
    base_params(
        observation_id,
        InstrumentModeKind::GmosLongSlit {
            site: Site::North,
            grating: GmosGrating::B600,
            filter: None,
            fpu: "longslit_1".to_string(),
            central_wavelength_nm: 500.0,
        },
        exposure_count,
    )
}

/// A Flamingos-2 long-slit observation requesting `exposure_count` exposures.
pub fn flamingos2_long_slit_profile(observation_id: ObservationId, exposure_count: u32) -> GenParams {
    base_params(
        observation_id,
        InstrumentModeKind::Flamingos2LongSlit {
            disperser: F2Disperser::R1200JH,
            filter: "JH".to_string(),
            fpu: "2pix".to_string(),
            slit_length_arcsec: 180.0,
        },
        exposure_count,
    )
}
