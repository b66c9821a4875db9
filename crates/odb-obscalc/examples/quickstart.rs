//! Minimal end-to-end run: stage one observation, queue an invalidation,
//! and drive the engine through a single synchronous round.

use std::sync::Arc;

use odb_core::{
    AcquisitionOverrides, Band, Constraints, Extinction, ExposureTimeMode, GenParams,
    InstrumentModeKind, ObservationId, Percentile, ProgramId, Site, SourceProfile, TargetId,
    TimeSpan,
};
use odb_itc::{ItcClient, ItcClientConfig};
use odb_obscalc::{default_smart_gcal, Invalidation, InvalidationCause, ObscalcConfig, ObscalcContext, ObscalcEngine};
use odb_test_utils::fixtures::ConstantItcBackend;
use odb_test_utils::{FixtureObservationSource, ObservationFixture, RecordedHistory};

fn main() {
    tracing_subscriber::fmt::init();

    let observation_id = ObservationId(1);
    let observations = Arc::new(FixtureObservationSource::new());
    observations.stage(
        observation_id,
        ObservationFixture::configured(GenParams {
            observation_id,
            program_id: ProgramId(1),
            mode: InstrumentModeKind::GmosImaging {
                site: Site::North,
                filters: vec!["g".to_string()],
                pre_imaging: false,
                interleave_filters: false,
            },
            asterism: vec![odb_core::AsterismMember {
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
            exposure_time_mode: ExposureTimeMode::TimeAndCount { time: TimeSpan::from_seconds(60.0), count: 3 },
            explicit_spatial_offsets: None,
            explicit_wavelength_dithers: None,
            acquisition_overrides: AcquisitionOverrides::default(),
        }),
    );
    let history = Arc::new(RecordedHistory::new());

    let context = ObscalcContext {
        observations,
        execution: history.clone(),
        workflow: history,
        itc: Arc::new(ItcClient::init(
            Arc::new(ConstantItcBackend::new(TimeSpan::from_seconds(60.0), 3)),
            ItcClientConfig::default(),
        )),
        smart_gcal: default_smart_gcal(),
        future_limit: 5,
        atom_count_ceiling: 100_000,
    };
    let engine = ObscalcEngine::new(context, ObscalcConfig::default(), 64).expect("valid config");

    engine
        .sender()
        .send(Invalidation { observation_id, cause: InvalidationCause::ObservationEdit, received: odb_time::Timestamp::now() })
        .expect("ingress queue has room");

    let settled = engine.step(10);
    println!("settled {settled} entries");

    let entry = engine.table().get(observation_id).expect("entry was created by invalidate");
    println!("observation {} is now {:?}", observation_id.0, entry.state);
    println!("result: {:#?}", entry.result);
}
