//! ODB: an observation sequence generator and background obscalc engine
//! for the Observatory Database.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all ODB sub-crates. For most users, adding `odb-gen` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! Generate a protosequence for a GMOS long-slit observation and run it
//! once through the obscalc pipeline:
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use odb::obscalc::{default_smart_gcal, pipeline, EmptyHistory, ObscalcContext, RunOutcome};
//! use odb::test_utils::{fixtures::ConstantItcBackend, FixtureObservationSource, ObservationFixture};
//! use odb::types::{
//!     AcquisitionOverrides, AsterismMember, Band, Constraints, Extinction, ExposureTimeMode,
//!     GenParams, GmosGrating, InstrumentModeKind, ObservationId, Percentile, ProgramId, Site,
//!     SourceProfile, TargetId, TimeSpan,
//! };
//! use odb::itc::{ItcClient, ItcClientConfig};
//!
//! let observation_id = ObservationId(1);
//! let params = GenParams {
//!     observation_id,
//!     program_id: ProgramId(1),
//!     mode: InstrumentModeKind::GmosLongSlit {
//!         site: Site::North,
//!         grating: GmosGrating::B600,
//!         filter: None,
//!         fpu: "longslit_1".to_string(),
//!         central_wavelength_nm: 500.0,
//!     },
//!     asterism: vec![AsterismMember {
//!         target_id: TargetId(1),
//!         profile: SourceProfile::Point,
//!         band: Band::V,
//!         has_sed: true,
//!     }],
//!     constraints: Constraints {
//!         image_quality: Percentile::P70,
//!         cloud_extinction: Extinction::from_millimags(0).unwrap(),
//!         sky_background: Percentile::Any,
//!         water_vapor: Percentile::Any,
//!     },
//!     exposure_time_mode: ExposureTimeMode::TimeAndCount { time: TimeSpan::from_seconds(60.0), count: 3 },
//!     explicit_spatial_offsets: None,
//!     explicit_wavelength_dithers: None,
//!     acquisition_overrides: AcquisitionOverrides::default(),
//! };
//!
//! let observations = Arc::new(FixtureObservationSource::new());
//! observations.stage(observation_id, ObservationFixture::configured(params));
//!
//! let context = ObscalcContext {
//!     observations,
//!     execution: Arc::new(EmptyHistory),
//!     workflow: Arc::new(EmptyHistory),
//!     itc: Arc::new(ItcClient::init(
//!         Arc::new(ConstantItcBackend::new(TimeSpan::from_seconds(60.0), 3)),
//!         ItcClientConfig::default(),
//!     )),
//!     smart_gcal: default_smart_gcal(),
//!     future_limit: 5,
//!     atom_count_ceiling: 100_000,
//! };
//!
//! match pipeline::run(&context, observation_id) {
//!     RunOutcome::Settled(result) => println!("{result:?}"),
//!     RunOutcome::Transient(e) => panic!("unexpected transient failure: {e}"),
//! }
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `odb-core` | IDs, `GenParams`, the sequence data model, error tags, capability traits |
//! | [`time`] | `odb-time` | `Timestamp`, `TimestampInterval`, `ContiguousTimestampMap` |
//! | [`itc`] | `odb-itc` | Integration time calculator client and singleflight/LRU cache |
//! | [`static_config`] | `odb-static` | The validated static configuration builder |
//! | [`instruments`] | `odb-instruments` | GMOS long-slit, GMOS imaging, Flamingos-2 long-slit |
//! | [`sequence`] | `odb-sequence` | Execution-event folding and protosequence/history merge |
//! | [`digest`] | `odb-digest` | Time estimation, execution digest, event cursor |
//! | [`workflow`] | `odb-workflow` | Workflow state derivation and transition legality |
//! | [`obscalc`] | `odb-obscalc` | The background calculation engine and worker pool |
//! | [`test_utils`] | `odb-test-utils` | Fixture observation sources and ITC backends, behind the `test-utils` feature |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, errors, and capability traits (`odb-core`).
///
/// Contains identifiers, the sequence data model (`Atom`, `Step`),
/// `GenParams`, error tags, and the fundamental traits
/// ([`types::InstrumentMode`], [`types::ObservationSource`],
/// [`types::AtomStream`]) that every other module dispatches through.
pub use odb_core as types;

/// Timestamp, interval, and contiguous-coverage map primitives (`odb-time`).
pub use odb_time as time;

/// Integration time calculator client and fingerprint cache (`odb-itc`).
///
/// [`itc::ItcClient`] wraps an out-of-scope calculator service behind a
/// cache that coalesces concurrent identical requests and bounds memory
/// with LRU eviction.
pub use odb_itc as itc;

/// The static configuration builder (`odb-static`).
pub use odb_static as static_config;

/// GMOS long-slit, GMOS imaging, and Flamingos-2 long-slit instrument-mode
/// implementations (`odb-instruments`).
///
/// [`instruments::for_mode`] dispatches a resolved `GenParams`' mode to
/// the matching [`types::InstrumentMode`] implementation.
pub use odb_instruments as instruments;

/// Execution-event folding and protosequence/execution-history merge
/// (`odb-sequence`).
pub use odb_sequence as sequence;

/// Time estimation, execution digest computation, and the inbound
/// execution-event cursor (`odb-digest`).
pub use odb_digest as digest;

/// Workflow state derivation and transition legality (`odb-workflow`).
pub use odb_workflow as workflow;

/// The background calculation engine (`odb-obscalc`).
///
/// [`obscalc::ObscalcEngine`] runs a worker pool that claims invalidated
/// observations from a shared entry table and settles each one through
/// the rest of this facade's modules.
pub use odb_obscalc as obscalc;

/// Fixture observation sources and ITC backends for testing (`odb-test-utils`).
#[cfg(feature = "test-utils")]
pub use odb_test_utils as test_utils;

/// Common imports for typical ODB usage.
///
/// ```rust
/// use odb::prelude::*;
/// ```
///
/// This imports the most frequently used types: identifiers, `GenParams`,
/// the capability traits, the sequence data model, and the obscalc
/// engine's context and result types.
pub mod prelude {
    // Identifiers and the sequence data model
    pub use odb_core::{
        AcquisitionOverrides, Atom, AtomId, Constraints, ExposureTimeMode, GenParams,
        InstrumentModeKind, ObservationId, ProgramId, Step, StepId, TimeSpan,
    };

    // Capability traits
    pub use odb_core::{AtomStream, InstrumentMode, ObservationSource};

    // Errors
    pub use odb_core::{ErrorTag, GenError, OdbError};

    // Dispatch
    pub use odb_instruments::for_mode;

    // Integration time calculator
    pub use odb_itc::{ItcBackend, ItcClient, ItcClientConfig};

    // Obscalc engine
    pub use odb_obscalc::{
        EntryState, ObscalcConfig, ObscalcContext, ObscalcEngine, ObscalcResult, RunOutcome,
    };

    // Workflow
    pub use odb_workflow::WorkflowState;
}
