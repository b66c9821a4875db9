//! Test fixtures and mock collaborators for ODB sequence generator
//! development.
//!
//! Provides mock implementations of the generator's boundary traits
//! ([`odb_core::ObservationSource`] via [`FixtureObservationSource`],
//! `odb_obscalc::ExecutionSource`/`odb_obscalc::WorkflowSource` via
//! [`RecordedHistory`]) and ITC backend stand-ins
//! ([`fixtures::ConstantItcBackend`], [`fixtures::FailingItcBackend`]) for
//! constructing test scenarios without a real persistence layer.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Mutex;

use odb_core::{
    AcquisitionOverrides, Constraints, ExposureTimeMode, GenParams, InstrumentModeKind,
    ObservationId, ObservationSource, Offset, ProgramId, RawAsterismEntry,
};
use odb_sequence::ExecutionEvent;

/// One staged observation's full configuration, built from a [`GenParams`]
/// and an authorization flag — everything [`FixtureObservationSource`]
/// needs to answer every [`ObservationSource`] method.
#[derive(Clone, Debug)]
pub struct ObservationFixture {
    /// Whether [`ObservationSource::is_authorized`] should report `true`.
    pub authorized: bool,
    /// The resolved parameters to serve for every other accessor. `None`
    /// models an observation that does not exist (every accessor reports
    /// absence).
    pub params: Option<GenParams>,
}

impl ObservationFixture {
    /// An authorized, fully configured observation.
    pub fn configured(params: GenParams) -> Self {
        Self { authorized: true, params: Some(params) }
    }

    /// An observation the caller is not authorized to generate.
    pub fn unauthorized() -> Self {
        Self { authorized: false, params: None }
    }

    /// An authorized observation that does not exist in persistence.
    pub fn missing() -> Self {
        Self { authorized: true, params: None }
    }
}

/// An in-memory [`ObservationSource`] backed by staged [`ObservationFixture`]s.
///
/// Build one with [`Self::new`], stage observations with [`Self::stage`],
/// then pass `&source` anywhere an `ObservationSource` is expected.
#[derive(Default)]
pub struct FixtureObservationSource {
    rows: Mutex<HashMap<ObservationId, ObservationFixture>>,
}

impl FixtureObservationSource {
    /// An empty source with nothing staged (every observation id reports
    /// unauthorized).
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage `fixture` for `observation_id`, replacing any prior staging.
    pub fn stage(&self, observation_id: ObservationId, fixture: ObservationFixture) {
        self.rows.lock().unwrap().insert(observation_id, fixture);
    }

    fn params(&self, observation_id: ObservationId) -> Option<GenParams> {
        self.rows.lock().unwrap().get(&observation_id).and_then(|f| f.params.clone())
    }
}

impl ObservationSource for FixtureObservationSource {
    fn is_authorized(&self, observation_id: ObservationId) -> bool {
        self.rows.lock().unwrap().get(&observation_id).map(|f| f.authorized).unwrap_or(false)
    }

    fn program_id(&self, observation_id: ObservationId) -> Option<ProgramId> {
        self.params(observation_id).map(|p| p.program_id)
    }

    fn instrument_mode(&self, observation_id: ObservationId) -> Option<InstrumentModeKind> {
        self.params(observation_id).map(|p| p.mode)
    }

    fn asterism(&self, observation_id: ObservationId) -> Vec<RawAsterismEntry> {
        self.params(observation_id)
            .map(|p| p.asterism.into_iter().map(|target| RawAsterismEntry { target: Some(target) }).collect())
            .unwrap_or_default()
    }

    fn constraints(&self, observation_id: ObservationId) -> Option<Constraints> {
        self.params(observation_id).map(|p| p.constraints)
    }

    fn exposure_time_mode(&self, observation_id: ObservationId) -> Option<ExposureTimeMode> {
        self.params(observation_id).map(|p| p.exposure_time_mode)
    }

    fn explicit_spatial_offsets(&self, observation_id: ObservationId) -> Option<Vec<Offset>> {
        self.params(observation_id).and_then(|p| p.explicit_spatial_offsets)
    }

    fn explicit_wavelength_dithers(&self, observation_id: ObservationId) -> Option<Vec<f64>> {
        self.params(observation_id).and_then(|p| p.explicit_wavelength_dithers)
    }

    fn acquisition_overrides(&self, observation_id: ObservationId) -> AcquisitionOverrides {
        self.params(observation_id).map(|p| p.acquisition_overrides).unwrap_or_default()
    }
}

/// Per-observation record tracked by [`RecordedHistory`]: everything the
/// (out-of-scope) execution history and workflow/proposal boundaries
/// would report for one observation.
#[derive(Clone, Debug, Default)]
pub struct HistoryRecord {
    /// Atoms previously handed out by a prior generation run, in
    /// execution order.
    pub executed_atoms: Vec<odb_core::ConcreteAtom>,
    /// The inbound execution event stream, in received order.
    pub events: Vec<ExecutionEvent>,
    /// Whether the observation's proposal has been accepted.
    pub proposal_accepted: bool,
    /// Whether the user has explicitly marked the observation `Inactive`.
    pub user_marked_inactive: bool,
    /// Whether the user has explicitly promoted the observation to `Ready`.
    pub user_promoted_ready: bool,
}

/// A single mutable fixture implementing both
/// `odb_obscalc::ExecutionSource` and `odb_obscalc::WorkflowSource`, built
/// from staged [`HistoryRecord`]s.
///
/// Kept in this crate (rather than `odb-obscalc` itself) so both
/// `odb-obscalc` and any other crate's tests can share one fixture type
/// without introducing a dev-dependency cycle.
#[derive(Default)]
pub struct RecordedHistory {
    rows: Mutex<HashMap<ObservationId, HistoryRecord>>,
}

impl RecordedHistory {
    /// A history with nothing recorded for any observation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full record for `observation_id`.
    pub fn record(&self, observation_id: ObservationId, record: HistoryRecord) {
        self.rows.lock().unwrap().insert(observation_id, record);
    }

    /// Append one event to `observation_id`'s stream, creating an empty
    /// record first if none exists.
    pub fn push_event(&self, observation_id: ObservationId, event: ExecutionEvent) {
        self.rows.lock().unwrap().entry(observation_id).or_default().events.push(event);
    }

    fn with_row<T>(&self, observation_id: ObservationId, f: impl FnOnce(&HistoryRecord) -> T, default: T) -> T {
        self.rows.lock().unwrap().get(&observation_id).map(f).unwrap_or(default)
    }
}

impl odb_obscalc::ExecutionSource for RecordedHistory {
    fn executed_atoms(&self, observation_id: ObservationId) -> Vec<odb_core::ConcreteAtom> {
        self.with_row(observation_id, |r| r.executed_atoms.clone(), Vec::new())
    }

    fn events(&self, observation_id: ObservationId) -> Vec<ExecutionEvent> {
        self.with_row(observation_id, |r| r.events.clone(), Vec::new())
    }
}

impl odb_obscalc::WorkflowSource for RecordedHistory {
    fn proposal_accepted(&self, observation_id: ObservationId) -> bool {
        self.with_row(observation_id, |r| r.proposal_accepted, false)
    }

    fn user_marked_inactive(&self, observation_id: ObservationId) -> bool {
        self.with_row(observation_id, |r| r.user_marked_inactive, false)
    }

    fn user_promoted_ready(&self, observation_id: ObservationId) -> bool {
        self.with_row(observation_id, |r| r.user_promoted_ready, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odb_core::{
        Band, Extinction, Percentile, Site, SourceProfile, TargetId,
    };

    fn sample_params() -> GenParams {
        GenParams {
            observation_id: ObservationId(1),
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
            exposure_time_mode: ExposureTimeMode::TimeAndCount {
                time: odb_core::TimeSpan::from_seconds(60.0),
                count: 2,
            },
            explicit_spatial_offsets: None,
            explicit_wavelength_dithers: None,
            acquisition_overrides: AcquisitionOverrides::default(),
        }
    }

    #[test]
    fn unstaged_observation_is_unauthorized() {
        let source = FixtureObservationSource::new();
        assert!(!source.is_authorized(ObservationId(1)));
    }

    #[test]
    fn staged_observation_resolves_its_fields() {
        let source = FixtureObservationSource::new();
        source.stage(ObservationId(1), ObservationFixture::configured(sample_params()));
        assert!(source.is_authorized(ObservationId(1)));
        assert_eq!(source.program_id(ObservationId(1)), Some(ProgramId(1)));
        assert!(source.instrument_mode(ObservationId(1)).is_some());
    }

    #[test]
    fn authorized_but_missing_observation_reports_no_program() {
        let source = FixtureObservationSource::new();
        source.stage(ObservationId(2), ObservationFixture::missing());
        assert!(source.is_authorized(ObservationId(2)));
        assert_eq!(source.program_id(ObservationId(2)), None);
    }

    #[test]
    fn recorded_history_defaults_to_empty() {
        let history = RecordedHistory::new();
        assert!(odb_obscalc::ExecutionSource::executed_atoms(&history, ObservationId(1)).is_empty());
        assert!(!odb_obscalc::WorkflowSource::proposal_accepted(&history, ObservationId(1)));
    }

    #[test]
    fn recorded_history_reports_staged_flags() {
        let history = RecordedHistory::new();
        history.record(
            ObservationId(1),
            HistoryRecord { proposal_accepted: true, ..HistoryRecord::default() },
        );
        assert!(odb_obscalc::WorkflowSource::proposal_accepted(&history, ObservationId(1)));
        assert!(!odb_obscalc::WorkflowSource::user_marked_inactive(&history, ObservationId(1)));
    }
}
