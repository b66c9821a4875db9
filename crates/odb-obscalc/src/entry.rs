//! Per-observation lifecycle state (§4.8).

use odb_core::{GenParams, IntegrationTime, ObservationId, OdbError};
use odb_digest::{CategorizedTime, Digest};
use odb_time::Timestamp;
use odb_workflow::WorkflowState;

/// A worker's temporary ownership of an entry while it computes (§5
/// "per-row version check (CAS on `lastUpdate`)").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lease {
    /// The worker holding the lease.
    pub worker_id: u32,
    /// When the lease stops being honored if not renewed. An expired
    /// lease returns its entry to `Pending` (§4.8 "Concurrency").
    pub expires_at: Timestamp,
}

/// The digest half of a successful pipeline run, shared by the
/// [`ObscalcResult::WithTarget`] and [`ObscalcResult::WithoutTarget`]
/// variants (§3 `Obscalc.Result`).
#[derive(Clone, Debug, PartialEq)]
pub struct ObscalcDigest {
    /// The resolved generation parameters (C1).
    pub gen_params: GenParams,
    /// Acquisition-phase digest (C5/C6).
    pub acquisition_digest: Digest,
    /// Science-phase digest (C5/C6).
    pub science_digest: Digest,
    /// Time estimate broken down by charge class (C6).
    pub categorized_time: CategorizedTime,
}

/// What a calculation produced (§3 `Obscalc.Result`, §7 "Propagation
/// policy").
///
/// `WithoutTarget` exists because the result type is a general sum over
/// every observation an obscalc entry can track, including kinds that
/// never carry an asterism at all (calibration-role targets and other
/// non-science observation sources are named as out-of-scope external
/// collaborators). The params resolver treats an *empty* asterism on a
/// target-bearing observation as the hard error `GenError::MissingTarget`,
/// not as "without a target" — so for every observation source this crate
/// actually resolves, a successful run always has a non-empty asterism,
/// always consults the integration-time client (directly from an explicit
/// `TimeAndCount` mode or from the calculator), and always reports
/// `WithTarget::itc`. `WithoutTarget` is kept constructible for a future
/// non-targeted `ObservationSource` implementation rather than removed,
/// since the result type itself is part of the public contract.
#[derive(Clone, Debug, PartialEq)]
pub enum ObscalcResult {
    /// Generation failed terminally; the observation's workflow is
    /// reported as `Undefined` with this error attached (§7).
    Error {
        /// The error that terminated the pipeline.
        error: OdbError,
        /// The workflow state derived despite the failure (always
        /// `Undefined` for a config error; §4.7 rule 4 still applies
        /// when the failure is transient and retried).
        workflow: WorkflowState,
    },
    /// The pipeline completed for an observation with no resolved
    /// target.
    WithoutTarget {
        /// The computed digest.
        digest: ObscalcDigest,
        /// The derived workflow state (C7).
        workflow: WorkflowState,
    },
    /// The pipeline completed for an observation with a resolved
    /// target, carrying the integration time that target resolved to.
    WithTarget {
        /// The integration time resolved for the asterism (C2).
        itc: IntegrationTime,
        /// The computed digest.
        digest: ObscalcDigest,
        /// The derived workflow state (C7).
        workflow: WorkflowState,
    },
}

impl ObscalcResult {
    /// The workflow state carried by any variant.
    pub fn workflow(&self) -> WorkflowState {
        match self {
            ObscalcResult::Error { workflow, .. } => *workflow,
            ObscalcResult::WithoutTarget { workflow, .. } => *workflow,
            ObscalcResult::WithTarget { workflow, .. } => *workflow,
        }
    }
}

/// The lifecycle state of one observation's obscalc entry (§4.8).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryState {
    /// Awaiting a worker to pick it up.
    Pending,
    /// A worker currently holds the lease and is computing.
    Calculating,
    /// A result is computed and up to date with the last-seen invalidation.
    Ready,
    /// A computation failed; will return to `Pending` at `retry_at`.
    Retry,
}

/// One observation's obscalc queue entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// The observation this entry tracks.
    pub observation_id: ObservationId,
    /// Current lifecycle state.
    pub state: EntryState,
    /// Most recent invalidation timestamp seen for this observation.
    pub last_invalidation: Timestamp,
    /// When `result` was last written.
    pub last_update: Timestamp,
    /// Consecutive failure count since the last success.
    pub failure_count: u32,
    /// When a `Retry` entry becomes eligible to return to `Pending`.
    pub retry_at: Option<Timestamp>,
    /// The active worker's lease, if `state == Calculating`.
    pub lease: Option<Lease>,
    /// The `last_invalidation` value observed at the moment the current
    /// (or most recent) lease was acquired — compared against the live
    /// value on completion to decide `Ready` vs `Pending` (§4.8).
    pub(crate) snapshot_invalidation: Option<Timestamp>,
    /// The most recently computed result, if any. Preserved across a
    /// failed recomputation as "last known" (§4.8).
    pub result: Option<ObscalcResult>,
}

impl Entry {
    /// A freshly invalidated entry with no prior result.
    pub fn new(observation_id: ObservationId, now: Timestamp) -> Self {
        Self {
            observation_id,
            state: EntryState::Pending,
            last_invalidation: now,
            last_update: now,
            failure_count: 0,
            retry_at: None,
            lease: None,
            snapshot_invalidation: None,
            result: None,
        }
    }
}
