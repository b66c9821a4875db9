//! Boundaries between the pipeline and the (out-of-scope) execution
//! history, proposal lifecycle, and user workflow overrides named in §1.

use odb_core::{ConcreteAtom, ObservationId};
use odb_sequence::ExecutionEvent;

/// Everything the pipeline needs to read from the (out-of-scope) event
/// stream and visit history to run §4.5's merge for one observation.
pub trait ExecutionSource: Send + Sync {
    /// Every atom previously handed out by a prior generation run for
    /// this observation, across all of its visits, in execution order,
    /// carrying their originally-minted ids.
    fn executed_atoms(&self, observation_id: ObservationId) -> Vec<ConcreteAtom>;

    /// The inbound execution event stream for this observation, across
    /// all of its visits, in received order.
    fn events(&self, observation_id: ObservationId) -> Vec<ExecutionEvent>;
}

/// The user- and proposal-lifecycle facts §4.7 needs beyond validation
/// and execution history — named as out-of-scope collaborators in §1
/// ("proposal lifecycle").
pub trait WorkflowSource: Send + Sync {
    /// `true` if the observation's proposal has been accepted.
    fn proposal_accepted(&self, observation_id: ObservationId) -> bool;

    /// `true` if the user has explicitly marked the observation `Inactive`.
    fn user_marked_inactive(&self, observation_id: ObservationId) -> bool;

    /// `true` if the user has explicitly promoted the observation to `Ready`.
    fn user_promoted_ready(&self, observation_id: ObservationId) -> bool;
}

/// An [`ExecutionSource`]/[`WorkflowSource`] pair with nothing on record:
/// a freshly-created observation that has never executed a step, whose
/// proposal is unaccepted and carries no explicit user overrides.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyHistory;

impl ExecutionSource for EmptyHistory {
    fn executed_atoms(&self, _observation_id: ObservationId) -> Vec<ConcreteAtom> {
        Vec::new()
    }

    fn events(&self, _observation_id: ObservationId) -> Vec<ExecutionEvent> {
        Vec::new()
    }
}

impl WorkflowSource for EmptyHistory {
    fn proposal_accepted(&self, _observation_id: ObservationId) -> bool {
        false
    }

    fn user_marked_inactive(&self, _observation_id: ObservationId) -> bool {
        false
    }

    fn user_promoted_ready(&self, _observation_id: ObservationId) -> bool {
        false
    }
}
