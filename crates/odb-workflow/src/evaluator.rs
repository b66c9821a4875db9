//! The workflow evaluator (C7, §4.7): derives [`WorkflowState`] from
//! validation, proposal acceptance, and execution history.

use crate::state::WorkflowState;

/// Everything [`evaluate`] needs to derive a workflow state for one
/// observation. Every field is a fact gathered by the (out-of-scope)
/// persistence and proposal-lifecycle collaborators named in §1; this
/// crate only applies the derivation rule.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkflowInputs {
    /// `true` if the sequence has a dataset event indicating completion
    /// (§4.7 rule 1).
    pub sequence_complete: bool,
    /// `true` if at least one step of this observation has been executed
    /// (§4.7 rule 2, §8 property 7).
    pub has_executed_step: bool,
    /// `true` if the user has explicitly marked the observation `Inactive`
    /// (§4.7 rule 3).
    pub user_marked_inactive: bool,
    /// Validation errors unrelated to proposal acceptance. A non-empty
    /// list always yields `Undefined` regardless of proposal status
    /// (§4.7 rule 4).
    pub config_errors: Vec<String>,
    /// `true` if the observation's proposal has been accepted (§4.7 rules
    /// 4–5).
    pub proposal_accepted: bool,
    /// `true` if the user has explicitly promoted a `Defined` observation
    /// to `Ready` (§4.7 rule 5).
    pub user_promoted_ready: bool,
}

/// Derive the workflow state for one observation by applying the §4.7
/// rules in order; the first matching rule wins.
#[tracing::instrument(skip(inputs))]
pub fn evaluate(inputs: &WorkflowInputs) -> WorkflowState {
    if inputs.sequence_complete {
        return WorkflowState::Completed;
    }
    if inputs.has_executed_step {
        return WorkflowState::Ongoing;
    }
    if inputs.user_marked_inactive {
        return WorkflowState::Inactive;
    }
    if !inputs.config_errors.is_empty() {
        return WorkflowState::Undefined;
    }
    if !inputs.proposal_accepted {
        return WorkflowState::Unapproved;
    }
    if inputs.user_promoted_ready {
        WorkflowState::Ready
    } else {
        WorkflowState::Defined
    }
}
