//! Legal user-requested workflow transitions (§4.7).

use crate::state::WorkflowState;
use std::fmt;

/// The requested transition `from -> to` is not legal (§4.7 "Invalid
/// transitions fail with `InvalidWorkflowTransition(from,to)`").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidWorkflowTransition {
    /// The observation's current state.
    pub from: WorkflowState,
    /// The requested target state.
    pub to: WorkflowState,
}

impl fmt::Display for InvalidWorkflowTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot transition from {} to {}", self.from, self.to)
    }
}

impl std::error::Error for InvalidWorkflowTransition {}

impl From<InvalidWorkflowTransition> for odb_core::OdbError {
    fn from(e: InvalidWorkflowTransition) -> Self {
        odb_core::OdbError {
            tag: odb_core::ErrorTag::InvalidWorkflowTransition,
            detail: e.to_string(),
            data: Some(vec![
                ("from".to_string(), e.from.to_string()),
                ("to".to_string(), e.to.to_string()),
            ]),
        }
    }
}

/// The set of states a user may legally request a transition to from
/// `state` (§4.7 "Transition legality"). `Defined -> Ready` is only legal
/// when the proposal has been accepted.
pub fn valid_transitions(state: WorkflowState, proposal_accepted: bool) -> Vec<WorkflowState> {
    match state {
        WorkflowState::Ongoing => vec![WorkflowState::Inactive],
        WorkflowState::Inactive => vec![WorkflowState::Ongoing],
        WorkflowState::Completed => vec![],
        WorkflowState::Defined => {
            let mut targets = vec![WorkflowState::Inactive];
            if proposal_accepted {
                targets.push(WorkflowState::Ready);
            }
            targets
        }
        WorkflowState::Ready => vec![WorkflowState::Inactive, WorkflowState::Defined],
        WorkflowState::Undefined | WorkflowState::Unapproved => vec![],
    }
}

/// Apply a user-requested transition, failing if `to` is not in
/// `valid_transitions(from, proposal_accepted)`.
pub fn apply_transition(
    from: WorkflowState,
    to: WorkflowState,
    proposal_accepted: bool,
) -> Result<WorkflowState, InvalidWorkflowTransition> {
    if valid_transitions(from, proposal_accepted).contains(&to) {
        Ok(to)
    } else {
        Err(InvalidWorkflowTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ongoing_may_only_go_inactive() {
        assert_eq!(
            valid_transitions(WorkflowState::Ongoing, true),
            vec![WorkflowState::Inactive]
        );
    }

    #[test]
    fn completed_is_terminal() {
        assert!(valid_transitions(WorkflowState::Completed, true).is_empty());
    }

    #[test]
    fn defined_to_ready_requires_accepted_proposal() {
        assert!(!valid_transitions(WorkflowState::Defined, false).contains(&WorkflowState::Ready));
        assert!(valid_transitions(WorkflowState::Defined, true).contains(&WorkflowState::Ready));
    }

    #[test]
    fn apply_legal_transition_succeeds() {
        let result = apply_transition(WorkflowState::Inactive, WorkflowState::Ongoing, true);
        assert_eq!(result, Ok(WorkflowState::Ongoing));
    }

    #[test]
    fn apply_illegal_transition_fails() {
        let result = apply_transition(WorkflowState::Completed, WorkflowState::Ongoing, true);
        assert_eq!(
            result,
            Err(InvalidWorkflowTransition {
                from: WorkflowState::Completed,
                to: WorkflowState::Ongoing,
            })
        );
    }

    /// §8 property 6: for any legal transition, applying it yields a
    /// workflow whose state equals the requested target.
    #[test]
    fn property_legal_transitions_yield_their_target() {
        let all = [
            WorkflowState::Undefined,
            WorkflowState::Unapproved,
            WorkflowState::Defined,
            WorkflowState::Inactive,
            WorkflowState::Ready,
            WorkflowState::Ongoing,
            WorkflowState::Completed,
        ];
        for from in all {
            for proposal_accepted in [false, true] {
                for to in valid_transitions(from, proposal_accepted) {
                    assert_eq!(apply_transition(from, to, proposal_accepted), Ok(to));
                }
            }
        }
    }
}
