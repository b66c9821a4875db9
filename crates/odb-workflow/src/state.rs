//! The workflow state enumeration (§3, §4.7).

use std::fmt;

/// An observation's derived workflow state (§3).
///
/// States have a rough lifecycle ordering (configuration still being
/// entered, through execution, to completion) but the evaluator derives
/// the current state fresh on every call rather than advancing a stored
/// state machine — see [`crate::evaluate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WorkflowState {
    /// Configuration is invalid for reasons other than proposal acceptance.
    Undefined,
    /// Configuration is otherwise valid, but the proposal has not been accepted.
    Unapproved,
    /// Configuration is valid and the proposal is accepted; not yet promoted to `Ready`.
    Defined,
    /// The user has explicitly taken the observation out of the active pool.
    Inactive,
    /// The user has explicitly promoted a `Defined` observation for scheduling.
    Ready,
    /// At least one step has been executed.
    Ongoing,
    /// The sequence is fully executed.
    Completed,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undefined => "UNDEFINED",
            Self::Unapproved => "UNAPPROVED",
            Self::Defined => "DEFINED",
            Self::Inactive => "INACTIVE",
            Self::Ready => "READY",
            Self::Ongoing => "ONGOING",
            Self::Completed => "COMPLETED",
        };
        write!(f, "{s}")
    }
}
