//! The inbound execution event stream (§3 `ExecutionEvent`, §6 "Event
//! stream (inbound)").
//!
//! Events are totally ordered and consumed through a cursor by the
//! (out-of-scope) visit/event-stream collaborator; this crate only
//! defines the event shape and the fold that turns a slice of them into
//! completion state (see [`crate::fold`]).

use odb_core::{AtomId, DatasetId, ObservationId, StepId, VisitId};
use odb_time::Timestamp;

/// A dataset's quality-assurance disposition (§4.5 "taking QA state into
/// account").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum QaState {
    /// The dataset is of science-usable quality.
    Pass,
    /// The dataset did not meet the requested conditions but is still
    /// scientifically usable.
    Usable,
    /// The dataset failed QA and must be retaken.
    Fail,
}

impl QaState {
    /// `true` for [`QaState::Pass`] and [`QaState::Usable`]; `false` for
    /// [`QaState::Fail`] (§4.5 "a dataset with QA `Fail` counts the step
    /// as **not completed**; `Usable` and `Passed` count as completed").
    pub fn counts_as_completed(self) -> bool {
        !matches!(self, Self::Fail)
    }
}

/// A command directed at the sequence executor (§3 `SequenceEvent`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SequenceCommand {
    /// Begin executing the sequence.
    Start,
    /// Pause execution at the next breakpoint.
    Pause,
    /// Resume a paused sequence.
    Continue,
    /// Stop execution for this visit.
    Stop,
    /// Abort execution immediately.
    Abort,
}

/// A start/end/abort lifecycle marker shared by slew, atom, and step
/// events (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExecutionStage {
    /// The unit of work began.
    Start,
    /// The unit of work ended normally.
    End,
    /// The unit of work was aborted before completion.
    Abort,
}

/// A dataset's lifecycle marker, including its terminal QA disposition
/// once known (§3 `DatasetEvent`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DatasetStage {
    /// Exposure/readout/write began.
    Started,
    /// The dataset was written and is a candidate for completion,
    /// pending any later QA update.
    Completed,
    /// A QA disposition was recorded or revised for this dataset (§8
    /// scenario C: a later `Fail` reopens a previously completed step).
    Qa(QaState),
}

/// One tagged event in the inbound execution stream (§3 `ExecutionEvent`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ExecutionEvent {
    /// The visit this event occurred during.
    pub visit_id: VisitId,
    /// The observation this event belongs to.
    pub observation_id: ObservationId,
    /// When the engine received this event.
    pub received: Timestamp,
    /// The tagged event payload.
    pub kind: ExecutionEventKind,
}

/// The tagged variants of [`ExecutionEvent`] (§3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ExecutionEventKind {
    /// A command directed at the sequence executor.
    Sequence {
        /// The command issued.
        command: SequenceCommand,
    },
    /// A telescope slew lifecycle marker.
    Slew {
        /// Start, end, or abort.
        stage: ExecutionStage,
    },
    /// An atom lifecycle marker.
    Atom {
        /// The atom this event refers to.
        atom_id: AtomId,
        /// Start, end, or abort.
        stage: ExecutionStage,
    },
    /// A step lifecycle marker.
    Step {
        /// The owning atom.
        atom_id: AtomId,
        /// The step this event refers to.
        step_id: StepId,
        /// Start, end, or abort.
        stage: ExecutionStage,
    },
    /// A dataset lifecycle or QA marker, correlated to the step that
    /// produced it.
    Dataset {
        /// The dataset this event refers to.
        dataset_id: DatasetId,
        /// The step that produced this dataset.
        step_id: StepId,
        /// The owning atom.
        atom_id: AtomId,
        /// Lifecycle stage or QA update.
        stage: DatasetStage,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qa_fail_does_not_count_as_completed() {
        assert!(!QaState::Fail.counts_as_completed());
        assert!(QaState::Pass.counts_as_completed());
        assert!(QaState::Usable.counts_as_completed());
    }
}
