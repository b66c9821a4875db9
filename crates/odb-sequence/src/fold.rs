//! Folding a slice of [`ExecutionEvent`](crate::ExecutionEvent)s into
//! per-step completion state (§4.5 rule 1).

use crate::events::{DatasetStage, ExecutionEvent, ExecutionEventKind, ExecutionStage, QaState};
use odb_core::{AtomId, StepId};
use std::collections::HashMap;

/// The result of folding an execution event stream: which steps count as
/// completed right now, and whether any step has executed at all.
///
/// Purely a function of the event slice folded — re-folding the same
/// events (e.g. after a QA revision is appended) always recomputes from
/// scratch rather than incrementally patching prior state, so a QA
/// `Fail` appended after a `Pass` correctly reopens the step (§8
/// scenario C).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFold {
    /// `(atom_id, step_id) -> completed`, where completed means the step
    /// reached a terminal, non-aborted end and (if it produced a
    /// dataset) its most recent QA disposition counts as completed.
    completed: HashMap<(AtomId, StepId), bool>,
    /// `true` if at least one step has ever started executing.
    pub has_executed_step: bool,
}

impl EventFold {
    /// Fold `events` (assumed already in temporal/received order) into
    /// completion state.
    pub fn fold(events: &[ExecutionEvent]) -> Self {
        let mut step_ended: HashMap<(AtomId, StepId), bool> = HashMap::new();
        let mut dataset_step: HashMap<_, (AtomId, StepId)> = HashMap::new();
        let mut dataset_qa: HashMap<_, Option<QaState>> = HashMap::new();
        let mut has_executed_step = false;

        for event in events {
            match event.kind {
                ExecutionEventKind::Step {
                    atom_id,
                    step_id,
                    stage,
                } => {
                    has_executed_step = true;
                    match stage {
                        ExecutionStage::Start => {
                            step_ended.entry((atom_id, step_id)).or_insert(false);
                        }
                        ExecutionStage::End => {
                            step_ended.insert((atom_id, step_id), true);
                        }
                        ExecutionStage::Abort => {
                            step_ended.insert((atom_id, step_id), false);
                        }
                    }
                }
                ExecutionEventKind::Dataset {
                    dataset_id,
                    step_id,
                    atom_id,
                    stage,
                } => {
                    has_executed_step = true;
                    dataset_step.insert(dataset_id, (atom_id, step_id));
                    match stage {
                        DatasetStage::Started => {
                            dataset_qa.entry(dataset_id).or_insert(None);
                        }
                        DatasetStage::Completed => {
                            dataset_qa.entry(dataset_id).or_insert(None);
                            step_ended.entry((atom_id, step_id)).or_insert(true);
                        }
                        DatasetStage::Qa(qa) => {
                            dataset_qa.insert(dataset_id, Some(qa));
                        }
                    }
                }
                _ => {}
            }
        }

        let mut completed: HashMap<(AtomId, StepId), bool> = HashMap::new();
        for (key, ended) in &step_ended {
            completed.insert(*key, *ended);
        }
        // A step's completion is overridden by the latest QA on any of
        // its datasets: any Fail reopens it, regardless of the raw
        // Step-End marker.
        for (dataset_id, qa) in &dataset_qa {
            if let Some((atom_id, step_id)) = dataset_step.get(dataset_id) {
                let base = completed.entry((*atom_id, *step_id)).or_insert(true);
                match qa {
                    Some(q) => *base = *base && q.counts_as_completed(),
                    None => {}
                }
            }
        }

        Self {
            completed,
            has_executed_step,
        }
    }

    /// `true` if `(atom_id, step_id)` has been executed to completion
    /// (§4.5 rule 1: fingerprint matching consumes only steps for which
    /// this is `true`).
    pub fn is_step_completed(&self, atom_id: AtomId, step_id: StepId) -> bool {
        self.completed.get(&(atom_id, step_id)).copied().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use odb_core::{ObservationId, VisitId};
    use odb_time::Timestamp;

    fn event(kind: ExecutionEventKind) -> ExecutionEvent {
        ExecutionEvent {
            visit_id: VisitId(1),
            observation_id: ObservationId(1),
            received: Timestamp::new(0).unwrap(),
            kind,
        }
    }

    #[test]
    fn step_end_without_dataset_is_completed() {
        let atom = AtomId::new();
        let step = StepId::new();
        let events = vec![event(ExecutionEventKind::Step {
            atom_id: atom,
            step_id: step,
            stage: ExecutionStage::End,
        })];
        let fold = EventFold::fold(&events);
        assert!(fold.is_step_completed(atom, step));
        assert!(fold.has_executed_step);
    }

    #[test]
    fn step_abort_is_not_completed() {
        let atom = AtomId::new();
        let step = StepId::new();
        let events = vec![event(ExecutionEventKind::Step {
            atom_id: atom,
            step_id: step,
            stage: ExecutionStage::Abort,
        })];
        let fold = EventFold::fold(&events);
        assert!(!fold.is_step_completed(atom, step));
    }

    #[test]
    fn qa_fail_reopens_a_previously_completed_step() {
        let atom = AtomId::new();
        let step = StepId::new();
        let dataset = odb_core::DatasetId(1);
        let events = vec![
            event(ExecutionEventKind::Step {
                atom_id: atom,
                step_id: step,
                stage: ExecutionStage::End,
            }),
            event(ExecutionEventKind::Dataset {
                dataset_id: dataset,
                step_id: step,
                atom_id: atom,
                stage: DatasetStage::Completed,
            }),
            event(ExecutionEventKind::Dataset {
                dataset_id: dataset,
                step_id: step,
                atom_id: atom,
                stage: DatasetStage::Qa(QaState::Pass),
            }),
        ];
        let fold = EventFold::fold(&events);
        assert!(fold.is_step_completed(atom, step));

        let mut reopened = events.clone();
        reopened.push(event(ExecutionEventKind::Dataset {
            dataset_id: dataset,
            step_id: step,
            atom_id: atom,
            stage: DatasetStage::Qa(QaState::Fail),
        }));
        let fold = EventFold::fold(&reopened);
        assert!(!fold.is_step_completed(atom, step));
    }

    #[test]
    fn no_events_means_nothing_completed() {
        let fold = EventFold::fold(&[]);
        assert!(!fold.has_executed_step);
        assert!(!fold.is_step_completed(AtomId::new(), StepId::new()));
    }
}
