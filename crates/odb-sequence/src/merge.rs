//! Merging a protosequence with execution history into a next atom and a
//! bounded window of possible future atoms (§4.5, §9 "Ownership of atom
//! identity").

use crate::fold::EventFold;
use odb_core::traits::{AtomStream, ConcreteAtom};
use odb_core::domain::StepFingerprint;
use std::collections::HashMap;

/// Inputs to [`merge_sequence`].
pub struct MergeInput<'a> {
    /// The protosequence to pull fresh atoms from once execution history
    /// is exhausted. Never fully materialized: at most
    /// `future_limit + 1` atoms are ever pulled from it.
    pub protosequence: &'a mut dyn AtomStream,
    /// Every atom previously handed out by a prior generation run, in
    /// execution order, carrying their originally-minted ids.
    pub executed_atoms: &'a [ConcreteAtom],
    /// The inbound execution event stream for this visit, in received
    /// order.
    pub events: &'a [crate::events::ExecutionEvent],
    /// How many atoms beyond `next_atom` to materialize into
    /// `possible_future` (the "futureLimit" configuration knob, §3).
    pub future_limit: usize,
}

/// The result of a merge: what to execute next, a preview of what comes
/// after, and whether more exists beyond the preview window.
#[derive(Debug, PartialEq)]
pub struct MergeResult {
    /// The next atom to execute, or `None` if the sequence is exhausted.
    ///
    /// When this atom corresponds to one with residual (incomplete)
    /// steps in `executed_atoms`, its [`odb_core::AtomId`] is preserved
    /// from that prior atom rather than minted fresh — an operator
    /// partway through an atom sees the same atom, not a new one, when
    /// the sequence is regenerated (§9).
    pub next_atom: Option<ConcreteAtom>,
    /// Up to `future_limit` atoms following `next_atom`, freshly minted.
    pub possible_future: Vec<ConcreteAtom>,
    /// `true` if at least one more atom exists beyond `possible_future`.
    pub has_more: bool,
}

impl MergeResult {
    /// `true` if nothing remains to execute: no next atom and no atom
    /// beyond it, even with one more pull attempted (§4.7 rule 1 feeds
    /// on this to recognize a fully executed sequence).
    pub fn is_exhausted(&self) -> bool {
        self.next_atom.is_none() && self.possible_future.is_empty() && !self.has_more
    }
}

/// Multiset of step fingerprints completed during prior execution,
/// consumed by matching against fresh protosequence atoms so a
/// regenerated sequence does not re-offer already-executed work (§4.5
/// "fingerprint matching").
fn completed_fingerprints(executed_atoms: &[ConcreteAtom], fold: &EventFold) -> HashMap<StepFingerprint, usize> {
    let mut consumed = HashMap::new();
    for atom in executed_atoms {
        for step in &atom.steps {
            if fold.is_step_completed(atom.id, step.id) {
                *consumed.entry(step.fingerprint()).or_insert(0) += 1;
            }
        }
    }
    consumed
}

/// The most recently executed atom that still has at least one
/// incomplete step, if any (§4.5: "the in-progress atom, if any, is the
/// one whose identity is preserved").
fn in_progress_atom(executed_atoms: &[ConcreteAtom], fold: &EventFold) -> Option<ConcreteAtom> {
    executed_atoms
        .iter()
        .rev()
        .find(|atom| {
            atom.steps
                .iter()
                .any(|step| !fold.is_step_completed(atom.id, step.id))
        })
        .cloned()
}

/// Pull the next atom from `protosequence` whose steps are not entirely
/// accounted for in `consumed`, decrementing `consumed` for any atom it
/// skips whole (every one of its steps already executed, §4.5
/// "an already-completed atom contributes nothing further").
fn next_unconsumed(
    protosequence: &mut dyn AtomStream,
    consumed: &mut HashMap<StepFingerprint, usize>,
) -> Option<ConcreteAtom> {
    loop {
        let atom = protosequence.next_atom()?;
        let mut fingerprints: Vec<StepFingerprint> = atom.steps.iter().map(|s| s.fingerprint()).collect();
        let fully_consumed = fingerprints.iter().all(|fp| consumed.get(fp).copied().unwrap_or(0) > 0);
        if fully_consumed {
            for fp in fingerprints.drain(..) {
                if let Some(count) = consumed.get_mut(&fp) {
                    *count -= 1;
                    if *count == 0 {
                        consumed.remove(&fp);
                    }
                }
            }
            continue;
        }
        return Some(atom);
    }
}

/// Merge a protosequence with execution history (§4.5, §9).
///
/// Steps whose fingerprint matches a completed executed step are
/// consumed from the protosequence without being re-offered. The atom
/// with residual (started but incomplete) steps, if any, is returned as
/// `next_atom` with its original id preserved; otherwise the next fresh,
/// unconsumed atom from the protosequence is used. `possible_future` and
/// `has_more` are derived by continuing to pull from the protosequence,
/// never exceeding `future_limit + 1` total pulls (§9 "Lazy atom
/// streams").
#[tracing::instrument(skip(input))]
pub fn merge_sequence(input: MergeInput<'_>) -> MergeResult {
    let fold = EventFold::fold(input.events);
    let mut consumed = completed_fingerprints(input.executed_atoms, &fold);

    let next_atom = match in_progress_atom(input.executed_atoms, &fold) {
        Some(atom) => {
            // The in-progress atom's completed steps are already
            // accounted for in `consumed`; remove them so a fresh
            // protosequence pull doesn't also treat them as spoken for
            // by this atom's own fingerprints.
            for step in &atom.steps {
                if fold.is_step_completed(atom.id, step.id) {
                    if let Some(count) = consumed.get_mut(&step.fingerprint()) {
                        *count -= 1;
                        if *count == 0 {
                            consumed.remove(&step.fingerprint());
                        }
                    }
                }
            }
            // Only the residual (incomplete) steps are handed back; the
            // atom's identity is preserved but its completed steps are
            // not re-offered for execution (§4.5 point 3).
            let residual_steps: Vec<_> = atom
                .steps
                .iter()
                .filter(|step| !fold.is_step_completed(atom.id, step.id))
                .cloned()
                .collect();
            Some(odb_core::domain::Atom {
                id: atom.id,
                sequence_type: atom.sequence_type,
                steps: residual_steps,
                description: atom.description,
            })
        }
        None => next_unconsumed(input.protosequence, &mut consumed),
    };

    let mut possible_future = Vec::with_capacity(input.future_limit);
    for _ in 0..input.future_limit {
        match next_unconsumed(input.protosequence, &mut consumed) {
            Some(atom) => possible_future.push(atom),
            None => break,
        }
    }
    let has_more = possible_future.len() == input.future_limit
        && next_unconsumed(input.protosequence, &mut consumed).is_some();

    MergeResult {
        next_atom,
        possible_future,
        has_more,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ExecutionEvent, ExecutionEventKind, ExecutionStage};
    use odb_core::domain::{
        GmosGrating, Guiding, InstrumentConfig, ObserveClass, Offset, SequenceType, Site, Step, StepConfig,
        TelescopeConfig, TimeSpan, WavelengthPm,
    };
    use odb_core::id::{AtomId, ObservationId, StepId, VisitId};
    use odb_time::Timestamp;
    use proptest::prelude::*;

    struct VecStream(std::vec::IntoIter<ConcreteAtom>);

    impl AtomStream for VecStream {
        fn next_atom(&mut self) -> Option<ConcreteAtom> {
            self.0.next()
        }
    }

    fn arc_step(exposure_s: f64) -> Step<InstrumentConfig> {
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::GmosLongSlit {
                site: Site::North,
                grating: GmosGrating::B600,
                filter: None,
                fpu: "longslit_1".to_string(),
                central_wavelength: WavelengthPm::from_nm(500.0),
                exposure_time: TimeSpan::from_seconds(exposure_s),
            },
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset { p: 0.0, q: 0.0 },
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        }
    }

    fn atom_with(exposures: &[f64]) -> ConcreteAtom {
        let steps = exposures.iter().map(|e| arc_step(*e)).collect();
        ConcreteAtom::new(SequenceType::Science, steps, "test atom").unwrap()
    }

    fn step_event(atom_id: AtomId, step_id: StepId, stage: ExecutionStage) -> ExecutionEvent {
        ExecutionEvent {
            visit_id: VisitId(1),
            observation_id: ObservationId(1),
            received: Timestamp::new(0).unwrap(),
            kind: ExecutionEventKind::Step {
                atom_id,
                step_id,
                stage,
            },
        }
    }

    #[test]
    fn no_history_pulls_straight_from_protosequence() {
        let a = atom_with(&[10.0]);
        let b = atom_with(&[20.0]);
        let mut stream = VecStream(vec![a.clone(), b.clone()].into_iter());
        let result = merge_sequence(MergeInput {
            protosequence: &mut stream,
            executed_atoms: &[],
            events: &[],
            future_limit: 1,
        });
        assert_eq!(result.next_atom, Some(a));
        assert_eq!(result.possible_future, vec![b]);
        assert!(!result.has_more);
    }

    #[test]
    fn in_progress_atom_identity_is_preserved() {
        let atom = atom_with(&[10.0, 10.0]);
        let completed_step = atom.steps[0].id;
        let events = vec![step_event(atom.id, completed_step, ExecutionStage::End)];

        let fresh = atom_with(&[30.0]);
        let mut stream = VecStream(vec![fresh].into_iter());

        let result = merge_sequence(MergeInput {
            protosequence: &mut stream,
            executed_atoms: &[atom.clone()],
            events: &events,
            future_limit: 0,
        });
        assert_eq!(result.next_atom.as_ref().map(|a| a.id), Some(atom.id));
        let residual = result.next_atom.unwrap();
        assert_eq!(residual.steps.len(), 1);
        assert_ne!(residual.steps[0].id, completed_step);
    }

    #[test]
    fn fully_completed_atom_is_not_reoffered() {
        let atom = atom_with(&[10.0]);
        let events = vec![step_event(atom.id, atom.steps[0].id, ExecutionStage::End)];

        // Regeneration yields an atom with the identical fingerprint
        // (same config) followed by a genuinely new one.
        let repeat = atom_with(&[10.0]);
        let next = atom_with(&[40.0]);
        let mut stream = VecStream(vec![repeat, next.clone()].into_iter());

        let result = merge_sequence(MergeInput {
            protosequence: &mut stream,
            executed_atoms: &[atom],
            events: &events,
            future_limit: 0,
        });
        assert_eq!(result.next_atom, Some(next));
    }

    #[test]
    fn empty_protosequence_is_exhausted() {
        let mut stream = VecStream(vec![].into_iter());
        let result = merge_sequence(MergeInput {
            protosequence: &mut stream,
            executed_atoms: &[],
            events: &[],
            future_limit: 2,
        });
        assert!(result.is_exhausted());
    }

    #[test]
    fn has_more_is_true_when_future_window_is_full() {
        let atoms: Vec<_> = (0..5).map(|i| atom_with(&[i as f64 + 1.0])).collect();
        let mut stream = VecStream(atoms.into_iter());
        let result = merge_sequence(MergeInput {
            protosequence: &mut stream,
            executed_atoms: &[],
            events: &[],
            future_limit: 2,
        });
        assert_eq!(result.possible_future.len(), 2);
        assert!(result.has_more);
    }

    proptest! {
        #[test]
        fn partially_executed_atom_keeps_its_identity_unless_fully_completed(
            step_count in 2usize..8,
            completed in 1usize..7,
        ) {
            let completed = completed.min(step_count - 1);
            let exposures: Vec<f64> = (0..step_count).map(|i| 10.0 + i as f64).collect();
            let atom = atom_with(&exposures);
            let events: Vec<ExecutionEvent> = atom.steps[..completed]
                .iter()
                .map(|s| step_event(atom.id, s.id, ExecutionStage::End))
                .collect();

            let fresh = atom_with(&[99.0]);
            let mut stream = VecStream(vec![fresh].into_iter());
            let result = merge_sequence(MergeInput {
                protosequence: &mut stream,
                executed_atoms: &[atom.clone()],
                events: &events,
                future_limit: 0,
            });

            if completed < step_count {
                prop_assert_eq!(result.next_atom.as_ref().map(|a| a.id), Some(atom.id));
                prop_assert_eq!(result.next_atom.unwrap().steps.len(), step_count - completed);
            }
        }

        #[test]
        fn larger_future_limit_never_shrinks_possible_future(
            total_atoms in 0usize..10,
            small_limit in 0usize..5,
            extra in 0usize..5,
        ) {
            let large_limit = small_limit + extra;
            let atoms: Vec<ConcreteAtom> = (0..total_atoms)
                .map(|i| atom_with(&[i as f64 + 1.0]))
                .collect();

            let mut small_stream = VecStream(atoms.clone().into_iter());
            let small_result = merge_sequence(MergeInput {
                protosequence: &mut small_stream,
                executed_atoms: &[],
                events: &[],
                future_limit: small_limit,
            });

            let mut large_stream = VecStream(atoms.into_iter());
            let large_result = merge_sequence(MergeInput {
                protosequence: &mut large_stream,
                executed_atoms: &[],
                events: &[],
                future_limit: large_limit,
            });

            prop_assert!(large_result.possible_future.len() >= small_result.possible_future.len());
        }
    }
}
