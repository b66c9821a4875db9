//! Computing a [`Digest`] over a phase's atoms (§4.5 "Digest").

use crate::error::UnknownEstimatorTag;
use crate::estimator::atom_time;
use crate::types::Digest;
use indexmap::IndexSet;
use odb_core::{ConcreteAtom, ObserveClass, TimeSpan};

/// Fold `atoms` into their [`Digest`]: the union of offsets used, the
/// summed time estimate, the atom count, and the whole phase's observe
/// class (§4.5).
///
/// `atoms` need not be the full protosequence — callers typically digest
/// the already-merged `next_atom` plus `possible_future` window, or a
/// fully executed history.
#[tracing::instrument(skip(atoms))]
pub fn compute_digest(atoms: &[ConcreteAtom]) -> Result<Digest, UnknownEstimatorTag> {
    let mut offsets = IndexSet::new();
    let mut total_time = TimeSpan::ZERO;
    let mut classes = Vec::new();

    for atom in atoms {
        total_time = total_time.plus(atom_time(atom)?);
        for step in &atom.steps {
            offsets.insert(step.telescope_config.offset);
            classes.push(step.observe_class);
        }
    }

    Ok(Digest {
        offsets: offsets.into_iter().collect(),
        total_time,
        atom_count: atoms.len() as u32,
        observe_class: ObserveClass::least_specific(classes),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use odb_core::domain::{
        GmosGrating, Guiding, Offset, SequenceType, Site, Step, StepConfig, TelescopeConfig,
        WavelengthPm,
    };
    use odb_core::id::StepId;
    use odb_core::InstrumentConfig;

    fn step_at(offset: Offset, class: ObserveClass) -> Step<InstrumentConfig> {
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::GmosLongSlit {
                site: Site::North,
                grating: GmosGrating::B600,
                filter: None,
                fpu: "longslit_1".to_string(),
                central_wavelength: WavelengthPm::from_nm(500.0),
                exposure_time: TimeSpan::from_seconds(60.0),
            },
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig { offset, guiding: Guiding::Enabled },
            observe_class: class,
            breakpoint: false,
        }
    }

    #[test]
    fn digest_unions_distinct_offsets() {
        let a = ConcreteAtom::new(
            SequenceType::Science,
            vec![
                step_at(Offset { p: 0.0, q: 0.0 }, ObserveClass::Science),
                step_at(Offset { p: 0.0, q: 1.5 }, ObserveClass::Science),
                step_at(Offset { p: 0.0, q: 0.0 }, ObserveClass::Science),
            ],
            "dither cycle",
        )
        .unwrap();
        let digest = compute_digest(&[a]).unwrap();
        assert_eq!(digest.offsets.len(), 2);
        assert_eq!(digest.atom_count, 1);
        assert_eq!(digest.observe_class, Some(ObserveClass::Science));
    }

    #[test]
    fn digest_of_empty_atoms_has_no_observe_class() {
        let digest = compute_digest(&[]).unwrap();
        assert!(digest.observe_class.is_none());
        assert_eq!(digest.total_time, TimeSpan::ZERO);
        assert_eq!(digest.atom_count, 0);
    }

    #[test]
    fn science_step_dominates_calibration_in_observe_class() {
        let a = ConcreteAtom::new(
            SequenceType::Science,
            vec![
                step_at(Offset::ZERO, ObserveClass::DayCal),
                step_at(Offset::ZERO, ObserveClass::Science),
            ],
            "cal then science",
        )
        .unwrap();
        let digest = compute_digest(&[a]).unwrap();
        assert_eq!(digest.observe_class, Some(ObserveClass::Science));
    }

    proptest! {
        #[test]
        fn atom_count_always_equals_the_number_of_atoms_folded(n in 0usize..20) {
            let atoms: Vec<ConcreteAtom> = (0..n)
                .map(|i| {
                    ConcreteAtom::new(
                        SequenceType::Science,
                        vec![step_at(Offset { p: 0.0, q: i as f64 }, ObserveClass::Science)],
                        "proptest atom",
                    )
                    .unwrap()
                })
                .collect();
            let digest = compute_digest(&atoms).unwrap();
            prop_assert_eq!(digest.atom_count, n as u32);
        }

        #[test]
        fn splitting_atoms_into_two_digests_sums_to_the_whole(split_at in 0usize..15, extra in 0usize..15) {
            let total = split_at + extra;
            let atoms: Vec<ConcreteAtom> = (0..total)
                .map(|i| {
                    ConcreteAtom::new(
                        SequenceType::Science,
                        vec![step_at(Offset { p: 0.0, q: i as f64 }, ObserveClass::Science)],
                        "proptest atom",
                    )
                    .unwrap()
                })
                .collect();

            let whole = compute_digest(&atoms).unwrap();
            let (left, right) = atoms.split_at(split_at);
            let left_digest = compute_digest(left).unwrap();
            let right_digest = compute_digest(right).unwrap();

            prop_assert_eq!(whole.atom_count, left_digest.atom_count + right_digest.atom_count);
            prop_assert_eq!(whole.total_time, left_digest.total_time.plus(right_digest.total_time));
        }
    }
}
