//! Table-driven time estimation (C6, §4.6).
//!
//! Each step's total time is `configure + exposure + readout + write`.
//! `configure`, `readout`, and `write` are per-instrument-family overhead
//! looked up from a static table; `exposure` comes from the step's own
//! configuration.

use crate::error::UnknownEstimatorTag;
use odb_core::domain::InstrumentConfig;
use odb_core::{ChargeClass, ConcreteAtom, ConcreteStep, TimeSpan};

/// One row of the time-estimation table.
#[derive(Clone, Copy, Debug)]
pub struct EstimatorEntry {
    /// Lookup key, `"<family>.<phase>"` (e.g. `"gmos.readout"`).
    pub tag: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// What this entry represents.
    pub description: &'static str,
    /// The instrument family this entry applies to, if not universal.
    pub instrument: Option<&'static str>,
    /// The fixed overhead this entry contributes.
    pub time: TimeSpan,
}

/// The static overhead table. Exposure time is never looked up here — it
/// comes from the step's own [`InstrumentConfig::exposure_time`].
const TABLE: &[EstimatorEntry] = &[
    EstimatorEntry {
        tag: "gmos.configure",
        name: "GMOS configuration overhead",
        description: "Grating, filter, and FPU wheel motion before exposure.",
        instrument: Some("gmos"),
        time: TimeSpan::from_micros(90_000_000),
    },
    EstimatorEntry {
        tag: "gmos.readout",
        name: "GMOS detector readout",
        description: "Detector readout following exposure.",
        instrument: Some("gmos"),
        time: TimeSpan::from_micros(40_000_000),
    },
    EstimatorEntry {
        tag: "gmos.write",
        name: "GMOS dataset write",
        description: "Writing the exposed dataset to disk.",
        instrument: Some("gmos"),
        time: TimeSpan::from_micros(10_000_000),
    },
    EstimatorEntry {
        tag: "f2.configure",
        name: "Flamingos-2 configuration overhead",
        description: "Grism, filter, and FPU wheel motion before exposure.",
        instrument: Some("f2"),
        time: TimeSpan::from_micros(30_000_000),
    },
    EstimatorEntry {
        tag: "f2.readout",
        name: "Flamingos-2 detector readout",
        description: "Detector readout following exposure, dependent on read mode in a future table revision.",
        instrument: Some("f2"),
        time: TimeSpan::from_micros(8_000_000),
    },
    EstimatorEntry {
        tag: "f2.write",
        name: "Flamingos-2 dataset write",
        description: "Writing the exposed dataset to disk.",
        instrument: Some("f2"),
        time: TimeSpan::from_micros(5_000_000),
    },
];

/// Look up a table entry by tag.
pub fn lookup(tag: &str) -> Result<&'static EstimatorEntry, UnknownEstimatorTag> {
    TABLE
        .iter()
        .find(|e| e.tag == tag)
        .ok_or_else(|| UnknownEstimatorTag { tag: tag.to_string() })
}

/// The instrument family tag used to key [`TABLE`] lookups.
fn family(config: &InstrumentConfig) -> &'static str {
    match config {
        InstrumentConfig::GmosLongSlit { .. } | InstrumentConfig::GmosImaging { .. } => "gmos",
        InstrumentConfig::Flamingos2LongSlit { .. } => "f2",
    }
}

/// `configure + exposure + readout + write` for one step (§4.6).
#[tracing::instrument(skip(step))]
pub fn step_time(step: &ConcreteStep) -> Result<TimeSpan, UnknownEstimatorTag> {
    let fam = family(&step.instrument_config);
    let configure = lookup(&format!("{fam}.configure"))?.time;
    let readout = lookup(&format!("{fam}.readout"))?.time;
    let write = lookup(&format!("{fam}.write"))?.time;
    let exposure = step.instrument_config.exposure_time();
    Ok(configure.plus(exposure).plus(readout).plus(write))
}

/// Sum of [`step_time`] across every step of `atom`.
pub fn atom_time(atom: &ConcreteAtom) -> Result<TimeSpan, UnknownEstimatorTag> {
    atom.steps.iter().try_fold(TimeSpan::ZERO, |acc, step| Ok(acc.plus(step_time(step)?)))
}

/// Total time across `atoms`, broken down by [`ChargeClass`] (§4.6
/// `CategorizedTime`).
pub fn categorized_time(atoms: &[ConcreteAtom]) -> Result<crate::types::CategorizedTime, UnknownEstimatorTag> {
    let mut out = crate::types::CategorizedTime::default();
    for atom in atoms {
        for step in &atom.steps {
            out.add(step.observe_class.charge_class(), step_time(step)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use odb_core::domain::{
        GmosGrating, Guiding, ObserveClass, Offset, SequenceType, Site, Step, StepConfig, TelescopeConfig,
        WavelengthPm,
    };
    use odb_core::id::StepId;

    fn gmos_step(exposure_seconds: f64) -> Step<InstrumentConfig> {
        Step {
            id: StepId::new(),
            instrument_config: InstrumentConfig::GmosLongSlit {
                site: Site::North,
                grating: GmosGrating::B600,
                filter: None,
                fpu: "longslit_1".to_string(),
                central_wavelength: WavelengthPm::from_nm(500.0),
                exposure_time: TimeSpan::from_seconds(exposure_seconds),
            },
            step_config: StepConfig::Science,
            telescope_config: TelescopeConfig {
                offset: Offset::ZERO,
                guiding: Guiding::Enabled,
            },
            observe_class: ObserveClass::Science,
            breakpoint: false,
        }
    }

    #[test]
    fn step_time_sums_all_four_components() {
        let step = gmos_step(300.0);
        let time = step_time(&step).unwrap();
        // 90 (configure) + 300 (exposure) + 40 (readout) + 10 (write) = 440s
        assert_eq!(time, TimeSpan::from_seconds(440.0));
    }

    #[test]
    fn atom_time_sums_its_steps() {
        let atom = ConcreteAtom::new(
            SequenceType::Science,
            vec![gmos_step(60.0), gmos_step(60.0)],
            "two identical steps",
        )
        .unwrap();
        let total = atom_time(&atom).unwrap();
        let single = step_time(&atom.steps[0]).unwrap();
        assert_eq!(total, TimeSpan::from_micros(single.as_micros() * 2));
    }

    #[test]
    fn categorized_time_attributes_science_to_program() {
        let atom = ConcreteAtom::new(SequenceType::Science, vec![gmos_step(10.0)], "one step").unwrap();
        let ct = categorized_time(std::slice::from_ref(&atom)).unwrap();
        assert_eq!(ct.program, step_time(&atom.steps[0]).unwrap());
        assert_eq!(ct.partner, TimeSpan::ZERO);
        assert_eq!(ct.non_charged, TimeSpan::ZERO);
    }

    #[test]
    fn unknown_tag_is_an_error() {
        assert!(lookup("nonexistent.configure").is_err());
    }
}
