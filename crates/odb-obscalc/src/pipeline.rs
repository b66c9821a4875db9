//! Wiring C1 through C7 into one per-observation computation (§1 "Data
//! flow", §4.8 "Calculating").
//!
//! [`ObscalcContext`] bundles every collaborator a run needs; [`run`]
//! resolves params, consults the ITC, builds the static configuration
//! and protosequence, merges it with execution history, estimates time,
//! and derives the workflow state, in that order, short-circuiting on
//! the first terminal error.

use std::sync::Arc;

use odb_core::{
    ConcreteAtom, GenError, InstrumentModeKind, ObservationId, ObservationSource, SequenceType,
};
use odb_digest::{categorized_time, compute_digest};
use odb_instruments::{AlwaysFreshSmartGcal, Flamingos2LongSlit, GmosImaging, GmosLongSlit, SmartGcalLookup};
use odb_itc::ItcClient;
use odb_sequence::{merge_sequence, MergeInput};
use odb_workflow::{evaluate, WorkflowInputs, WorkflowState};

use crate::entry::{ObscalcDigest, ObscalcResult};
use crate::source::{ExecutionSource, WorkflowSource};

/// Everything one [`run`] call needs, shared read-only across every
/// worker (§5 "The smart-gcal table is effectively read-only after
/// init").
pub struct ObscalcContext {
    /// The (out-of-scope) persistence boundary feeding C1.
    pub observations: Arc<dyn ObservationSource>,
    /// The (out-of-scope) event-stream and visit-history boundary feeding C5.
    pub execution: Arc<dyn ExecutionSource>,
    /// The (out-of-scope) proposal/user-override boundary feeding C7.
    pub workflow: Arc<dyn WorkflowSource>,
    /// The cached integration-time calculator client (C2).
    pub itc: Arc<ItcClient>,
    /// The smart-gcal lookup table consulted by GMOS/F2 long-slit
    /// generation (§4.4 point 2).
    pub smart_gcal: Arc<dyn SmartGcalLookup>,
    /// How many atoms beyond the next one to materialize into each
    /// phase's `possibleFuture` preview (§3).
    pub future_limit: usize,
    /// Hard ceiling on the number of atoms a single protosequence may
    /// contain before generation is rejected with `SequenceTooLong`
    /// (§4.4 "Budget ceiling", §8 scenario B).
    pub atom_count_ceiling: usize,
}

/// The outcome of one [`run`] call: either a result ready to write to the
/// entry (terminal success or terminal failure), or a transient failure
/// that should drive the entry to `Retry` instead of overwriting its
/// stored result (§7 "Propagation policy").
pub enum RunOutcome {
    /// A result to write, with the workflow state it carries.
    Settled(ObscalcResult),
    /// A transient (ITC) failure; the caller should retry with backoff
    /// rather than treat this as the observation's new result.
    Transient(GenError),
}

/// Run the full C1–C7 pipeline for `observation_id` against `ctx`.
#[tracing::instrument(skip(ctx))]
pub fn run(ctx: &ObscalcContext, observation_id: ObservationId) -> RunOutcome {
    match run_inner(ctx, observation_id) {
        Ok(result) => RunOutcome::Settled(result),
        Err(e) if e.is_transient() => RunOutcome::Transient(e),
        Err(e) => RunOutcome::Settled(error_result(ctx, observation_id, e)),
    }
}

/// Build the terminal `Error` result and its `Undefined`/`Unapproved`
/// workflow for a non-transient failure (§4.7 rule 4, §7).
fn error_result(ctx: &ObscalcContext, observation_id: ObservationId, error: GenError) -> ObscalcResult {
    let events = ctx.execution.events(observation_id);
    let inputs = WorkflowInputs {
        sequence_complete: false,
        has_executed_step: odb_sequence::EventFold::fold(&events).has_executed_step,
        user_marked_inactive: ctx.workflow.user_marked_inactive(observation_id),
        config_errors: vec![error.to_string()],
        proposal_accepted: ctx.workflow.proposal_accepted(observation_id),
        user_promoted_ready: ctx.workflow.user_promoted_ready(observation_id),
    };
    ObscalcResult::Error {
        error: error.into(),
        workflow: evaluate(&inputs),
    }
}

fn run_inner(ctx: &ObscalcContext, observation_id: ObservationId) -> Result<ObscalcResult, GenError> {
    let params = odb_core::resolver::resolve(ctx.observations.as_ref(), observation_id)?;

    let mode = build_mode(&params.mode, ctx.itc.clone(), ctx.smart_gcal.clone());
    mode.validate(&params)?;

    let itc_result = ctx.itc.integration_time(&params, true)?;
    let static_config = mode.static_config(&params);
    let _ = static_config; // validated and deterministic; not itself part of the digest

    enforce_atom_ceiling(mode.proto_acquisition(&params)?.as_mut(), ctx.atom_count_ceiling)?;
    enforce_atom_ceiling(mode.proto_science(&params)?.as_mut(), ctx.atom_count_ceiling)?;

    let events = ctx.execution.events(observation_id);
    let fold = odb_sequence::EventFold::fold(&events);
    let executed_atoms = ctx.execution.executed_atoms(observation_id);

    let (acquisition_executed, science_executed): (Vec<ConcreteAtom>, Vec<ConcreteAtom>) = executed_atoms
        .into_iter()
        .partition(|atom| atom.sequence_type == SequenceType::Acquisition);

    let mut acquisition_stream = mode.proto_acquisition(&params)?;
    let acquisition_merge = merge_sequence(MergeInput {
        protosequence: acquisition_stream.as_mut(),
        executed_atoms: &acquisition_executed,
        events: &events,
        future_limit: ctx.future_limit,
    });

    let mut science_stream = mode.proto_science(&params)?;
    let science_merge = merge_sequence(MergeInput {
        protosequence: science_stream.as_mut(),
        executed_atoms: &science_executed,
        events: &events,
        future_limit: ctx.future_limit,
    });

    let acquisition_remaining = remaining_atoms(&acquisition_merge);
    let science_remaining = remaining_atoms(&science_merge);

    let acquisition_digest = compute_digest(&acquisition_remaining).map_err(unknown_tag_to_gen_error)?;
    let science_digest = compute_digest(&science_remaining).map_err(unknown_tag_to_gen_error)?;

    let mut all_remaining = acquisition_remaining;
    all_remaining.extend(science_remaining);
    let categorized = categorized_time(&all_remaining).map_err(unknown_tag_to_gen_error)?;

    let sequence_complete = acquisition_merge.is_exhausted() && science_merge.is_exhausted();

    let workflow_inputs = WorkflowInputs {
        sequence_complete,
        has_executed_step: fold.has_executed_step,
        user_marked_inactive: ctx.workflow.user_marked_inactive(observation_id),
        config_errors: Vec::new(),
        proposal_accepted: ctx.workflow.proposal_accepted(observation_id),
        user_promoted_ready: ctx.workflow.user_promoted_ready(observation_id),
    };
    let workflow = evaluate(&workflow_inputs);

    let digest = ObscalcDigest {
        gen_params: params,
        acquisition_digest,
        science_digest,
        categorized_time: categorized,
    };

    Ok(ObscalcResult::WithTarget {
        itc: itc_result,
        digest,
        workflow,
    })
}

/// Drain a freshly built protosequence to confirm it contains no more
/// than `ceiling` atoms, without ever holding more than `ceiling + 1` of
/// them at once (§4.4 "Budget ceiling").
///
/// Every in-scope instrument family's science stream is finite (bounded
/// by its ITC-derived exposure count) and acquisition streams yield a
/// single atom, so this always terminates; it never runs against the
/// infinite protosequence shape described in §9 because that shape is
/// only ever truncated externally by `future_limit`, never drained here.
fn enforce_atom_ceiling(stream: &mut dyn odb_core::AtomStream, ceiling: usize) -> Result<(), GenError> {
    let mut count = 0usize;
    while stream.next_atom().is_some() {
        count += 1;
        if count > ceiling {
            return Err(GenError::SequenceTooLong { would_be: count, ceiling });
        }
    }
    Ok(())
}

/// Flatten a merge result's `next_atom` and `possible_future` into the
/// ordered list of atoms still to execute (§4.5 "next atom + possible
/// future").
fn remaining_atoms(merge: &odb_sequence::MergeResult) -> Vec<ConcreteAtom> {
    let mut out = Vec::with_capacity(1 + merge.possible_future.len());
    out.extend(merge.next_atom.clone());
    out.extend(merge.possible_future.iter().cloned());
    out
}

/// Dispatch `kind` to its [`odb_core::InstrumentMode`] implementation,
/// wiring in `smart_gcal` for the two families that consult it (§9
/// "Polymorphism over instruments").
fn build_mode(
    kind: &InstrumentModeKind,
    itc: Arc<ItcClient>,
    smart_gcal: Arc<dyn SmartGcalLookup>,
) -> Box<dyn odb_core::InstrumentMode> {
    match kind {
        InstrumentModeKind::GmosLongSlit { .. } => Box::new(GmosLongSlit::with_smart_gcal(itc, smart_gcal)),
        InstrumentModeKind::GmosImaging { .. } => Box::new(GmosImaging::new(itc)),
        InstrumentModeKind::Flamingos2LongSlit { .. } => {
            Box::new(Flamingos2LongSlit::with_smart_gcal(itc, smart_gcal))
        }
    }
}

/// The built-in smart-gcal stand-in used when a context is constructed
/// without a real lookup table wired in (§4.4 point 2 "Calibration
/// atoms may be inserted ... when smart-gcal lookups indicate a fresh
/// wavelength configuration is required").
pub fn default_smart_gcal() -> Arc<dyn SmartGcalLookup> {
    Arc::new(AlwaysFreshSmartGcal)
}

/// An unknown estimator tag means the time-estimation table is missing
/// an entry for an instrument family the generator emitted — a
/// programmer error, not a transient condition, but it has to surface
/// through the same `GenError` channel as every other terminal failure.
fn unknown_tag_to_gen_error(e: odb_digest::UnknownEstimatorTag) -> GenError {
    tracing::error!(tag = %e, "estimator table missing entry");
    GenError::InvalidAsterism
}
