//! Workflow state derivation and transition legality (C7, §4.7).
//!
//! An observation's workflow state is entirely derived — never stored
//! directly — from three inputs: configuration validity, proposal
//! acceptance, and execution history. [`evaluate`] applies the §4.7
//! rules in order (first match wins); [`valid_transitions`] and
//! [`apply_transition`] expose which user-requested transitions are
//! legal from a given state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod evaluator;
mod state;
mod transitions;

pub use evaluator::{evaluate, WorkflowInputs};
pub use state::WorkflowState;
pub use transitions::{apply_transition, valid_transitions, InvalidWorkflowTransition};
