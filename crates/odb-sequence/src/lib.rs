//! Execution-event folding and protosequence/execution-history merge
//! (C5, §4.5).
//!
//! [`events`] defines the inbound [`events::ExecutionEvent`] stream and
//! folds it into per-step completion state; [`merge`] combines that
//! state with a protosequence ([`odb_core::AtomStream`]) to produce the
//! next atom to execute plus a bounded window of possible future atoms,
//! preserving atom identity for in-progress atoms and minting none of
//! its own (§9 "Ownership of atom identity").

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod events;
pub mod fold;
pub mod merge;

pub use events::{DatasetStage, ExecutionEvent, ExecutionEventKind, ExecutionStage, QaState, SequenceCommand};
pub use fold::EventFold;
pub use merge::{merge_sequence, MergeInput, MergeResult};
