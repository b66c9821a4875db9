//! Background calculation engine tracking per-observation obscalc
//! lifecycle for the ODB sequence generator (C8, §4.8).
//!
//! Wires the C1–C7 sequence-generation pipeline into a worker pool that
//! claims invalidated observations from a shared [`EntryTable`], settles
//! each against [`ObscalcContext`]'s collaborators, and writes the result
//! back with the CAS-like `lastInvalidation`/`lastUpdate` check described
//! in §4.8 and §5.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod engine;
pub mod entry;
pub mod ingress;
pub mod metrics;
pub mod pipeline;
pub mod queue;
pub mod source;
pub mod worker;

pub use config::{BackoffConfig, ConfigError, ObscalcConfig};
pub use engine::{EngineHandle, ObscalcEngine};
pub use entry::{Entry, EntryState, Lease, ObscalcDigest, ObscalcResult};
pub use ingress::{IngressQueue, Invalidation, InvalidationCause};
pub use metrics::EngineMetrics;
pub use pipeline::{default_smart_gcal, ObscalcContext, RunOutcome};
pub use queue::EntryTable;
pub use source::{EmptyHistory, ExecutionSource, WorkflowSource};
pub use worker::Worker;
