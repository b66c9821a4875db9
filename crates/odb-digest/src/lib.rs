//! Time estimation, execution digest computation, and the inbound
//! execution-event cursor (C6, and C5's digest half, §4.5–§4.6).
//!
//! [`estimator`] is the table-driven per-step time estimator;
//! [`digest`] folds a phase's atoms into a [`types::Digest`] summary;
//! [`cursor`] consumes one visit's execution-event stream resumably.
//! [`types`] also carries the in-memory charge/discount types a wire
//! serializer would walk (§6) — this crate chooses no framing for them.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cursor;
pub mod digest;
pub mod error;
pub mod estimator;
pub mod types;

pub use cursor::EventCursor;
pub use digest::compute_digest;
pub use error::UnknownEstimatorTag;
pub use estimator::{atom_time, categorized_time, step_time, EstimatorEntry};
pub use types::{CategorizedTime, ChargeDigest, Digest, Discount, DiscountKind, ExecutionTime};
