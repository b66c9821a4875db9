//! Timestamp, interval, and contiguous-coverage map primitives.
//!
//! This is a leaf crate with no internal ODB dependencies: [`Timestamp`],
//! [`TimestampInterval`], and [`ContiguousTimestampMap`] are the
//! fundamental time sum-types the rest of the generator builds on (§3,
//! §9's "fundamental sum types" note).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod interval;
pub mod map;
pub mod timestamp;

pub use interval::TimestampInterval;
pub use map::{ContiguousTimestampMap, MapError};
pub use timestamp::{Timestamp, TimestampOutOfRange};
