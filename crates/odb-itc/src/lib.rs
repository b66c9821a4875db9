//! Integration time calculator client and fingerprint cache (C2, §4.2).
//!
//! Wraps an out-of-scope calculator service behind a cache that
//! coalesces concurrent identical requests ("singleflight") and bounds
//! memory with LRU eviction, keyed by a commit-hash-salted fingerprint
//! of the request (§9 "Cache keys").

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod backend;
mod cache;
mod client;
mod types;

pub use backend::ItcBackend;
pub use cache::SingleflightLruCache;
pub use client::{ItcClient, ItcClientConfig, DEFAULT_CACHE_CAPACITY};
pub use types::{ItcInput, ItcVersions};
