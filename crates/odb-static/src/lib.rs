//! The static configuration builder (C3, §4.3).
//!
//! A pure, total function from a resolved [`GenParams`] to an
//! instrument's [`StaticConfig`]: stage mode, detector, and
//! nod-and-shuffle settings. No side effects, no suspension points — the
//! generator calls it synchronously on the same thread as the rest of
//! generation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use odb_core::{GenError, GenParams, InstrumentMode, StaticConfig};

/// Validate `params` against `mode`'s constraints, then build its static
/// configuration.
///
/// A thin wrapper: all instrument-specific knowledge lives behind
/// [`InstrumentMode`], never here. This function exists so callers have
/// one place to get "validated static config" without separately calling
/// `validate` and `static_config` in the right order.
#[tracing::instrument(skip(mode, params))]
pub fn build_static_config(
    mode: &dyn InstrumentMode,
    params: &GenParams,
) -> Result<StaticConfig, GenError> {
    mode.validate(params)?;
    Ok(mode.static_config(params))
}
