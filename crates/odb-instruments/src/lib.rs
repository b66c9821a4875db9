//! GMOS long-slit, GMOS imaging, and Flamingos-2 long-slit instrument-mode
//! implementations (C4, §4.4, §9 "Polymorphism over instruments").
//!
//! Each instrument family implements [`odb_core::InstrumentMode`]
//! directly rather than through a separate per-site type: GMOS long-slit
//! and GMOS imaging each read `Site` out of their own
//! [`odb_core::InstrumentModeKind`] variant and branch internally, so the
//! north/south distinction never leaks into a type tag. [`for_mode`]
//! dispatches a resolved [`odb_core::GenParams`]' mode to the matching
//! implementation; the generator and the obscalc pipeline never match on
//! instrument tags themselves.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod acquisition;
pub mod defaults;
pub mod flamingos2_long_slit;
pub mod gmos_imaging;
pub mod gmos_long_slit;
pub mod smart_gcal;
pub mod streams;

pub use flamingos2_long_slit::Flamingos2LongSlit;
pub use gmos_imaging::GmosImaging;
pub use gmos_long_slit::GmosLongSlit;
pub use smart_gcal::{AlwaysFreshSmartGcal, SmartGcalLookup};

use odb_core::{InstrumentMode, InstrumentModeKind};
use odb_itc::ItcClient;
use std::sync::Arc;

/// Build the [`InstrumentMode`] implementation matching `kind`, backed by
/// `itc` (§9 "dispatch on the tag").
///
/// This is the one place the generator's instrument family is chosen by
/// matching a tag; every other component is generic over `dyn
/// InstrumentMode`.
pub fn for_mode(kind: &InstrumentModeKind, itc: Arc<ItcClient>) -> Box<dyn InstrumentMode> {
    match kind {
        InstrumentModeKind::GmosLongSlit { .. } => Box::new(GmosLongSlit::new(itc)),
        InstrumentModeKind::GmosImaging { .. } => Box::new(GmosImaging::new(itc)),
        InstrumentModeKind::Flamingos2LongSlit { .. } => Box::new(Flamingos2LongSlit::new(itc)),
    }
}
