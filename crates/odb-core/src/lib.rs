//! Core types, errors, and traits for the ODB sequence generator.
//!
//! This is the leaf crate in the workspace's dependency graph (besides
//! `odb-time`): identifiers, the sequence data model, `GenParams`, error
//! tags, and the capability traits (`InstrumentMode`, `ObservationSource`,
//! `AtomStream`) that every other crate dispatches through.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod genparams;
pub mod id;
pub mod nullable;
pub mod physics;
pub mod resolver;
pub mod traits;

pub use domain::{
    ArcLamp, AsterismMember, Atom, Band, ChargeClass, EmptyAtomError, F2Disperser, F2ReadMode,
    FlatLamp, GcalConfig, GcalDiffuser, GcalLamp, GmosGrating, Guiding, InstrumentConfig,
    IntegrationTime, Offset, ObserveClass, SequenceType, Site, SnrResult, SourceProfile, Step,
    StepConfig, StepFingerprint, TelescopeConfig, TimeSpan, WavelengthPm,
};
pub use error::{ErrorTag, GenError, OdbError};
pub use genparams::{
    AcquisitionOverrides, Constraints, ExposureTimeMode, GenParams, InstrumentModeKind, Percentile,
};
pub use id::{
    AtomId, DatasetId, DatasetReference, ObservationId, ObservationReference, ProgramId,
    ProgramReference, ReferenceParseError, SemesterHalf, StepId, TargetId, UserInvitation, VisitId,
};
pub use nullable::Nullable;
pub use physics::{Extinction, ExtinctionOutOfRange, SignalToNoise, SignalToNoiseError};
pub use traits::{
    AtomStream, ConcreteAtom, ConcreteStep, InstrumentMode, ObservationSource, RawAsterismEntry,
    StaticConfig,
};
