//! Machine-readable error tags and the generator's error types (§7).

use crate::id::TargetId;
use std::error::Error;
use std::fmt;

/// A stable, machine-readable error discriminator (§7 "errors carry
/// `{tag, detail, data?}`; `tag` is machine-readable and stable across
/// releases").
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorTag {
    /// The caller is not authorized for the requested operation.
    NotAuthorized,
    /// A referenced target is invalid or missing.
    InvalidTarget,
    /// The asterism is empty or otherwise malformed.
    InvalidAsterism,
    /// A target is missing a spectral energy distribution.
    MissingSed,
    /// The exposure-time mode is malformed.
    InvalidExposureTimeMode,
    /// The ITC call failed.
    ItcError,
    /// No sequence is currently available for this observation.
    SequenceUnavailable,
    /// The generated sequence would exceed the atom-count ceiling.
    SequenceTooLong,
    /// The requested workflow transition is not legal from the current state.
    InvalidWorkflowTransition,
    /// A caller-supplied argument was invalid.
    InvalidArgument,
    /// No data is available to answer the request.
    NoData,
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::InvalidTarget => "INVALID_TARGET",
            Self::InvalidAsterism => "INVALID_ASTERISM",
            Self::MissingSed => "MISSING_SED",
            Self::InvalidExposureTimeMode => "INVALID_EXPOSURE_TIME_MODE",
            Self::ItcError => "ITC_ERROR",
            Self::SequenceUnavailable => "SEQUENCE_UNAVAILABLE",
            Self::SequenceTooLong => "SEQUENCE_TOO_LONG",
            Self::InvalidWorkflowTransition => "INVALID_WORKFLOW_TRANSITION",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NoData => "NO_DATA",
        };
        write!(f, "{s}")
    }
}

/// A user-visible error: `{tag, detail, data?}` (§7).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OdbError {
    /// Stable, machine-readable discriminator.
    pub tag: ErrorTag,
    /// Human-readable explanation.
    pub detail: String,
    /// Optional structured context (e.g. the offending target id as a string).
    pub data: Option<Vec<(String, String)>>,
}

impl fmt::Display for OdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.tag, self.detail)
    }
}

impl Error for OdbError {}

/// Errors produced by the params resolver (C1) and protosequence
/// generator (C4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenError {
    /// The observation has no target.
    MissingTarget,
    /// The observation has no instrument mode configured.
    MissingMode,
    /// A target in the asterism has no defined SED.
    MissingSed(TargetId),
    /// The integration-time calculator returned an error.
    ItcError(String),
    /// The asterism is invalid (e.g. conflicting bands or profiles).
    InvalidAsterism,
    /// The exposure-time mode is malformed or unsupported.
    InvalidExposureTimeMode,
    /// Generation would exceed the atom-count ceiling.
    SequenceTooLong {
        /// The atom count that would have been produced.
        would_be: usize,
        /// The configured ceiling.
        ceiling: usize,
    },
    /// The caller is not authorized to generate this observation's sequence.
    NotAuthorized,
    /// Flamingos-2 long-slit generation found no on-slit science step.
    NotOnSlit,
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTarget => write!(f, "observation is missing target"),
            Self::MissingMode => write!(f, "observation is missing an instrument mode"),
            Self::MissingSed(id) => write!(f, "target {id} is missing a spectral energy distribution"),
            Self::ItcError(msg) => write!(f, "integration time calculator error: {msg}"),
            Self::InvalidAsterism => write!(f, "asterism is invalid"),
            Self::InvalidExposureTimeMode => write!(f, "exposure time mode is invalid"),
            Self::SequenceTooLong { would_be, ceiling } => write!(
                f,
                "sequence would contain {would_be} atoms, exceeding the ceiling of {ceiling}"
            ),
            Self::NotAuthorized => write!(f, "not authorized"),
            Self::NotOnSlit => write!(f, "no science step falls on-slit"),
        }
    }
}

impl Error for GenError {}

impl GenError {
    /// The stable error tag for this error.
    pub fn tag(&self) -> ErrorTag {
        match self {
            Self::MissingTarget => ErrorTag::InvalidTarget,
            Self::MissingMode => ErrorTag::InvalidArgument,
            Self::MissingSed(_) => ErrorTag::MissingSed,
            Self::ItcError(_) => ErrorTag::ItcError,
            Self::InvalidAsterism => ErrorTag::InvalidAsterism,
            Self::InvalidExposureTimeMode => ErrorTag::InvalidExposureTimeMode,
            Self::SequenceTooLong { .. } => ErrorTag::SequenceTooLong,
            Self::NotAuthorized => ErrorTag::NotAuthorized,
            Self::NotOnSlit => ErrorTag::InvalidArgument,
        }
    }

    /// `true` if this error is transient and should trigger an obscalc
    /// `Retry` rather than a terminal result (§7 "Propagation policy").
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ItcError(_))
    }
}

impl From<GenError> for OdbError {
    fn from(e: GenError) -> Self {
        let data = match &e {
            GenError::MissingSed(id) => Some(vec![("targetId".to_string(), id.to_string())]),
            GenError::SequenceTooLong { would_be, ceiling } => Some(vec![
                ("wouldBe".to_string(), would_be.to_string()),
                ("ceiling".to_string(), ceiling.to_string()),
            ]),
            _ => None,
        };
        OdbError {
            tag: e.tag(),
            detail: e.to_string(),
            data,
        }
    }
}
