//! Errors raised by the time estimator (§4.6).

use std::fmt;

/// The time-estimator table has no entry for the requested lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownEstimatorTag {
    /// The tag that was looked up.
    pub tag: String,
}

impl fmt::Display for UnknownEstimatorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no time-estimator entry for tag {:?}", self.tag)
    }
}

impl std::error::Error for UnknownEstimatorTag {}

impl From<UnknownEstimatorTag> for odb_core::OdbError {
    fn from(e: UnknownEstimatorTag) -> Self {
        odb_core::OdbError {
            tag: odb_core::ErrorTag::NoData,
            detail: e.to_string(),
            data: Some(vec![("tag".to_string(), e.tag)]),
        }
    }
}
