//! Microsecond-truncated instants bounded to the legal database range.

use std::fmt;

/// Earliest legal [`Timestamp`], matching Postgres' `timestamp` lower bound
/// (4713-01-01 BC), expressed as microseconds since the Unix epoch.
pub const MIN_MICROS: i64 = -210_866_803_200_000_000;

/// Latest legal [`Timestamp`] (294276-12-31), expressed as microseconds
/// since the Unix epoch.
pub const MAX_MICROS: i64 = 9_224_318_015_999_999_999 / 1_000;

/// A microsecond-truncated instant, totally ordered, bounded to
/// `[MIN_MICROS, MAX_MICROS]`.
///
/// Constructing a [`Timestamp`] truncates any sub-microsecond precision
/// and rejects values outside the legal database range.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Timestamp(i64);

/// The value supplied to [`Timestamp::new`] fell outside the legal range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampOutOfRange {
    /// The out-of-range microsecond value that was rejected.
    pub micros: i64,
}

impl fmt::Display for TimestampOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timestamp {} microseconds is outside the legal range [{MIN_MICROS}, {MAX_MICROS}]",
            self.micros
        )
    }
}

impl std::error::Error for TimestampOutOfRange {}

impl Timestamp {
    /// Construct a timestamp from microseconds since the Unix epoch.
    ///
    /// Fails if `micros` is outside `[MIN_MICROS, MAX_MICROS]`.
    pub fn new(micros: i64) -> Result<Self, TimestampOutOfRange> {
        if (MIN_MICROS..=MAX_MICROS).contains(&micros) {
            Ok(Self(micros))
        } else {
            Err(TimestampOutOfRange { micros })
        }
    }

    /// The earliest legal timestamp.
    pub const fn min_value() -> Self {
        Self(MIN_MICROS)
    }

    /// The latest legal timestamp.
    pub const fn max_value() -> Self {
        Self(MAX_MICROS)
    }

    /// Microseconds since the Unix epoch.
    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Add a duration in microseconds, saturating at the legal bounds.
    pub fn plus_micros(self, micros: i64) -> Self {
        Self(self.0.saturating_add(micros).clamp(MIN_MICROS, MAX_MICROS))
    }

    /// Microseconds elapsed from `self` to `other` (may be negative).
    pub fn micros_until(self, other: Self) -> i64 {
        other.0 - self.0
    }

    /// The current wall-clock instant, clamped to the legal range.
    ///
    /// Used by the obscalc engine to stamp invalidations and lease
    /// expiry (§4.8); never fails, since the system clock is always
    /// well within `[MIN_MICROS, MAX_MICROS]`.
    pub fn now() -> Self {
        let micros = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        Self(micros.clamp(MIN_MICROS, MAX_MICROS))
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}us)", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}
