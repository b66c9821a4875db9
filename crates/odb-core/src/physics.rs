//! Wire encodings for physical quantities (§6).

use std::fmt;

/// Upper bound for the [`Extinction`] wire encoding.
pub const MAX_EXTINCTION_MILLIMAGS: u16 = 32_767;

/// Cloud extinction, wire-encoded as non-negative millimagnitudes in
/// `[0, 32767]`.
///
/// Decodes to a magnitude of `value * 10^-2`; see [`Extinction::transmission`]
/// for the corresponding sky transmission fraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct Extinction(u16);

/// The value supplied to [`Extinction::from_millimags`] exceeded the wire range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtinctionOutOfRange(pub u32);

impl fmt::Display for ExtinctionOutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "extinction {} exceeds the wire range [0, {MAX_EXTINCTION_MILLIMAGS}]",
            self.0
        )
    }
}

impl std::error::Error for ExtinctionOutOfRange {}

impl Extinction {
    /// Decode from the wire millimagnitude value.
    pub fn from_millimags(value: u32) -> Result<Self, ExtinctionOutOfRange> {
        u16::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_EXTINCTION_MILLIMAGS)
            .map(Extinction)
            .ok_or(ExtinctionOutOfRange(value))
    }

    /// Encode back to the wire millimagnitude value (inverse of
    /// [`Extinction::from_millimags`]).
    pub fn to_millimags(self) -> u32 {
        self.0 as u32
    }

    /// The decoded magnitude, `value * 10^-2`.
    pub fn magnitude(self) -> f64 {
        f64::from(self.0) * 1.0e-2
    }

    /// The sky transmission fraction, `10^(magnitude * 1000 / -2.5)`.
    ///
    /// Monotone non-increasing in the encoded extinction value.
    pub fn transmission(self) -> f64 {
        10f64.powf(self.magnitude() * 1000.0 / -2.5)
    }
}

/// Lower and upper bounds for the [`SignalToNoise`] wire encoding.
pub const MIN_MILLI_S2N: i64 = 1;
/// Upper bound for the [`SignalToNoise`] wire encoding.
pub const MAX_MILLI_S2N: i64 = 9_999_999_999;

/// A signal-to-noise ratio, wire-encoded as milli-signal-to-noise
/// (an integer `Long` in `[1, 9_999_999_999]`), i.e. `[0.001, 9_999_999.999]`
/// with three-decimal precision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct SignalToNoise(i64);

/// The value supplied was outside `[MIN_MILLI_S2N, MAX_MILLI_S2N]`, or a
/// decimal string did not encode an exact three-decimal-place value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignalToNoiseError(pub String);

impl fmt::Display for SignalToNoiseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid signal-to-noise encoding: {}", self.0)
    }
}

impl std::error::Error for SignalToNoiseError {}

impl SignalToNoise {
    /// Construct from a raw milli-signal-to-noise integer.
    pub fn from_milli(milli: i64) -> Result<Self, SignalToNoiseError> {
        if (MIN_MILLI_S2N..=MAX_MILLI_S2N).contains(&milli) {
            Ok(Self(milli))
        } else {
            Err(SignalToNoiseError(format!(
                "{milli} outside [{MIN_MILLI_S2N}, {MAX_MILLI_S2N}]"
            )))
        }
    }

    /// The raw milli-signal-to-noise integer.
    pub fn to_milli(self) -> i64 {
        self.0
    }

    /// Render as an exact three-decimal-place string, e.g. `"1234.567"`.
    ///
    /// This stands in for the source's `BigDecimal` representation: the
    /// string is exact because milli-S2N is itself the canonical
    /// fixed-point representation.
    pub fn to_big_decimal(self) -> String {
        format!("{}.{:03}", self.0 / 1000, self.0 % 1000)
    }

    /// Parse an exact three-decimal-place string produced by
    /// [`SignalToNoise::to_big_decimal`].
    ///
    /// Returns `None` (not an error) on any deviation from the canonical
    /// `whole.mmm` shape, matching the "exact" contract in §8 property 5.
    pub fn from_big_decimal_exact(s: &str) -> Option<Self> {
        let (whole, frac) = s.split_once('.')?;
        if frac.len() != 3 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        let frac: i64 = frac.parse().ok()?;
        let milli = whole.checked_mul(1000)?.checked_add(frac)?;
        Self::from_milli(milli).ok()
    }
}
