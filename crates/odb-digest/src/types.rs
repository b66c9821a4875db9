//! In-memory digest and charge types (§4.5 "Digest", §4.6 `CategorizedTime`,
//! §6 "Wire format for digests").
//!
//! No wire-protocol framing is implemented here (out of scope per the
//! Non-goals): these types carry `serde::Serialize`/`Deserialize` derives
//! so a caller can wire them up with whatever framing it chooses.

use odb_core::{ChargeClass, ObserveClass, Offset, TimeSpan};

/// A summary over one phase (acquisition or science) of a merged
/// sequence (§4.5 "Digest").
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Digest {
    /// Union of telescope offsets used across the phase's atoms.
    pub offsets: Vec<Offset>,
    /// Sum of per-step time estimates across the phase.
    pub total_time: TimeSpan,
    /// Number of atoms in the phase.
    pub atom_count: u32,
    /// The phase's observe class: `Science` if any science step is
    /// present, else the least-specific calibration/acquisition class
    /// seen, or `None` if the phase contains no steps at all.
    pub observe_class: Option<ObserveClass>,
}

/// Total estimated execution time broken down by charge class (§4.6
/// `CategorizedTime`).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CategorizedTime {
    /// Time charged against the PI's program allocation.
    pub program: TimeSpan,
    /// Time charged against partner time.
    pub partner: TimeSpan,
    /// Time not charged to any allocation.
    pub non_charged: TimeSpan,
}

impl CategorizedTime {
    /// Add `time` to the bucket named by `class`.
    pub fn add(&mut self, class: ChargeClass, time: TimeSpan) {
        match class {
            ChargeClass::Program => self.program = self.program.plus(time),
            ChargeClass::Partner => self.partner = self.partner.plus(time),
            ChargeClass::NonCharged => self.non_charged = self.non_charged.plus(time),
        }
    }

    /// The sum across all three buckets.
    pub fn total(&self) -> TimeSpan {
        self.program.plus(self.partner).plus(self.non_charged)
    }
}

/// The wire-facing execution time breakdown for a computed charge (§6).
///
/// Field names mirror [`CategorizedTime`] but this type is the one a
/// serializer walks to produce the external digest payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecutionTime {
    /// Time not charged to any allocation.
    pub non_charged: TimeSpan,
    /// Time charged against partner time.
    pub partner: TimeSpan,
    /// Time charged against the PI's program allocation.
    pub program: TimeSpan,
}

impl From<CategorizedTime> for ExecutionTime {
    fn from(c: CategorizedTime) -> Self {
        Self {
            non_charged: c.non_charged,
            partner: c.partner,
            program: c.program,
        }
    }
}

/// The kind of adjustment a [`Discount`] applies (§6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    /// Time lost to daylight (instrument unusable in daytime conditions).
    Daylight,
    /// Time lost to an equipment or operations fault.
    Fault,
    /// Time for which no data was produced.
    NoData,
    /// Time overlapping another charged interval.
    Overlap,
    /// Time discounted for failing quality assurance.
    Qa,
    /// Time lost to weather.
    Weather,
}

/// One deduction applied against [`ExecutionTime`] when computing a
/// final charge (§6).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Discount {
    /// Why this discount was applied.
    pub kind: DiscountKind,
    /// How much time it removes.
    pub amount: TimeSpan,
    /// Optional free-text justification.
    pub comment: Option<String>,
}

/// A fully computed charge: the raw execution time, every discount
/// applied against it, and the resulting final charge (§6).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ChargeDigest {
    /// Execution time before discounts.
    pub execution_time: ExecutionTime,
    /// Discounts applied, in the order they were recorded.
    pub discounts: Vec<Discount>,
    /// `execution_time`'s total minus the sum of `discounts`, floored at
    /// zero.
    pub final_charge: TimeSpan,
}

impl ChargeDigest {
    /// Build a charge digest from raw execution time and a set of
    /// discounts, computing `final_charge`.
    pub fn new(execution_time: ExecutionTime, discounts: Vec<Discount>) -> Self {
        let gross = execution_time.non_charged.plus(execution_time.partner).plus(execution_time.program);
        let discounted = discounts.iter().fold(TimeSpan::ZERO, |acc, d| acc.plus(d.amount));
        let final_charge = if discounted.as_micros() >= gross.as_micros() {
            TimeSpan::ZERO
        } else {
            TimeSpan::from_micros(gross.as_micros() - discounted.as_micros())
        };
        Self {
            execution_time,
            discounts,
            final_charge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorized_time_buckets_by_class() {
        let mut ct = CategorizedTime::default();
        ct.add(ChargeClass::Program, TimeSpan::from_seconds(10.0));
        ct.add(ChargeClass::Partner, TimeSpan::from_seconds(5.0));
        ct.add(ChargeClass::NonCharged, TimeSpan::from_seconds(1.0));
        assert_eq!(ct.total(), TimeSpan::from_seconds(16.0));
    }

    #[test]
    fn charge_digest_floors_at_zero() {
        let et = ExecutionTime {
            non_charged: TimeSpan::from_seconds(1.0),
            partner: TimeSpan::ZERO,
            program: TimeSpan::ZERO,
        };
        let discounts = vec![Discount {
            kind: DiscountKind::Weather,
            amount: TimeSpan::from_seconds(5.0),
            comment: None,
        }];
        let digest = ChargeDigest::new(et, discounts);
        assert_eq!(digest.final_charge, TimeSpan::ZERO);
    }

    #[test]
    fn charge_digest_subtracts_discounts() {
        let et = ExecutionTime {
            non_charged: TimeSpan::ZERO,
            partner: TimeSpan::ZERO,
            program: TimeSpan::from_seconds(100.0),
        };
        let discounts = vec![Discount {
            kind: DiscountKind::Qa,
            amount: TimeSpan::from_seconds(30.0),
            comment: Some("retake required".to_string()),
        }];
        let digest = ChargeDigest::new(et, discounts);
        assert_eq!(digest.final_charge, TimeSpan::from_seconds(70.0));
    }
}
