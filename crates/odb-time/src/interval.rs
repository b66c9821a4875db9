//! Half-open timestamp intervals.

use crate::timestamp::Timestamp;
use std::fmt;

/// A half-open interval `[start, end)` of [`Timestamp`]s.
///
/// `start <= end` is a construction invariant; a zero-width interval
/// (`start == end`) is legal and represents an empty span.
#[derive(Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TimestampInterval {
    start: Timestamp,
    end: Timestamp,
}

impl fmt::Debug for TimestampInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.start, self.end)
    }
}

impl TimestampInterval {
    /// Construct `[start, end)`. Returns `None` if `start > end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Exclusive upper bound.
    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// `true` if the interval contains no instants.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `true` if `t` lies within `[start, end)`.
    pub fn contains(&self, t: Timestamp) -> bool {
        self.start <= t && t < self.end
    }

    /// `true` if `self` and `other` share any instant.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// `true` if `self` and `other` share an endpoint but no interior
    /// (i.e. one ends exactly where the other begins).
    pub fn abuts(&self, other: &Self) -> bool {
        self.end == other.start || other.end == self.start
    }

    /// `true` if `self` and `other` overlap or abut — i.e. their union
    /// would be a single contiguous interval.
    pub fn touches(&self, other: &Self) -> bool {
        self.overlaps(other) || self.abuts(other)
    }

    /// The overlapping portion of `self` and `other`, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Self { start, end })
    }

    /// The union of `self` and `other`, if they touch.
    ///
    /// Returns `None` if there is a gap between the two intervals.
    pub fn union(&self, other: &Self) -> Option<Self> {
        self.touches(other)
            .then(|| Self {
                start: self.start.min(other.start),
                end: self.end.max(other.end),
            })
    }

    /// Subtract `other` from `self`, returning zero, one, or two
    /// remaining pieces (a middle subtraction splits the interval in two).
    pub fn minus(&self, other: &Self) -> Vec<Self> {
        let Some(overlap) = self.intersection(other) else {
            return vec![*self];
        };
        let mut pieces = Vec::with_capacity(2);
        if self.start < overlap.start {
            pieces.push(Self {
                start: self.start,
                end: overlap.start,
            });
        }
        if overlap.end < self.end {
            pieces.push(Self {
                start: overlap.end,
                end: self.end,
            });
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(micros: i64) -> Timestamp {
        Timestamp::new(micros).unwrap()
    }

    fn iv(a: i64, b: i64) -> TimestampInterval {
        TimestampInterval::new(ts(a), ts(b)).unwrap()
    }

    #[test]
    fn new_rejects_inverted() {
        assert!(TimestampInterval::new(ts(10), ts(0)).is_none());
    }

    #[test]
    fn contains_is_half_open() {
        let i = iv(0, 10);
        assert!(i.contains(ts(0)));
        assert!(!i.contains(ts(10)));
    }

    #[test]
    fn overlap_and_abut_distinct() {
        let a = iv(0, 10);
        let b = iv(10, 20);
        assert!(!a.overlaps(&b));
        assert!(a.abuts(&b));
        assert!(a.touches(&b));

        let c = iv(5, 15);
        assert!(a.overlaps(&c));
        assert!(!a.abuts(&c));
    }

    #[test]
    fn union_requires_touching() {
        let a = iv(0, 10);
        let b = iv(20, 30);
        assert!(a.union(&b).is_none());

        let c = iv(10, 20);
        assert_eq!(a.union(&c), Some(iv(0, 20)));
    }

    #[test]
    fn minus_splits_middle() {
        let whole = iv(0, 30);
        let middle = iv(10, 20);
        let pieces = whole.minus(&middle);
        assert_eq!(pieces, vec![iv(0, 10), iv(20, 30)]);
    }

    #[test]
    fn minus_disjoint_is_noop() {
        let a = iv(0, 10);
        let b = iv(20, 30);
        assert_eq!(a.minus(&b), vec![a]);
    }

    #[test]
    fn minus_full_overlap_empties() {
        let a = iv(0, 10);
        assert!(a.minus(&a).is_empty());
    }
}
