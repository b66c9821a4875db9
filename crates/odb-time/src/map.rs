//! An ordered collection of adjacent, non-overlapping intervals mapping to `V`.

use crate::interval::TimestampInterval;
use crate::timestamp::Timestamp;
use std::fmt;

/// Error returned by [`ContiguousTimestampMap`] mutating operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The supplied interval neither overlaps nor abuts existing coverage
    /// (`add` requires contiguity with what is already stored).
    Disjoint,
    /// The supplied interval overlaps existing coverage with a different
    /// value, which would violate the single-contiguous-coverage invariant.
    ConflictingOverlap,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disjoint => write!(f, "interval does not touch existing coverage"),
            Self::ConflictingOverlap => {
                write!(f, "interval overlaps existing coverage with a different value")
            }
        }
    }
}

impl std::error::Error for MapError {}

/// Ordered, non-overlapping intervals covering a single contiguous span
/// (or empty), each mapped to a value `V`.
///
/// Invariants maintained by construction:
/// 1. Intervals are totally ordered and pairwise disjoint.
/// 2. The stored intervals form one contiguous coverage, or the map is empty.
/// 3. Two adjacent intervals with equal values are merged into one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContiguousTimestampMap<V> {
    entries: Vec<(TimestampInterval, V)>,
}

impl<V> Default for ContiguousTimestampMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V: Clone + PartialEq> ContiguousTimestampMap<V> {
    /// An empty map.
    pub fn empty() -> Self {
        Self::default()
    }

    /// `true` if the map covers no instants.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The full covered span, or `None` if empty.
    pub fn coverage(&self) -> Option<TimestampInterval> {
        match (self.entries.first(), self.entries.last()) {
            (Some((first, _)), Some((last, _))) => {
                TimestampInterval::new(first.start(), last.end())
            }
            _ => None,
        }
    }

    /// Iterate stored `(interval, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = &(TimestampInterval, V)> {
        self.entries.iter()
    }

    /// Look up the value covering instant `t`, if any.
    pub fn get(&self, t: Timestamp) -> Option<&V> {
        self.entries
            .iter()
            .find(|(iv, _)| iv.contains(t))
            .map(|(_, v)| v)
    }

    /// Add `(interval, value)`, merging with adjacent equal-valued entries.
    ///
    /// Fails with [`MapError::Disjoint`] if the map is non-empty and
    /// `interval` does not touch existing coverage. Fails with
    /// [`MapError::ConflictingOverlap`] if `interval` overlaps existing
    /// coverage with a different value.
    pub fn add(&self, interval: TimestampInterval, value: V) -> Result<Self, MapError> {
        if !self.entries.is_empty() {
            let cov = self.coverage().expect("non-empty has coverage");
            if !cov.touches(&interval) {
                return Err(MapError::Disjoint);
            }
            for (iv, v) in &self.entries {
                if iv.overlaps(&interval) && *v != value {
                    return Err(MapError::ConflictingOverlap);
                }
            }
        }

        let mut merged: Vec<(TimestampInterval, V)> = Vec::with_capacity(self.entries.len() + 1);
        let mut inserted = false;
        let mut pending = interval;
        let mut pending_value = value;

        for (iv, v) in &self.entries {
            if iv.end() < pending.start() || (iv.end() == pending.start() && *v != pending_value) {
                merged.push((*iv, v.clone()));
                continue;
            }
            if iv.start() > pending.end() || (iv.start() == pending.end() && *v != pending_value) {
                if !inserted {
                    merged.push((pending, pending_value.clone()));
                    inserted = true;
                }
                merged.push((*iv, v.clone()));
                continue;
            }
            // Overlaps or abuts with the same value: fold into `pending`.
            let start = pending.start().min(iv.start());
            let end = pending.end().max(iv.end());
            pending = TimestampInterval::new(start, end).expect("start <= end by construction");
            pending_value = v.clone();
        }
        if !inserted {
            merged.push((pending, pending_value));
        }

        Ok(Self { entries: merged })
    }

    /// Union `self` with `other`, provided their coverages touch (or either
    /// is empty).
    pub fn union(&self, other: &Self) -> Result<Self, MapError> {
        if other.entries.is_empty() {
            return Ok(self.clone());
        }
        if self.entries.is_empty() {
            return Ok(other.clone());
        }
        let a_cov = self.coverage().expect("non-empty");
        let b_cov = other.coverage().expect("non-empty");
        if !a_cov.touches(&b_cov) {
            return Err(MapError::Disjoint);
        }
        let mut acc = self.clone();
        for (iv, v) in &other.entries {
            acc = acc.add(*iv, v.clone())?;
        }
        Ok(acc)
    }

    /// Restrict the map to `range`, clipping boundary intervals.
    pub fn slice(&self, range: TimestampInterval) -> Self {
        let entries = self
            .entries
            .iter()
            .filter_map(|(iv, v)| iv.intersection(&range).map(|clipped| (clipped, v.clone())))
            .collect();
        Self { entries }
    }

    /// Find the sub-intervals of `range` not covered by this map.
    pub fn find_missing(&self, range: TimestampInterval) -> Vec<TimestampInterval> {
        let mut missing = vec![range];
        for (iv, _) in &self.entries {
            missing = missing
                .into_iter()
                .flat_map(|m| m.minus(iv))
                .filter(|m| !m.is_empty())
                .collect();
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(micros: i64) -> Timestamp {
        Timestamp::new(micros).unwrap()
    }

    fn iv(a: i64, b: i64) -> TimestampInterval {
        TimestampInterval::new(ts(a), ts(b)).unwrap()
    }

    #[test]
    fn add_to_empty_succeeds() {
        let m = ContiguousTimestampMap::empty();
        let m = m.add(iv(0, 10), "a").unwrap();
        assert_eq!(m.coverage(), Some(iv(0, 10)));
    }

    #[test]
    fn add_disjoint_fails() {
        let m = ContiguousTimestampMap::empty().add(iv(0, 10), "a").unwrap();
        assert_eq!(m.add(iv(20, 30), "a"), Err(MapError::Disjoint));
    }

    #[test]
    fn add_merges_equal_adjacent() {
        let m = ContiguousTimestampMap::empty()
            .add(iv(0, 10), "a")
            .unwrap()
            .add(iv(10, 20), "a")
            .unwrap();
        assert_eq!(m.iter().count(), 1);
        assert_eq!(m.coverage(), Some(iv(0, 20)));
    }

    #[test]
    fn add_keeps_distinct_adjacent_values_separate() {
        let m = ContiguousTimestampMap::empty()
            .add(iv(0, 10), "a")
            .unwrap()
            .add(iv(10, 20), "b")
            .unwrap();
        assert_eq!(m.iter().count(), 2);
    }

    #[test]
    fn add_order_independent() {
        let forward = ContiguousTimestampMap::empty()
            .add(iv(0, 10), "a")
            .unwrap()
            .add(iv(10, 20), "b")
            .unwrap();
        let backward = ContiguousTimestampMap::empty()
            .add(iv(10, 20), "b")
            .unwrap()
            .add(iv(0, 10), "a")
            .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn slice_clips_boundaries() {
        let m = ContiguousTimestampMap::empty()
            .add(iv(0, 10), "a")
            .unwrap()
            .add(iv(10, 20), "b")
            .unwrap();
        let s = m.slice(iv(5, 15));
        assert_eq!(s.coverage(), Some(iv(5, 15)));
        assert_eq!(s.iter().count(), 2);
    }

    #[test]
    fn find_missing_reports_gaps() {
        let m = ContiguousTimestampMap::empty().add(iv(0, 10), "a").unwrap();
        let missing = m.find_missing(iv(0, 30));
        assert_eq!(missing, vec![iv(10, 30)]);
    }

    #[test]
    fn find_missing_full_map_is_empty() {
        let m = ContiguousTimestampMap::empty().add(iv(0, 10), "a").unwrap();
        assert!(m.find_missing(iv(0, 10)).is_empty());
    }

    #[test]
    fn union_of_touching_maps() {
        let a = ContiguousTimestampMap::empty().add(iv(0, 10), "a").unwrap();
        let b = ContiguousTimestampMap::empty().add(iv(10, 20), "b").unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.coverage(), Some(iv(0, 20)));
    }

    #[test]
    fn union_of_disjoint_fails() {
        let a = ContiguousTimestampMap::empty().add(iv(0, 10), "a").unwrap();
        let b = ContiguousTimestampMap::empty().add(iv(20, 30), "b").unwrap();
        assert_eq!(a.union(&b), Err(MapError::Disjoint));
    }

    proptest! {
        #[test]
        fn add_is_order_independent_for_any_adjacent_partition(
            lengths in proptest::collection::vec(1i64..50, 2..12),
            values in proptest::collection::vec(0u8..4, 2..12),
        ) {
            let n = lengths.len().min(values.len());
            let mut bounds = vec![0i64];
            for &len in lengths.iter().take(n) {
                bounds.push(bounds.last().unwrap() + len);
            }
            let segments: Vec<(TimestampInterval, u8)> = (0..n)
                .map(|i| (iv(bounds[i], bounds[i + 1]), values[i]))
                .collect();

            let forward = segments.iter().try_fold(
                ContiguousTimestampMap::empty(),
                |m, (interval, v)| m.add(*interval, *v),
            );
            let backward = segments.iter().rev().try_fold(
                ContiguousTimestampMap::empty(),
                |m, (interval, v)| m.add(*interval, *v),
            );

            prop_assert_eq!(forward.is_ok(), backward.is_ok());
            if let (Ok(f), Ok(b)) = (forward, backward) {
                prop_assert_eq!(f, b);
            }
        }
    }
}
