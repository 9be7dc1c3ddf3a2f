// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Positions and ranges along a curve.

use core::cmp::Ordering;

use crate::Curve;

/// An address on a curve: a segment index and a parameter within it.
///
/// Positions are totally ordered by `(segment, t)`.
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurvePos {
    /// Index of the segment.
    pub segment: usize,
    /// Parameter within the segment, in `[0, 1]`.
    pub t: f64,
}

impl CurvePos {
    /// The start of any curve.
    pub const START: CurvePos = CurvePos { segment: 0, t: 0.0 };

    /// Create a position. `t` is clamped into `[0, 1]`; NaN becomes 0.
    pub fn new(segment: usize, t: f64) -> CurvePos {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        CurvePos { segment, t }
    }

    /// Move a position sitting on a segment boundary onto the later segment.
    ///
    /// `(i, 1)` and `(i + 1, 0)` address the same point; this picks the
    /// second unless `i` is the last segment.
    #[must_use]
    pub fn normalized_forward(self, max_segment: usize) -> CurvePos {
        if self.t >= 1.0 && self.segment < max_segment {
            CurvePos::new(self.segment + 1, 0.0)
        } else {
            self
        }
    }

    /// Move a position sitting on a segment boundary onto the earlier segment.
    #[must_use]
    pub fn normalized_backward(self) -> CurvePos {
        if self.t <= 0.0 && self.segment > 0 {
            CurvePos::new(self.segment - 1, 1.0)
        } else {
            self
        }
    }

    /// Whether both positions address the same point of a curve whose last
    /// segment is `max_segment`.
    pub fn same_point(self, other: CurvePos, max_segment: usize) -> bool {
        self.normalized_forward(max_segment) == other.normalized_forward(max_segment)
    }
}

impl PartialEq for CurvePos {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CurvePos {}

impl PartialOrd for CurvePos {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CurvePos {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segment
            .cmp(&other.segment)
            .then_with(|| self.t.total_cmp(&other.t))
    }
}

/// A sub-arc of one curve, delimited by two positions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CurveRange {
    /// Where the range starts.
    pub start: CurvePos,
    /// Where the range ends.
    pub end: CurvePos,
}

impl CurveRange {
    /// Create a range. The endpoints are swapped if given out of order.
    pub fn new(start: CurvePos, end: CurvePos) -> CurveRange {
        if end < start {
            CurveRange { start: end, end: start }
        } else {
            CurveRange { start, end }
        }
    }

    /// The full extent of a curve.
    pub fn full(curve: &Curve) -> CurveRange {
        CurveRange {
            start: CurvePos::START,
            end: curve.end_pos(),
        }
    }

    /// Whether the range is a single position.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `pos` lies within the range, endpoints included.
    pub fn contains(&self, pos: CurvePos) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Whether the ranges overlap or touch.
    pub fn intersects(&self, other: &CurveRange) -> bool {
        self.end >= other.start && self.start <= other.end
    }

    /// The smallest range covering both, if they intersect.
    pub fn union(&self, other: &CurveRange) -> Option<CurveRange> {
        if !self.intersects(other) {
            return None;
        }
        Some(CurveRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }

    /// Whether this range lies within `0..=end`, the extent of some curve.
    pub fn is_within(&self, end: CurvePos) -> bool {
        self.start <= self.end && self.end <= end
    }
}

/// Fold ranges into a minimal sorted set of disjoint ranges.
///
/// Overlapping and touching ranges are merged. Empty ranges are dropped,
/// unless they sit inside another range, in which case they vanish anyway.
pub fn coalesce(ranges: impl IntoIterator<Item = CurveRange>) -> Vec<CurveRange> {
    let mut sorted: Vec<CurveRange> = ranges.into_iter().filter(|r| !r.is_empty()).collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(a.end.cmp(&b.end)));
    let mut result: Vec<CurveRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        match result.last_mut() {
            Some(last) if last.intersects(&range) => {
                last.end = last.end.max(range.end);
            }
            _ => result.push(range),
        }
    }
    result
}

/// The gaps between sorted disjoint ranges, within the extent `0..=end`.
///
/// Includes the gap before the first and after the last range. Empty gaps
/// are omitted, so applying the complement twice returns the input.
pub fn complement(ranges: &[CurveRange], end: CurvePos) -> Vec<CurveRange> {
    let mut result = Vec::with_capacity(ranges.len() + 1);
    let mut cursor = CurvePos::START;
    for range in ranges {
        if range.start > cursor {
            result.push(CurveRange::new(cursor, range.start));
        }
        cursor = cursor.max(range.end);
    }
    if cursor < end {
        result.push(CurveRange::new(cursor, end));
    }
    result
}
