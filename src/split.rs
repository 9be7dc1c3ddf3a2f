// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting, point insertion and resampling.
//!
//! All of these operations preserve the shape of the curve exactly (up to
//! floating point rounding). They do so by never moving a surviving control
//! point. Instead, the controls next to a cut get new weights, solved in
//! closed form.
//!
//! Every control next to a cut lies on the line between two original
//! controls `a` and `b`. Points on that line are described by a parameter
//! `u`, with `a` at 0 and `b` at 1. The original connecting point sits at
//! `u = a.weight`, and de Casteljau subdivision places the new controls at
//! known values of `u`. The new weight is then the ratio of two such
//! differences, see [`solve_weight`]. Pressure is affine in the same
//! parameter, so the same weight reproduces the pressure profile as well.

use crate::control::NEUTRAL_WEIGHT;
use crate::tuning::DEFAULT_ACCURACY;
use crate::{ControlPoint, Curve, CurveError, CurvePos, CurveRange, CurveSegment};

/// The weight placing a connecting point at `u` between controls at `u0` and `u1`.
///
/// All three are parameters along one line. A zero denominator yields the
/// neutral weight.
pub fn solve_weight(u: f64, u0: f64, u1: f64) -> f64 {
    let denom = u1 - u0;
    if denom.abs() <= f64::EPSILON {
        return NEUTRAL_WEIGHT;
    }
    ((u - u0) / denom).clamp(0.0, 1.0)
}

/// The three controls describing one segment on its own.
fn segment_controls(seg: &CurveSegment) -> [ControlPoint; 3] {
    let q = &seg.quad;
    let x = &seg.pressure;
    [
        ControlPoint::new(q.p0, NEUTRAL_WEIGHT, x.x0),
        ControlPoint::new(q.p1, NEUTRAL_WEIGHT, x.cx),
        ControlPoint::new(q.p2, NEUTRAL_WEIGHT, x.x1),
    ]
}

impl Curve {
    /// Total arc length of the curve.
    pub fn length(&self) -> f64 {
        self.length_with(DEFAULT_ACCURACY)
    }

    pub(crate) fn length_with(&self, accuracy: f64) -> f64 {
        self.segments().map(|seg| seg.arclen(accuracy)).sum()
    }

    /// Arc length of the part of the curve covered by `range`.
    ///
    /// The range is clipped to the extent of the curve.
    pub fn length_in(&self, range: CurveRange) -> f64 {
        self.length_in_with(range, DEFAULT_ACCURACY)
    }

    pub(crate) fn length_in_with(&self, range: CurveRange, accuracy: f64) -> f64 {
        let last = self.end_pos();
        let start = range.start.min(last);
        let end = range.end.min(last);
        if end <= start {
            return 0.0;
        }
        let mut length = 0.0;
        for (i, seg) in self.segments().enumerate().skip(start.segment) {
            if i > end.segment {
                break;
            }
            let t0 = if i == start.segment { start.t } else { 0.0 };
            let t1 = if i == end.segment { end.t } else { 1.0 };
            if t1 > t0 {
                length += seg.subsegment(t0..t1).arclen(accuracy);
            }
        }
        length
    }

    /// The position at a fraction of the total arc length.
    ///
    /// The fraction is clamped into `[0, 1]`. A curve of zero length maps
    /// every fraction to its start.
    pub fn pos_at_fraction(&self, fraction: f64) -> CurvePos {
        let accuracy = DEFAULT_ACCURACY;
        let lengths: Vec<f64> = self.segments().map(|seg| seg.arclen(accuracy)).collect();
        let total: f64 = lengths.iter().sum();
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        if total <= 0.0 || fraction <= 0.0 {
            return CurvePos::START;
        }
        if fraction >= 1.0 {
            return self.end_pos();
        }
        let target = fraction * total;
        let mut walked = 0.0;
        for (i, seg) in self.segments().enumerate() {
            let len = lengths[i];
            if walked + len >= target && len > 0.0 {
                return CurvePos::new(i, seg.t_at_arclen(target - walked, accuracy));
            }
            walked += len;
        }
        self.end_pos()
    }

    /// Extract the part of the curve covered by `range`.
    ///
    /// The result reproduces that part of the curve exactly, including the
    /// pressure profile. It keeps the width, color and classification of this
    /// curve and receives a fresh id.
    ///
    /// # Panics
    ///
    /// Panics if the range does not lie within the curve, see
    /// [`Curve::try_sub_curve`].
    #[must_use]
    pub fn sub_curve(&self, range: CurveRange) -> Curve {
        match self.try_sub_curve(range) {
            Ok(curve) => curve,
            Err(e) => panic!("sub_curve: {e}"),
        }
    }

    /// Extract the part of the curve covered by `range`.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::InvalidRange`] if the range starts after it ends
    /// or reaches past the end of the curve.
    pub fn try_sub_curve(&self, range: CurveRange) -> Result<Curve, CurveError> {
        if !range.is_within(self.end_pos()) {
            return Err(CurveError::InvalidRange);
        }
        let controls = if self.is_empty() {
            Vec::new()
        } else {
            sub_controls(self, range)
        };
        Ok(self.with_controls(controls).with_new_id())
    }

    /// Split the curve at a position into the parts before and after it.
    ///
    /// The first part keeps the id of this curve; the second gets a fresh one.
    ///
    /// # Panics
    ///
    /// Panics if the position lies past the end of the curve.
    pub fn split_at_pos(&self, pos: CurvePos) -> (Curve, Curve) {
        let before = self.sub_curve(CurveRange::new(CurvePos::START, pos));
        let after = self.sub_curve(CurveRange::new(pos, self.end_pos()));
        let before = Curve { id: self.id, ..before };
        (before, after)
    }

    /// Split the curve at a fraction of its arc length.
    ///
    /// Ids are assigned as in [`Curve::split_at_pos`].
    pub fn split_at(&self, fraction: f64) -> (Curve, Curve) {
        self.split_at_pos(self.pos_at_fraction(fraction))
    }

    /// Insert a control point at parameter `t` of a segment without changing
    /// the shape of the curve.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is out of bounds.
    pub fn insert_point(&mut self, segment: usize, t: f64) {
        if let Err(e) = self.try_insert_point(segment, t) {
            panic!("insert_point: {e}");
        }
    }

    /// Insert a control point, see [`Curve::insert_point`].
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::SegmentOutOfBounds`] if `segment` is out of bounds.
    pub fn try_insert_point(&mut self, segment: usize, t: f64) -> Result<(), CurveError> {
        let count = self.segment_count();
        if segment >= count {
            return Err(CurveError::SegmentOutOfBounds { index: segment, count });
        }
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let seg = self.segment(segment);
        let c = &mut self.controls;
        let n = c.len();
        match n {
            1 => {
                let dup = c[0];
                c.push(dup);
            }
            2 => {
                let m = ControlPoint::new(
                    c[0].point.lerp(c[1].point, t),
                    NEUTRAL_WEIGHT,
                    c[0].pressure + (c[1].pressure - c[0].pressure) * t,
                );
                c.insert(1, m);
            }
            _ => {
                let Some(seg) = seg else {
                    return Err(CurveError::SegmentOutOfBounds { index: segment, count });
                };
                let q = seg.quad;
                let x = seg.pressure;
                let left = ControlPoint::new(q.p0.lerp(q.p1, t), t, x.x0 + (x.cx - x.x0) * t);
                let mut right = ControlPoint::new(q.p1.lerp(q.p2, t), NEUTRAL_WEIGHT, x.cx + (x.x1 - x.cx) * t);
                let i = segment;
                if n >= 4 && i > 0 {
                    // c[i] at 0, old connecting point at w, `left` at w + t (1 - w).
                    let w = c[i].weight;
                    c[i].weight = solve_weight(w, 0.0, w + t * (1.0 - w));
                }
                if n >= 4 && i < n - 3 {
                    // c[i + 1] at 0, `right` at t w, c[i + 2] at 1, old connecting point at w.
                    let w = c[i + 1].weight;
                    right.weight = solve_weight(w, t * w, 1.0);
                }
                c[i + 1] = left;
                c.insert(i + 2, right);
            }
        }
        Ok(())
    }

    /// A copy of the curve grown to exactly `count` controls.
    ///
    /// Points are inserted one at a time at the middle of the segment with
    /// the longest control polygon, which keeps the spacing of controls even.
    /// The shape, the id and everything else are unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `count` is smaller than the number of controls, or if the
    /// curve is empty and `count` is not zero.
    #[must_use]
    pub fn resampled(&self, count: usize) -> Curve {
        match self.try_resampled(count) {
            Ok(curve) => curve,
            Err(e) => panic!("resampled: {e}"),
        }
    }

    /// A copy of the curve grown to exactly `count` controls.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::ShrinkingResample`] if `count` is smaller than
    /// the number of controls, and [`CurveError::EmptyCurve`] when asked to
    /// grow an empty curve.
    pub fn try_resampled(&self, count: usize) -> Result<Curve, CurveError> {
        let current = self.len();
        if count < current {
            return Err(CurveError::ShrinkingResample { current, requested: count });
        }
        if current == 0 && count > 0 {
            return Err(CurveError::EmptyCurve);
        }
        let mut curve = self.clone();
        let mut chords: Vec<f64> = Vec::new();
        while curve.len() < count {
            if curve.len() < 3 {
                curve.insert_point(0, 0.5);
                continue;
            }
            if chords.is_empty() {
                chords = curve.segments().map(|seg| control_polygon_length(&seg)).collect();
            }
            let mut i = 0;
            for (j, &chord) in chords.iter().enumerate() {
                if chord > chords[i] {
                    i = j;
                }
            }
            curve.insert_point(i, 0.5);
            let replaced = [i, i + 1].map(|k| curve.segment(k).map_or(0.0, |s| control_polygon_length(&s)));
            chords.splice(i..=i, replaced);
        }
        Ok(curve)
    }
}

fn control_polygon_length(seg: &CurveSegment) -> f64 {
    let q = &seg.quad;
    q.p0.distance(q.p1) + q.p1.distance(q.p2)
}

/// Controls of the sub-curve for a valid range of a non-empty curve.
fn sub_controls(curve: &Curve, range: CurveRange) -> Vec<ControlPoint> {
    let max = curve.max_segment_index();
    let mut start = range.start.normalized_forward(max);
    let mut end = range.end.normalized_backward();
    if end < start {
        // The range covers a single boundary point.
        start = range.start;
        end = range.start;
    }
    let c = &curve.controls;
    let (s, e) = (start.segment, end.segment);
    let Some(first) = curve.segment(s) else {
        return Vec::new();
    };
    if s == e {
        return segment_controls(&first.subsegment(start.t..end.t)).to_vec();
    }
    let Some(last) = curve.segment(e) else {
        return Vec::new();
    };
    let (ts, te) = (start.t, end.t);
    let [a0, mut a1, _] = segment_controls(&first.subsegment(ts..1.0));
    let [_, b1, b2] = segment_controls(&last.subsegment(0.0..te));

    // `a1` lies between c[s + 1] (u = 0) and c[s + 2] (u = 1) at u = ts w,
    // where the old connecting point sits at u = w.
    let w = c[s + 1].weight;
    let next_u = if e == s + 1 {
        // The next control is `b1`, at w + te (1 - w) on the same line.
        w + te * (1.0 - w)
    } else {
        1.0
    };
    a1.weight = solve_weight(w, ts * w, next_u);

    let mut controls = Vec::with_capacity(e - s + 3);
    controls.push(a0);
    controls.push(a1);
    if e > s + 1 {
        controls.extend_from_slice(&c[s + 2..=e]);
        // c[e] (u = 0) now connects to `b1` at u = w + te (1 - w).
        let w = c[e].weight;
        if let Some(ce) = controls.last_mut() {
            ce.weight = solve_weight(w, 0.0, w + te * (1.0 - w));
        }
    }
    controls.push(b1);
    controls.push(b2);
    controls
}
