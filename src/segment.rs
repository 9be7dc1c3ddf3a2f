// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Derivation of quadratic Bézier segments from a curve.

use core::iter::FusedIterator;
use core::ops::Range;

use kurbo::{ParamCurve, ParamCurveArclen, Point, QuadBez};

use crate::{ControlPoint, Curve};

/// A scalar quadratic Bézier, used for pressure along a segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureQuad {
    /// Pressure at the start of the segment.
    pub x0: f64,
    /// Control value.
    pub cx: f64,
    /// Pressure at the end of the segment.
    pub x1: f64,
}

impl PressureQuad {
    /// Create a new pressure quadratic.
    #[inline]
    pub const fn new(x0: f64, cx: f64, x1: f64) -> PressureQuad {
        PressureQuad { x0, cx, x1 }
    }

    /// Evaluate at parameter `t`.
    #[inline]
    pub fn eval(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        self.x0 * (mt * mt) + (self.cx * (mt * 2.0) + self.x1 * t) * t
    }

    /// The part of the quadratic for the given parameter range.
    ///
    /// Mirrors [`ParamCurve::subsegment`] for `QuadBez`.
    #[must_use]
    pub fn subsegment(&self, range: Range<f64>) -> PressureQuad {
        let (t0, t1) = (range.start, range.end);
        let x0 = self.eval(t0);
        let x1 = self.eval(t1);
        let d0 = self.cx - self.x0;
        let d1 = self.x1 - self.cx;
        let cx = x0 + (d0 + (d1 - d0) * t0) * (t1 - t0);
        PressureQuad { x0, cx, x1 }
    }
}

/// One derived segment of a curve: the shape and its pressure.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveSegment {
    /// The geometry of the segment.
    pub quad: QuadBez,
    /// Pressure along the segment, parametrized like `quad`.
    pub pressure: PressureQuad,
}

impl CurveSegment {
    fn from_parts(p0: (Point, f64), cp: (Point, f64), p1: (Point, f64)) -> CurveSegment {
        CurveSegment {
            quad: QuadBez::new(p0.0, cp.0, p1.0),
            pressure: PressureQuad::new(p0.1, cp.1, p1.1),
        }
    }

    /// The segment restricted to a parameter range.
    #[must_use]
    pub fn subsegment(&self, range: Range<f64>) -> CurveSegment {
        CurveSegment {
            quad: self.quad.subsegment(range.clone()),
            pressure: self.pressure.subsegment(range),
        }
    }

    /// Arc length of the segment.
    #[inline]
    pub fn arclen(&self, accuracy: f64) -> f64 {
        self.quad.arclen(accuracy)
    }

    /// Arc length from the start of the segment to parameter `t`.
    pub fn arclen_to(&self, t: f64, accuracy: f64) -> f64 {
        if t <= 0.0 {
            0.0
        } else if t >= 1.0 {
            self.quad.arclen(accuracy)
        } else {
            self.quad.subsegment(0.0..t).arclen(accuracy)
        }
    }

    /// Parameter at which the arc length from the start reaches `arclen`.
    pub fn t_at_arclen(&self, arclen: f64, accuracy: f64) -> f64 {
        let total = self.quad.arclen(accuracy);
        if arclen <= 0.0 || total <= 0.0 {
            0.0
        } else if arclen >= total {
            1.0
        } else {
            self.quad.inv_arclen(arclen, accuracy).clamp(0.0, 1.0)
        }
    }
}

impl Curve {
    /// Number of segments the curve derives to.
    ///
    /// That is 0 for an empty curve, 1 for one to three controls, and `n - 2`
    /// otherwise.
    pub fn segment_count(&self) -> usize {
        match self.len() {
            0 => 0,
            1..=3 => 1,
            n => n - 2,
        }
    }

    /// The segment at index `i`, if there is one.
    pub fn segment(&self, i: usize) -> Option<CurveSegment> {
        if i >= self.segment_count() {
            return None;
        }
        Some(derive_segment(&self.controls, i))
    }

    /// Iterate over the segments of the curve.
    ///
    /// Segments are derived lazily from the controls; nothing is cached.
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            controls: &self.controls,
            range: 0..self.segment_count(),
        }
    }
}

/// Iterator over the segments of a curve, see [`Curve::segments`].
#[derive(Clone, Debug)]
pub struct Segments<'a> {
    controls: &'a [ControlPoint],
    range: Range<usize>,
}

impl Iterator for Segments<'_> {
    type Item = CurveSegment;

    fn next(&mut self) -> Option<CurveSegment> {
        self.range.next().map(|i| derive_segment(self.controls, i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl DoubleEndedIterator for Segments<'_> {
    fn next_back(&mut self) -> Option<CurveSegment> {
        self.range.next_back().map(|i| derive_segment(self.controls, i))
    }
}

impl ExactSizeIterator for Segments<'_> {}

impl FusedIterator for Segments<'_> {}

fn on_curve(c: &ControlPoint) -> (Point, f64) {
    (c.point, c.pressure)
}

fn connecting(a: &ControlPoint, b: &ControlPoint) -> (Point, f64) {
    (a.connect(b), a.connect_pressure(b))
}

/// Derive segment `i` from a control slice. The index must be valid.
fn derive_segment(c: &[ControlPoint], i: usize) -> CurveSegment {
    let n = c.len();
    match n {
        1 => {
            let p = on_curve(&c[0]);
            CurveSegment::from_parts(p, p, p)
        }
        2 => {
            let (p0, p1) = (on_curve(&c[0]), on_curve(&c[1]));
            let mid = (p0.0.midpoint(p1.0), 0.5 * (p0.1 + p1.1));
            CurveSegment::from_parts(p0, mid, p1)
        }
        3 => CurveSegment::from_parts(on_curve(&c[0]), on_curve(&c[1]), on_curve(&c[2])),
        _ => {
            let p0 = if i == 0 {
                on_curve(&c[0])
            } else {
                connecting(&c[i], &c[i + 1])
            };
            let p1 = if i == n - 3 {
                on_curve(&c[n - 1])
            } else {
                connecting(&c[i + 1], &c[i + 2])
            };
            CurveSegment::from_parts(p0, on_curve(&c[i + 1]), p1)
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{ParamCurve, Point};

    use super::PressureQuad;
    use crate::{ControlPoint, Curve};

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!(p0.distance(p1) < epsilon, "{p0:?} != {p1:?}");
    }

    fn wavy(n: usize) -> Curve {
        let controls = (0..n)
            .map(|i| {
                let x = i as f64;
                let w = 0.2 + 0.6 * ((i * 7) % 5) as f64 / 4.0;
                ControlPoint::new((x * 3.0, (x * 1.3).sin() * 4.0), w, 0.3 + 0.1 * x.cos())
            })
            .collect();
        Curve::new(controls, 3.0)
    }

    #[test]
    fn degenerate_counts() {
        assert_eq!(Curve::default().segments().count(), 0);

        let one = Curve::from_points([(1.0, 2.0)], 1.0);
        let seg = one.segment(0).unwrap();
        assert_eq!(seg.quad.p0, seg.quad.p2);
        assert_eq!(seg.quad.p0, Point::new(1.0, 2.0));

        let two = Curve::from_points([(0.0, 0.0), (4.0, 0.0)], 1.0);
        let seg = two.segment(0).unwrap();
        assert_eq!(seg.quad.p1, Point::new(2.0, 0.0));
        assert_near(seg.quad.eval(0.25), Point::new(1.0, 0.0), 1e-12);

        let three = Curve::from_points([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], 1.0);
        assert_eq!(three.segments().count(), 1);
        assert_eq!(three.segment(0).unwrap().quad.p1, Point::new(1.0, 1.0));
        assert!(three.segment(1).is_none());
    }

    #[test]
    fn four_controls() {
        let c = Curve::new(
            vec![
                ControlPoint::new((0.0, 0.0), 0.5, 1.0),
                ControlPoint::new((1.0, 2.0), 0.25, 1.0),
                ControlPoint::new((3.0, 2.0), 0.5, 1.0),
                ControlPoint::at((4.0, 0.0)),
            ],
            2.0,
        );
        let segs: Vec<_> = c.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].quad.p0, Point::new(0.0, 0.0));
        assert_eq!(segs[0].quad.p2, Point::new(1.5, 2.0));
        assert_eq!(segs[1].quad.p2, Point::new(4.0, 0.0));
    }

    #[test]
    fn segment_continuity() {
        for n in 4..12 {
            let c = wavy(n);
            let segs: Vec<_> = c.segments().collect();
            assert_eq!(segs.len(), n - 2);
            for pair in segs.windows(2) {
                assert_eq!(pair[0].quad.p2, pair[1].quad.p0);
                assert_eq!(pair[0].pressure.x1, pair[1].pressure.x0);
            }
            assert_eq!(segs[0].quad.p0, c.start_point().unwrap());
            assert_eq!(segs.last().unwrap().quad.p2, c.end_point().unwrap());
        }
    }

    #[test]
    fn reverse_iteration() {
        let c = wavy(7);
        let forward: Vec<_> = c.segments().collect();
        let mut backward: Vec<_> = c.segments().rev().collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn pressure_subsegment() {
        let q = PressureQuad::new(0.1, 0.9, 0.4);
        let (t0, t1) = (0.2, 0.7);
        let qs = q.subsegment(t0..t1);
        for i in 0..=10 {
            let t = i as f64 / 10.0;
            assert!((q.eval(t0 + t * (t1 - t0)) - qs.eval(t)).abs() < 1e-12);
        }
    }
}
