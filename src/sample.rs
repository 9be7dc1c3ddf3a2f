// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curvature-aware flattening of curves into polylines.
//!
//! The number of samples per segment follows its arc length and how sharply
//! it turns. Segments with a tight corner somewhere in the middle are cut at
//! the point of maximum curvature first, so that the corner itself becomes a
//! sample instead of being rounded off.

use kurbo::{ParamCurve, Point, QuadBez};

use crate::{Curve, CurveSegment, Tuning};

/// A polyline vertex annotated with the local half-width of the stroke.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSample {
    /// The sampled point.
    pub point: Point,
    /// Half the stroke width at this point, pressure included.
    pub half_width: f64,
}

/// Produces polylines from curves for rendering and hit testing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sampler {
    /// Multiplier of the sample density; 1 is the baseline.
    pub quality: f64,
    /// Constants controlling density and corner handling.
    pub tuning: Tuning,
}

impl Sampler {
    /// A sampler with the given quality and the default tuning.
    pub fn new(quality: f64) -> Sampler {
        Sampler {
            quality,
            tuning: Tuning::DEFAULT,
        }
    }

    /// Replace the tuning constants.
    #[must_use]
    pub fn with_tuning(self, tuning: Tuning) -> Sampler {
        Sampler { tuning, ..self }
    }

    /// Flatten a curve into points.
    ///
    /// The first and last points of the curve are always included exactly.
    pub fn polyline(&self, curve: &Curve) -> Vec<Point> {
        self.samples(curve).into_iter().map(|s| s.point).collect()
    }

    /// Flatten a curve into points annotated with the stroke half-width.
    pub fn distance_polyline(&self, curve: &Curve) -> Vec<StrokeSample> {
        self.samples(curve)
    }

    fn samples(&self, curve: &Curve) -> Vec<StrokeSample> {
        let half = 0.5 * curve.width;
        let sample = |point: Point, pressure: f64| StrokeSample {
            point,
            half_width: half * pressure,
        };
        let (Some(first), Some(last)) = (curve.controls.first(), curve.controls.last()) else {
            return Vec::new();
        };
        if curve.len() <= 2 {
            if first.point == last.point {
                return Vec::new();
            }
            return vec![sample(first.point, first.pressure), sample(last.point, last.pressure)];
        }
        let width_scale = self.tuning.width_scale(curve.width);
        let mut out = vec![sample(first.point, first.pressure)];
        let segment_count = curve.segment_count();
        for (i, seg) in curve.segments().enumerate() {
            let is_last = i + 1 == segment_count;
            let pieces = self.pieces(&seg);
            let piece_count = pieces.iter().flatten().count();
            for (j, piece) in pieces.into_iter().flatten().enumerate() {
                let ends_curve = is_last && j + 1 == piece_count;
                if self.is_degenerate(&piece.quad) {
                    if !ends_curve {
                        out.push(sample(piece.quad.p2, piece.pressure.x1));
                    }
                    continue;
                }
                let count = self.sample_count(&piece.quad, width_scale);
                for k in 1..count {
                    let t = k as f64 / count as f64;
                    out.push(sample(piece.quad.eval(t), piece.pressure.eval(t)));
                }
                if !ends_curve {
                    out.push(sample(piece.quad.p2, piece.pressure.x1));
                }
            }
        }
        out.push(sample(last.point, last.pressure));
        out.dedup_by(|a, b| a.point == b.point);
        out
    }

    /// The segment, cut once at its sharpest point if it needs it.
    fn pieces(&self, seg: &CurveSegment) -> [Option<CurveSegment>; 2] {
        let q = &seg.quad;
        if self.is_degenerate(q) {
            return [Some(*seg), None];
        }
        let d0 = q.p0.distance(q.p1);
        let d1 = q.p1.distance(q.p2);
        let ratio = d0.min(d1) / d0.max(d1);
        if ratio < self.tuning.chord_ratio || turn_angle(q) > self.tuning.sharp_turn {
            let t = max_curvature_t(q);
            return [Some(seg.subsegment(0.0..t)), Some(seg.subsegment(t..1.0))];
        }
        [Some(*seg), None]
    }

    /// Whether the control coincides with one of the endpoints.
    fn is_degenerate(&self, q: &QuadBez) -> bool {
        let d0 = q.p0.distance(q.p1);
        let d1 = q.p1.distance(q.p2);
        d0.min(d1) <= self.tuning.degenerate_ratio * d0.max(d1)
    }

    fn sample_count(&self, q: &QuadBez, width_scale: f64) -> usize {
        let quality = if self.quality.is_finite() { self.quality.max(0.0) } else { 1.0 };
        // The control polygon bounds the arc length and is much cheaper.
        let length = q.p0.distance(q.p1) + q.p1.distance(q.p2);
        let n = length * self.tuning.density(turn_angle(q)) * quality * width_scale;
        let n = if n.is_finite() { n.ceil() as usize } else { self.tuning.max_samples };
        n.clamp(self.tuning.min_samples.max(1), self.tuning.max_samples.max(1))
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Sampler::new(1.0)
    }
}

/// Angle between the two legs of the control polygon, in `[0, π]`.
fn turn_angle(q: &QuadBez) -> f64 {
    let a = q.p1 - q.p0;
    let b = q.p2 - q.p1;
    a.cross(b).atan2(a.dot(b)).abs()
}

/// Parameter of maximum curvature, kept away from the ends.
fn max_curvature_t(q: &QuadBez) -> f64 {
    let a = q.p0 - q.p1;
    let dd = q.p0.to_vec2() - 2.0 * q.p1.to_vec2() + q.p2.to_vec2();
    let denom = dd.hypot2();
    if denom <= f64::EPSILON {
        return 0.5;
    }
    (a.dot(dd) / denom).clamp(0.05, 0.95)
}

impl Curve {
    /// Flatten the curve with the default tuning, see [`Sampler::polyline`].
    pub fn polyline(&self, quality: f64) -> Vec<Point> {
        Sampler::new(quality).polyline(self)
    }

    /// Flatten the curve with half-widths, see [`Sampler::distance_polyline`].
    pub fn distance_polyline(&self, quality: f64) -> Vec<StrokeSample> {
        Sampler::new(quality).distance_polyline(self)
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::Sampler;
    use crate::{ControlPoint, Curve};

    fn arch(width: f64) -> Curve {
        Curve::new(
            vec![
                ControlPoint::new((0.0, 0.0), 0.5, 1.0),
                ControlPoint::new((10.0, 20.0), 0.5, 0.5),
                ControlPoint::new((30.0, 20.0), 0.5, 1.0),
                ControlPoint::new((40.0, 0.0), 0.5, 1.0),
            ],
            width,
        )
    }

    #[test]
    fn short_curves() {
        assert!(Curve::default().polyline(1.0).is_empty());
        assert!(Curve::from_points([(1.0, 1.0)], 1.0).polyline(1.0).is_empty());
        assert!(Curve::from_points([(1.0, 1.0), (1.0, 1.0)], 1.0).polyline(1.0).is_empty());
        let line = Curve::from_points([(0.0, 0.0), (3.0, 4.0)], 1.0).polyline(1.0);
        assert_eq!(line, vec![Point::new(0.0, 0.0), Point::new(3.0, 4.0)]);
    }

    #[test]
    fn exact_endpoints_on_curve() {
        let c = arch(4.0);
        let poly = c.polyline(1.0);
        assert!(poly.len() > 4);
        assert_eq!(poly[0], c.start_point().unwrap());
        assert_eq!(*poly.last().unwrap(), c.end_point().unwrap());
        for p in &poly {
            let n = c.nearest(*p).unwrap();
            assert!(n.distance_sq < 1e-12, "{p:?} is off the curve");
        }
    }

    #[test]
    fn density_follows_quality_and_width() {
        let c = arch(4.0);
        let low = c.polyline(0.2).len();
        let high = c.polyline(2.0).len();
        assert!(high > low, "{high} <= {low}");
        let thin = arch(0.5).polyline(1.0).len();
        let thick = arch(16.0).polyline(1.0).len();
        assert!(thin > thick, "{thin} <= {thick}");
    }

    #[test]
    fn corner_is_sampled() {
        // A hairpin: the control is far beyond the endpoints.
        let c = Curve::from_points([(0.0, 0.0), (50.0, 1.0), (0.0, 2.0)], 4.0);
        let poly = Sampler::new(0.01).polyline(&c);
        let tip = poly.iter().map(|p| p.x).fold(0.0, f64::max);
        // The true tip is at x = 25; a coarse sampling would miss it.
        assert!((tip - 25.0).abs() < 1e-6, "tip at {tip}");
    }

    #[test]
    fn degenerate_segment_is_one_point() {
        let c = Curve::from_points([(0.0, 0.0), (0.0, 0.0), (10.0, 0.0)], 4.0);
        let poly = c.polyline(1.0);
        assert_eq!(poly, vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)]);
    }

    #[test]
    fn half_widths_follow_pressure() {
        let c = arch(4.0);
        let samples = c.distance_polyline(1.0);
        assert_eq!(samples[0].half_width, 2.0);
        assert_eq!(samples.last().unwrap().half_width, 2.0);
        assert!(samples.iter().all(|s| s.half_width <= 2.0 && s.half_width >= 1.0));
        assert!(samples.iter().any(|s| s.half_width < 1.9));
    }
}
