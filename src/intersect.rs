// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Intersections between quadratic Bézier segments.
//!
//! Segment/segment intersections are found by recursive subdivision: pairs
//! of sub-curves whose control hulls do not overlap are discarded, and once
//! both sub-curves are flat within the tolerance their chords are intersected
//! directly. Overlapping collinear pieces report no intersection.

use core::ops::Range;

use arrayvec::ArrayVec;
use kurbo::{Line, ParamCurve, PathSeg, Point, QuadBez, Rect};
use smallvec::SmallVec;

/// Subdivision depth after which a pair is treated as flat regardless.
const MAX_DEPTH: usize = 48;

/// One intersection between two parametrized pieces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentHit {
    /// Parameter on the first piece.
    pub t0: f64,
    /// Parameter on the second piece.
    pub t1: f64,
    /// The intersection point.
    pub point: Point,
}

/// The bounding box of the control hull of a quadratic Bézier.
///
/// This contains the curve but is usually not tight.
pub fn hull_bounds(q: &QuadBez) -> Rect {
    Rect::from_points(q.p0, q.p2).union_pt(q.p1)
}

/// Whether two rectangles overlap once grown by `slop` on every side.
///
/// Unlike `Rect::intersect`, zero-area rectangles still overlap.
pub fn rects_touch(a: &Rect, b: &Rect, slop: f64) -> bool {
    a.x0 <= b.x1 + slop && b.x0 <= a.x1 + slop && a.y0 <= b.y1 + slop && b.y0 <= a.y1 + slop
}

/// Intersect a quadratic segment with a line segment.
///
/// `t0` is the parameter on the quadratic, `t1` the one on the line.
pub fn quad_line(q: &QuadBez, line: &Line) -> ArrayVec<SegmentHit, 3> {
    PathSeg::Quad(*q)
        .intersect_line(*line)
        .into_iter()
        .map(|hit| SegmentHit {
            t0: hit.segment_t,
            t1: hit.line_t,
            point: line.eval(hit.line_t),
        })
        .collect()
}

/// Intersect two quadratic segments.
///
/// Results are sorted by the parameter on `a`. Hits closer than `tolerance`
/// to each other are reported once.
pub fn quad_quad(a: &QuadBez, b: &QuadBez, tolerance: f64) -> SmallVec<[SegmentHit; 4]> {
    let mut hits = SmallVec::new();
    let tolerance = tolerance.max(f64::EPSILON);
    subdivide(a, 0.0..1.0, b, 0.0..1.0, tolerance, 0, &mut hits);
    hits.sort_by(|x: &SegmentHit, y| x.t0.total_cmp(&y.t0));
    hits.dedup_by(|x, y| x.point.distance(y.point) <= tolerance * 16.0);
    hits
}

fn subdivide(
    a: &QuadBez,
    ra: Range<f64>,
    b: &QuadBez,
    rb: Range<f64>,
    tolerance: f64,
    depth: usize,
    hits: &mut SmallVec<[SegmentHit; 4]>,
) {
    if !rects_touch(&hull_bounds(a), &hull_bounds(b), tolerance) {
        return;
    }
    let (flat_a, flat_b) = (is_flat(a, tolerance), is_flat(b, tolerance));
    if (flat_a && flat_b) || depth >= MAX_DEPTH {
        if let Some((s, u)) = chord_intersection(a, b, tolerance) {
            let t0 = ra.start + s * (ra.end - ra.start);
            let t1 = rb.start + u * (rb.end - rb.start);
            hits.push(SegmentHit {
                t0,
                t1,
                point: a.p0.lerp(a.p2, s),
            });
        }
        return;
    }
    // Split whichever is less flat; the other rides along unchanged.
    let split_a = !flat_a && (flat_b || hull_size(a) >= hull_size(b));
    if split_a {
        let (a0, a1) = a.subdivide();
        let mid = 0.5 * (ra.start + ra.end);
        subdivide(&a0, ra.start..mid, b, rb.clone(), tolerance, depth + 1, hits);
        subdivide(&a1, mid..ra.end, b, rb, tolerance, depth + 1, hits);
    } else {
        let (b0, b1) = b.subdivide();
        let mid = 0.5 * (rb.start + rb.end);
        subdivide(a, ra.clone(), &b0, rb.start..mid, tolerance, depth + 1, hits);
        subdivide(a, ra, &b1, mid..rb.end, tolerance, depth + 1, hits);
    }
}

fn hull_size(q: &QuadBez) -> f64 {
    let r = hull_bounds(q);
    r.width().max(r.height())
}

/// Whether the control lies within `tolerance` of the chord.
fn is_flat(q: &QuadBez, tolerance: f64) -> bool {
    let chord = q.p2 - q.p0;
    let len = chord.hypot();
    if len <= tolerance {
        return q.p1.distance(q.p0) <= tolerance;
    }
    // The curve deviates from its chord by at most half the control's offset.
    let offset = chord.cross(q.p1 - q.p0).abs() / len;
    0.5 * offset <= tolerance
}

/// Intersect the chords of two flat pieces, returning chord parameters.
fn chord_intersection(a: &QuadBez, b: &QuadBez, tolerance: f64) -> Option<(f64, f64)> {
    segment_intersection(a.p0, a.p2, b.p0, b.p2, tolerance)
}

/// Intersect segments `p0..p1` and `q0..q1`, returning both parameters.
///
/// Parallel or degenerate segments do not intersect.
pub fn segment_intersection(p0: Point, p1: Point, q0: Point, q1: Point, tolerance: f64) -> Option<(f64, f64)> {
    let r = p1 - p0;
    let d = q1 - q0;
    let denom = r.cross(d);
    let scale = r.hypot() * d.hypot();
    if scale == 0.0 || denom.abs() <= 1e-12 * scale {
        return None;
    }
    let w = q0 - p0;
    let s = w.cross(d) / denom;
    let u = w.cross(r) / denom;
    // Allow a little slack at the ends, measured along each segment.
    let slack_s = tolerance / r.hypot();
    let slack_u = tolerance / d.hypot();
    if s < -slack_s || s > 1.0 + slack_s || u < -slack_u || u > 1.0 + slack_u {
        return None;
    }
    Some((s.clamp(0.0, 1.0), u.clamp(0.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use kurbo::{Line, ParamCurve, Point, QuadBez};

    use super::{quad_line, quad_quad, segment_intersection};

    #[test]
    fn crossing_parabolas() {
        // y = x^2 - 1 and y = 1 - x^2 over x in [-2, 2] cross at x = ±1.
        let a = QuadBez::new((-2.0, 3.0), (0.0, -5.0), (2.0, 3.0));
        let b = QuadBez::new((-2.0, -3.0), (0.0, 5.0), (2.0, -3.0));
        let hits = quad_quad(&a, &b, 1e-9);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!(a.eval(hit.t0).distance(b.eval(hit.t1)) < 1e-6);
            assert!((hit.point.x.abs() - 1.0).abs() < 1e-6, "{hit:?}");
            assert!(hit.point.y.abs() < 1e-6);
        }
        assert!(hits[0].t0 < hits[1].t0);
    }

    #[test]
    fn disjoint() {
        let a = QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 0.0));
        let b = QuadBez::new((0.0, 5.0), (1.0, 6.0), (2.0, 5.0));
        assert!(quad_quad(&a, &b, 1e-9).is_empty());
    }

    #[test]
    fn straight_cross() {
        let a = QuadBez::new((0.0, 0.0), (1.0, 1.0), (2.0, 2.0));
        let b = QuadBez::new((0.0, 2.0), (1.0, 1.0), (2.0, 0.0));
        let hits = quad_quad(&a, &b, 1e-9);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].point.distance(Point::new(1.0, 1.0)) < 1e-9);
        assert!((hits[0].t0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn quad_and_line() {
        let q = QuadBez::new((-1.0, 1.0), (0.0, -1.0), (1.0, 1.0));
        let line = Line::new((-2.0, 0.5), (2.0, 0.5));
        let hits = quad_line(&q, &line);
        assert_eq!(hits.len(), 2);
        for hit in &hits {
            assert!(q.eval(hit.t0).distance(hit.point) < 1e-9);
        }
    }

    #[test]
    fn parallel_segments() {
        let p = |x, y| Point::new(x, y);
        assert!(segment_intersection(p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(1.0, 1.0), 1e-9).is_none());
        let (s, u) = segment_intersection(p(0.0, 0.0), p(2.0, 0.0), p(1.0, -1.0), p(1.0, 1.0), 1e-9).unwrap();
        assert_eq!((s, u), (0.5, 0.5));
    }
}
