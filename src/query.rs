// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric queries against a curve: bounds, nearest points, hit tests.

use kurbo::{Line, ParamCurve, ParamCurveNearest, Point, QuadBez, Rect};

use crate::intersect::{hull_bounds, quad_line, quad_quad, rects_touch};
use crate::tuning::DEFAULT_ACCURACY;
use crate::{Curve, CurvePos, CurveSegment, Tuning};

/// The result of a nearest-point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveNearest {
    /// Index of the segment holding the nearest point.
    pub segment: usize,
    /// Parameter of the nearest point within the segment.
    pub t: f64,
    /// The nearest point itself.
    pub point: Point,
    /// Squared distance from the query point.
    pub distance_sq: f64,
}

impl CurveNearest {
    /// The position of the nearest point.
    pub fn pos(&self) -> CurvePos {
        CurvePos::new(self.segment, self.t)
    }
}

/// An intersection between two curves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveHit {
    /// Position on the curve the query was made on.
    pub this: CurvePos,
    /// Position on the other curve.
    pub other: CurvePos,
    /// Where the curves meet.
    pub point: Point,
}

pub(crate) fn is_point(q: &QuadBez) -> bool {
    q.p0 == q.p1 && q.p1 == q.p2
}

/// Nearest point on one segment, as `(t, distance_sq)`.
pub(crate) fn segment_nearest(q: &QuadBez, p: Point) -> (f64, f64) {
    if is_point(q) {
        return (0.0, q.p0.distance_squared(p));
    }
    let nearest = q.nearest(p, DEFAULT_ACCURACY);
    let mut best = (nearest.t, nearest.distance_sq);
    if !best.1.is_finite() {
        best = (0.0, f64::INFINITY);
    }
    // The endpoints are always candidates.
    for t in [0.0, 1.0] {
        let d = q.eval(t).distance_squared(p);
        if d < best.1 {
            best = (t, d);
        }
    }
    best
}

/// Squared distance from a point to a rectangle; zero inside.
fn rect_distance_sq(rect: &Rect, p: Point) -> f64 {
    let dx = (rect.x0 - p.x).max(0.0).max(p.x - rect.x1);
    let dy = (rect.y0 - p.y).max(0.0).max(p.y - rect.y1);
    dx * dx + dy * dy
}

impl Curve {
    /// The union of the control hull bounds of every segment.
    ///
    /// This is cheap and always contains the curve, but is not tight.
    /// Returns `None` for an empty curve.
    pub fn bounds(&self) -> Option<Rect> {
        self.segments()
            .map(|seg| hull_bounds(&seg.quad))
            .reduce(|a, b| a.union(b))
    }

    /// The point at a position, or `None` if the segment does not exist.
    pub fn eval(&self, pos: CurvePos) -> Option<Point> {
        self.segment(pos.segment).map(|seg| seg.quad.eval(pos.t))
    }

    /// The pressure at a position, or `None` if the segment does not exist.
    pub fn pressure_at(&self, pos: CurvePos) -> Option<f64> {
        self.segment(pos.segment).map(|seg| seg.pressure.eval(pos.t))
    }

    /// The point of the curve nearest to `p`.
    ///
    /// Returns `None` for an empty curve. Ties go to the earliest segment.
    pub fn nearest(&self, p: Point) -> Option<CurveNearest> {
        let mut best: Option<CurveNearest> = None;
        for (i, seg) in self.segments().enumerate() {
            if let Some(b) = &best {
                if rect_distance_sq(&hull_bounds(&seg.quad), p) >= b.distance_sq {
                    continue;
                }
            }
            let (t, distance_sq) = segment_nearest(&seg.quad, p);
            if best.map_or(true, |b| distance_sq < b.distance_sq) {
                best = Some(CurveNearest {
                    segment: i,
                    t,
                    point: seg.quad.eval(t),
                    distance_sq,
                });
            }
        }
        best
    }

    /// The nearest point whose arc length from one end exceeds `min_distance`.
    ///
    /// Arc length is measured from the start of the curve, or from its end
    /// when `reversed` is set. Segments are visited starting at that end;
    /// segments whose hull is already farther than the best candidate are
    /// skipped without solving. Returns `None` if the curve is shorter than
    /// `min_distance`.
    pub fn nearest_beyond(&self, p: Point, min_distance: f64, reversed: bool) -> Option<CurveNearest> {
        let accuracy = DEFAULT_ACCURACY;
        let mut best: Option<CurveNearest> = None;
        let mut walked = 0.0;
        let mut visit = |i: usize, seg: CurveSegment| {
            let len = seg.arclen(accuracy);
            let skip = min_distance - walked;
            walked += len;
            if skip >= len && min_distance > 0.0 {
                return;
            }
            if let Some(b) = &best {
                if rect_distance_sq(&hull_bounds(&seg.quad), p) >= b.distance_sq {
                    return;
                }
            }
            let range = if skip <= 0.0 {
                0.0..1.0
            } else if reversed {
                0.0..seg.t_at_arclen(len - skip, accuracy)
            } else {
                seg.t_at_arclen(skip, accuracy)..1.0
            };
            let sub = seg.quad.subsegment(range.clone());
            let (u, distance_sq) = segment_nearest(&sub, p);
            if best.map_or(true, |b| distance_sq < b.distance_sq) {
                let t = range.start + u * (range.end - range.start);
                best = Some(CurveNearest {
                    segment: i,
                    t,
                    point: seg.quad.eval(t),
                    distance_sq,
                });
            }
        };
        if reversed {
            for (i, seg) in self.segments().enumerate().rev() {
                visit(i, seg);
            }
        } else {
            for (i, seg) in self.segments().enumerate() {
                visit(i, seg);
            }
        }
        best
    }

    /// Whether the curve passes within `tolerance` of `p`.
    pub fn intersects_point(&self, p: Point, tolerance: f64) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        if rect_distance_sq(&bounds, p) > tolerance * tolerance {
            return false;
        }
        self.nearest(p)
            .is_some_and(|n| n.distance_sq <= tolerance * tolerance)
    }

    /// Whether the curve crosses or touches a line segment.
    pub fn intersects_line(&self, line: &Line) -> bool {
        let line_bounds = Rect::from_points(line.p0, line.p1);
        match self.bounds() {
            Some(bounds) if rects_touch(&bounds, &line_bounds, 0.0) => {}
            _ => return false,
        }
        self.segments().any(|seg| {
            let q = seg.quad;
            if !rects_touch(&hull_bounds(&q), &line_bounds, 0.0) {
                return false;
            }
            if is_point(&q) {
                return point_on_line(q.p0, line);
            }
            !quad_line(&q, line).is_empty()
        })
    }

    /// Whether any part of the curve lies inside or crosses a rectangle.
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        let rect = rect.abs();
        match self.bounds() {
            Some(bounds) if rects_touch(&bounds, &rect, 0.0) => {}
            _ => return false,
        }
        let edges = [
            Line::new((rect.x0, rect.y0), (rect.x1, rect.y0)),
            Line::new((rect.x1, rect.y0), (rect.x1, rect.y1)),
            Line::new((rect.x1, rect.y1), (rect.x0, rect.y1)),
            Line::new((rect.x0, rect.y1), (rect.x0, rect.y0)),
        ];
        self.segments().any(|seg| {
            let q = seg.quad;
            if !rects_touch(&hull_bounds(&q), &rect, 0.0) {
                return false;
            }
            if contains_closed(&rect, q.p0) || contains_closed(&rect, q.p2) {
                return true;
            }
            !is_point(&q) && edges.iter().any(|edge| !quad_line(&q, edge).is_empty())
        })
    }

    /// Whether the two curves cross or touch.
    pub fn intersects_curve(&self, other: &Curve) -> bool {
        self.hits(other, &Tuning::DEFAULT).next().is_some()
    }

    /// Every intersection between this curve and `other`, sorted along this curve.
    pub fn intersections(&self, other: &Curve) -> Vec<CurveHit> {
        self.intersections_tuned(other, &Tuning::DEFAULT)
    }

    /// Like [`Curve::intersections`], with an explicit tolerance source.
    pub fn intersections_tuned(&self, other: &Curve, tuning: &Tuning) -> Vec<CurveHit> {
        let mut hits: Vec<CurveHit> = self.hits(other, tuning).collect();
        hits.sort_by(|a, b| a.this.cmp(&b.this));
        hits
    }

    /// Lazily find intersections, one segment of `self` at a time.
    fn hits<'a>(&'a self, other: &Curve, tuning: &Tuning) -> impl Iterator<Item = CurveHit> + 'a {
        let tolerance = tuning.intersection_tolerance;
        let overlap = match (self.bounds(), other.bounds()) {
            (Some(a), Some(b)) => rects_touch(&a, &b, tolerance),
            _ => false,
        };
        let others: Vec<(usize, QuadBez)> = if overlap {
            other.segments().map(|s| s.quad).enumerate().collect()
        } else {
            Vec::new()
        };
        self.segments()
            .enumerate()
            .take_while(move |_| overlap)
            .flat_map(move |(i, seg)| {
                let a = seg.quad;
                if is_point(&a) {
                    return Vec::new();
                }
                let a_bounds = hull_bounds(&a);
                others
                    .iter()
                    .filter(|(_, b)| !is_point(b) && rects_touch(&a_bounds, &hull_bounds(b), tolerance))
                    .flat_map(|&(j, b)| {
                        quad_quad(&a, &b, tolerance)
                            .into_iter()
                            .map(move |hit| CurveHit {
                                this: CurvePos::new(i, hit.t0),
                                other: CurvePos::new(j, hit.t1),
                                point: hit.point,
                            })
                    })
                    .collect::<Vec<_>>()
            })
    }

    /// Whether `p` lies under the stroke, taking pressure into account.
    ///
    /// True when the distance to the nearest point is less than half the
    /// width scaled by the pressure at that point.
    pub fn contains_pressure(&self, p: Point) -> bool {
        let Some(nearest) = self.nearest(p) else {
            return false;
        };
        let pressure = self.pressure_at(nearest.pos()).unwrap_or(0.0);
        let radius = 0.5 * self.width * pressure;
        nearest.distance_sq < radius * radius
    }
}

fn contains_closed(rect: &Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

fn point_on_line(p: Point, line: &Line) -> bool {
    let (t, distance_sq) = segment_nearest(&QuadBez::new(line.p0, line.p0.midpoint(line.p1), line.p1), p);
    (0.0..=1.0).contains(&t) && distance_sq <= f64::EPSILON
}
