// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lasso selection: which parts of a curve lie inside a freehand loop.
//!
//! The lasso is itself a curve, closed by a straight edge from its end back
//! to its start. A curve is cut wherever it crosses the lasso, and the pieces
//! alternate between inside and outside starting from the side its first
//! point is on.

use kurbo::{BezPath, Line, Point, Rect, Shape};

use crate::intersect::{quad_line, rects_touch};
use crate::{coalesce, complement, Curve, CurvePos, CurveRange, Tuning};

/// How a curve relates to a lasso, when it is not entirely outside.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum LassoHit {
    /// The whole curve is inside.
    Around,
    /// The parts of the curve inside the lasso, sorted and disjoint.
    Split(Vec<CurveRange>),
}

/// A curve cut into the pieces inside and outside a lasso.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LassoSplit {
    /// Pieces inside the lasso, in curve order.
    pub inside: Vec<Curve>,
    /// Pieces outside the lasso, in curve order.
    pub outside: Vec<Curve>,
}

/// A closed selection region drawn as a curve.
#[derive(Clone, Debug)]
pub struct Lasso {
    curve: Curve,
    path: BezPath,
    closing: Option<Line>,
    bounds: Option<Rect>,
    tuning: Tuning,
}

impl Lasso {
    /// Build a lasso from the curve outlining it.
    pub fn new(curve: Curve) -> Lasso {
        let mut path = BezPath::new();
        for (i, seg) in curve.segments().enumerate() {
            if i == 0 {
                path.move_to(seg.quad.p0);
            }
            path.quad_to(seg.quad.p1, seg.quad.p2);
        }
        if !path.elements().is_empty() {
            path.close_path();
        }
        let closing = match (curve.end_point(), curve.start_point()) {
            (Some(a), Some(b)) if a != b => Some(Line::new(a, b)),
            _ => None,
        };
        let bounds = curve.bounds();
        Lasso {
            curve,
            path,
            closing,
            bounds,
            tuning: Tuning::DEFAULT,
        }
    }

    /// Replace the tuning used for intersection searches.
    #[must_use]
    pub fn with_tuning(self, tuning: Tuning) -> Lasso {
        Lasso { tuning, ..self }
    }

    /// The outline curve.
    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    /// Whether `p` lies inside the closed lasso.
    pub fn contains(&self, p: Point) -> bool {
        self.path.contains(p)
    }

    /// Classify `other` against the lasso.
    ///
    /// Returns `None` when no part of `other` is inside.
    pub fn classify(&self, other: &Curve) -> Option<LassoHit> {
        let start = other.start_point()?;
        let (Some(bounds), Some(other_bounds)) = (self.bounds, other.bounds()) else {
            return None;
        };
        if !rects_touch(&bounds, &other_bounds, self.tuning.intersection_tolerance) {
            return None;
        }
        let cuts = self.crossings(other);
        log::trace!("curve {} crosses the lasso {} times", other.id, cuts.len());
        let mut inside = self.contains(start);
        let mut ranges = Vec::with_capacity(cuts.len() / 2 + 1);
        let mut from = CurvePos::START;
        for pos in cuts {
            if inside {
                ranges.push(CurveRange::new(from, pos));
            }
            inside = !inside;
            from = pos;
        }
        if inside {
            ranges.push(CurveRange::new(from, other.end_pos()));
        }
        hit_from_ranges(other, coalesce(ranges))
    }

    /// Cut `other` into the pieces inside and outside the lasso.
    pub fn split_curve(&self, other: &Curve) -> LassoSplit {
        split_by(other, self.classify(other))
    }

    /// Classify `other`, snapping ends that stop just short of the lasso.
    ///
    /// When [`classify`](Self::classify) finds nothing, each end of `other`
    /// whose round cap touches the lasso is examined. If `other` crosses one
    /// of the `references` close to that end, within `distance` plus half the
    /// width of the reference, the stretch from the end to the crossing
    /// nearest to it counts as inside.
    pub fn classify_snapping(&self, other: &Curve, references: &[Curve], distance: f64) -> Option<LassoHit> {
        if let Some(hit) = self.classify(other) {
            return Some(hit);
        }
        let radius = 0.5 * other.width;
        let mut ranges = Vec::new();
        for reversed in [false, true] {
            let end = if reversed { other.end_point() } else { other.start_point() };
            let Some(end) = end else {
                continue;
            };
            if !self.touches_cap(end, radius) {
                continue;
            }
            let crossing = references
                .iter()
                .filter(|r| r.id != other.id)
                .flat_map(|r| {
                    let reach = distance + 0.5 * r.width;
                    other
                        .intersections_tuned(r, &self.tuning)
                        .into_iter()
                        .filter(move |hit| hit.point.distance(end) <= reach)
                })
                .map(|hit| hit.this);
            let range = if reversed {
                crossing.max().map(|pos| CurveRange::new(pos, other.end_pos()))
            } else {
                crossing.min().map(|pos| CurveRange::new(CurvePos::START, pos))
            };
            if let Some(range) = range {
                log::debug!("snapped curve {} to a reference at {:?}", other.id, range);
                ranges.push(range);
            }
        }
        hit_from_ranges(other, coalesce(ranges))
    }

    /// Cut `other` like [`split_curve`](Self::split_curve), with snapping.
    pub fn split_curve_snapping(&self, other: &Curve, references: &[Curve], distance: f64) -> LassoSplit {
        split_by(other, self.classify_snapping(other, references, distance))
    }

    /// Positions on `other` where it crosses the lasso outline, sorted, with
    /// hits at lasso joints merged.
    fn crossings(&self, other: &Curve) -> Vec<CurvePos> {
        let mut hits: Vec<(CurvePos, Point)> = other
            .intersections_tuned(&self.curve, &self.tuning)
            .into_iter()
            .map(|hit| (hit.this, hit.point))
            .collect();
        if let Some(line) = &self.closing {
            for (i, seg) in other.segments().enumerate() {
                for hit in quad_line(&seg.quad, line) {
                    hits.push((CurvePos::new(i, hit.t0), hit.point));
                }
            }
        }
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        let merge = 64.0 * self.tuning.intersection_tolerance;
        hits.dedup_by(|b, a| b.1.distance(a.1) <= merge);
        hits.into_iter().map(|(pos, _)| pos).collect()
    }

    /// Whether a round cap of `radius` at `p` reaches the lasso.
    fn touches_cap(&self, p: Point, radius: f64) -> bool {
        if self.contains(p) {
            return true;
        }
        let outline = self
            .curve
            .nearest(p)
            .map_or(f64::INFINITY, |n| n.distance_sq.sqrt());
        let closing = self.closing.map_or(f64::INFINITY, |line| {
            let nearest = kurbo::ParamCurveNearest::nearest(&line, p, self.tuning.accuracy);
            nearest.distance_sq.sqrt()
        });
        outline.min(closing) <= radius
    }
}

fn hit_from_ranges(curve: &Curve, ranges: Vec<CurveRange>) -> Option<LassoHit> {
    if ranges.is_empty() {
        return None;
    }
    if ranges.len() == 1 && ranges[0] == CurveRange::full(curve) {
        return Some(LassoHit::Around);
    }
    Some(LassoHit::Split(ranges))
}

fn split_by(curve: &Curve, hit: Option<LassoHit>) -> LassoSplit {
    match hit {
        None => LassoSplit {
            inside: Vec::new(),
            outside: vec![curve.clone()],
        },
        Some(LassoHit::Around) => LassoSplit {
            inside: vec![curve.clone()],
            outside: Vec::new(),
        },
        Some(LassoHit::Split(ranges)) => {
            let outside = complement(&ranges, curve.end_pos());
            LassoSplit {
                inside: ranges.iter().map(|r| curve.sub_curve(*r)).collect(),
                outside: outside.iter().map(|r| curve.sub_curve(*r)).collect(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::f64::consts::PI;

    use kurbo::Point;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::{Lasso, LassoHit};
    use crate::intersect::quad_line;
    use crate::{complement, Curve, CurvePos, CurveRange};

    /// A loop of radius about 9.5 around the origin, starting at (10, 0).
    fn ring() -> Lasso {
        let mut points: Vec<Point> = (0..8)
            .map(|k| {
                let a = k as f64 * PI / 4.0;
                Point::new(10.0 * a.cos(), 10.0 * a.sin())
            })
            .collect();
        points.push(points[0]);
        Lasso::new(Curve::from_points(points, 1.0))
    }

    fn mid(curve: &Curve, range: CurveRange) -> Option<Point> {
        let (a, b) = (range.start, range.end);
        if a.segment != b.segment {
            return curve.eval(CurvePos::new(b.segment, 0.0));
        }
        curve.eval(CurvePos::new(a.segment, 0.5 * (a.t + b.t)))
    }

    #[test]
    fn inside_outside_around() {
        let lasso = ring();
        assert!(lasso.contains(Point::ZERO));
        assert!(!lasso.contains(Point::new(11.0, 0.0)));
        let inner = Curve::from_points([(-2.0, 0.0), (0.0, 3.0), (2.0, 0.0)], 1.0);
        assert_eq!(lasso.classify(&inner), Some(LassoHit::Around));
        let outer = Curve::from_points([(20.0, 0.0), (25.0, 5.0)], 1.0);
        assert_eq!(lasso.classify(&outer), None);
        assert_eq!(lasso.classify(&Curve::default()), None);

        let split = lasso.split_curve(&inner);
        assert_eq!(split.inside.len(), 1);
        assert!(split.outside.is_empty());
    }

    #[test]
    fn line_through_the_ring() {
        let lasso = ring();
        let line = Curve::from_points([(-20.0, 1.0), (20.0, 1.0)], 1.0);
        let Some(LassoHit::Split(ranges)) = lasso.classify(&line) else {
            panic!("expected a split");
        };
        assert_eq!(ranges.len(), 1);
        let a = line.eval(ranges[0].start).unwrap();
        let b = line.eval(ranges[0].end).unwrap();
        assert!(a.x > -10.0 && a.x < -9.0, "{a:?}");
        assert!(b.x > 9.0 && b.x < 10.0, "{b:?}");

        let split = lasso.split_curve(&line);
        assert_eq!(split.inside.len(), 1);
        assert_eq!(split.outside.len(), 2);
        assert_eq!(split.outside[0].start_point(), line.start_point());
        assert_eq!(split.outside[1].end_point(), line.end_point());
        // Pieces are new curves.
        assert_ne!(split.inside[0].id, line.id);
    }

    #[test]
    fn starting_inside() {
        let lasso = ring();
        let line = Curve::from_points([(0.0, 0.0), (0.0, 30.0)], 1.0);
        let Some(LassoHit::Split(ranges)) = lasso.classify(&line) else {
            panic!("expected a split");
        };
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, CurvePos::START);
    }

    #[test]
    fn parity_matches_containment() {
        let lasso = ring();
        let mut rng = StdRng::seed_from_u64(0x1a55);
        for _ in 0..200 {
            let mut p = || Point::new(rng.random_range(-20.0..20.0), rng.random_range(-20.0..20.0));
            let line = Curve::from_points([p(), p()], 1.0);
            let inside = match lasso.classify(&line) {
                None => Vec::new(),
                Some(LassoHit::Around) => vec![CurveRange::full(&line)],
                Some(LassoHit::Split(ranges)) => ranges,
            };
            let outside = complement(&inside, line.end_pos());
            for (ranges, expected) in [(inside, true), (outside, false)] {
                for range in ranges {
                    if range.end.t - range.start.t < 1e-3 {
                        continue;
                    }
                    let m = mid(&line, range).unwrap();
                    if lasso.curve().nearest(m).unwrap().distance_sq < 1e-6 {
                        continue;
                    }
                    assert_eq!(lasso.contains(m), expected, "{m:?} in {line:?}");
                }
            }
        }
    }

    /// A cup with a notch in its rim, closed by a straight edge along x = 0.
    fn cup() -> Lasso {
        let points = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (5.0, 3.0), (0.0, 10.0)];
        Lasso::new(Curve::from_points(points, 1.0))
    }

    /// Points where `stroke` crosses the outline or the closing edge, in
    /// stroke order, with hits at joints merged.
    fn crossing_points(lasso: &Lasso, stroke: &Curve) -> Vec<Point> {
        let mut hits: Vec<(CurvePos, Point)> = stroke
            .intersections(lasso.curve())
            .into_iter()
            .map(|hit| (hit.this, hit.point))
            .collect();
        let line = lasso.closing.unwrap();
        for (i, seg) in stroke.segments().enumerate() {
            for hit in quad_line(&seg.quad, &line) {
                hits.push((CurvePos::new(i, hit.t0), hit.point));
            }
        }
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        hits.dedup_by(|b, a| b.1.distance(a.1) < 1e-5);
        hits.into_iter().map(|(_, p)| p).collect()
    }

    #[test]
    fn parity_of_curved_strokes() {
        let lasso = cup();
        let mut rng = StdRng::seed_from_u64(0xc0ffee);
        let mut checked = 0;
        let mut many = 0;
        for _ in 0..300 {
            let points: Vec<Point> = (0..5)
                .map(|_| Point::new(rng.random_range(-4.0..14.0), rng.random_range(-4.0..14.0)))
                .collect();
            let stroke = Curve::from_points(points, 1.0);
            let crossings = crossing_points(&lasso, &stroke);
            let start = stroke.start_point().unwrap();
            let near_start = crossings.iter().any(|p| p.distance(start) < 1e-2)
                || lasso.curve().nearest(start).unwrap().distance_sq < 1e-4
                || start.x.abs() < 1e-2;
            let clustered = crossings.windows(2).any(|w| w[0].distance(w[1]) < 1e-2);
            if near_start || clustered {
                continue;
            }
            let k = crossings.len();
            let starts_inside = lasso.contains(start);
            let inside = match lasso.classify(&stroke) {
                None => Vec::new(),
                Some(LassoHit::Around) => vec![CurveRange::full(&stroke)],
                Some(LassoHit::Split(ranges)) => ranges,
            };
            assert_eq!(
                inside.len(),
                (k + usize::from(starts_inside) + 1) / 2,
                "{k} crossings, starting inside: {starts_inside}"
            );

            let split = lasso.split_curve(&stroke);
            let total: f64 = split.inside.iter().chain(&split.outside).map(Curve::length).sum();
            let length = stroke.length();
            assert!((total - length).abs() <= 1e-6 * length.max(1.0), "{total} != {length}");
            checked += 1;
            if k >= 3 {
                many += 1;
            }
        }
        assert!(checked > 150, "only {checked} strokes checked");
        assert!(many > 0, "no stroke crossed more than twice");
    }

    #[test]
    fn snapping_to_a_reference() {
        let lasso = ring();
        // Starts just outside the ring, within its own cap radius.
        let stroke = Curve::from_points([(10.5, 0.5), (30.0, 0.5)], 2.0);
        assert_eq!(lasso.classify(&stroke), None);
        let fence = Curve::from_points([(12.0, -20.0), (12.0, 20.0)], 2.0);
        let Some(LassoHit::Split(ranges)) = lasso.classify_snapping(&stroke, &[fence.clone()], 1.0) else {
            panic!("expected a snapped split");
        };
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, CurvePos::START);
        let cut = stroke.eval(ranges[0].end).unwrap();
        assert!(cut.distance(Point::new(12.0, 0.5)) < 1e-6, "{cut:?}");

        let far = Curve::from_points([(14.0, -20.0), (14.0, 20.0)], 2.0);
        assert_eq!(lasso.classify_snapping(&stroke, &[far], 0.0), None);
        let split = lasso.split_curve_snapping(&stroke, &[fence], 1.0);
        assert_eq!(split.inside.len(), 1);
        assert_eq!(split.outside.len(), 1);
    }
}
