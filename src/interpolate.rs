// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Blending of key curves for keyframe animation.
//!
//! Keys rarely have the same number of controls, and blending controls by
//! index alone makes corners drift along the stroke. The interpolator first
//! looks for a *feature* (a pronounced corner) on every key. When some key
//! has one, every key is split at a matching arc-length fraction, and the
//! halves are blended separately. Once no key has a feature left, the keys
//! are resampled to the same control count and blended control by control.
//! The blended pieces are then welded back together.

use kurbo::Point;

use crate::control::NEUTRAL_WEIGHT;
use crate::interp::piecewise_linear;
use crate::{Classification, ControlPoint, Curve, CurveError, CurvePos, CurveRange, InterpolationKind, Tuning};

/// Blends key curves with one [`InterpolationKind`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interpolator {
    /// The interpolation family.
    pub kind: InterpolationKind,
    /// Feature detection constants.
    pub tuning: Tuning,
}

impl Interpolator {
    /// An interpolator with the default tuning.
    pub fn new(kind: InterpolationKind) -> Interpolator {
        Interpolator {
            kind,
            tuning: Tuning::DEFAULT,
        }
    }

    /// Replace the tuning constants.
    #[must_use]
    pub fn with_tuning(self, tuning: Tuning) -> Interpolator {
        Interpolator { tuning, ..self }
    }

    /// Blend `keys` at `t` in `[0, 1]`.
    ///
    /// At `t == 0` the result has the controls of the primary key, the key
    /// at the start of the blended interval, and at `t == 1` the controls of
    /// the key after it. The result takes its id from the primary key and is
    /// classified as [`Classification::Interpolated`]. Width and color are
    /// blended with the same kind.
    ///
    /// If every key is empty, so is the result.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::KeyCount`] when the number of keys does not
    /// match the kind, and [`CurveError::EmptyCurve`] when some but not all
    /// keys are empty.
    pub fn interpolate(&self, keys: &[Curve], t: f64) -> Result<Curve, CurveError> {
        let kind = self.kind;
        let expected = kind.key_count();
        if keys.len() != expected {
            return Err(CurveError::KeyCount {
                kind: kind.name(),
                expected,
                actual: keys.len(),
            });
        }
        let t = if t.is_nan() { 0.0 } else { t };
        let primary = &keys[kind.primary_index()];
        let widths: Vec<f64> = keys.iter().map(|k| k.width).collect();
        let mut result = primary.with_controls(Vec::new()).with_classification(Classification::Interpolated);
        result.set_width(kind.eval(&widths, t));
        result.color = self.blend_color(keys, t);

        let empty = keys.iter().filter(|k| k.is_empty()).count();
        if empty == keys.len() {
            return Ok(result);
        }
        if empty > 0 {
            log::warn!("{kind} interpolation with {empty} empty keys out of {}", keys.len());
            return Err(CurveError::EmptyCurve);
        }
        if let Some(key) = self.boundary_key(keys, t) {
            result.controls.clone_from(&key.controls);
            return Ok(result);
        }

        let leaves = self.leaves(keys, t);
        log::trace!("{kind} interpolation welded {} pieces", leaves.len());
        let mut leaves = leaves.into_iter();
        let first = leaves.next().unwrap_or_default();
        result.controls = leaves.fold(first, weld);
        Ok(result)
    }

    /// The key reproduced exactly at an end of the blended interval.
    fn boundary_key<'a>(&self, keys: &'a [Curve], t: f64) -> Option<&'a Curve> {
        let i = self.kind.primary_index();
        if t == 0.0 {
            Some(&keys[i])
        } else if t == 1.0 {
            Some(&keys[i + 1])
        } else {
            None
        }
    }

    /// Blend every group of keys that has no feature left, in curve order.
    fn leaves(&self, keys: &[Curve], t: f64) -> Vec<Vec<ControlPoint>> {
        let mut leaves = Vec::new();
        // Groups are popped in curve order: "after" halves are pushed first.
        let mut work: Vec<(Vec<Curve>, usize)> = vec![(keys.to_vec(), 0)];
        while let Some((group, depth)) = work.pop() {
            let known: Vec<(usize, f64)> = group
                .iter()
                .enumerate()
                .filter_map(|(i, key)| key.feature_fraction(&self.tuning).map(|f| (i, f)))
                .collect();
            if known.is_empty() {
                leaves.push(self.blend_controls(&group, t));
                continue;
            }
            if depth >= self.tuning.max_feature_depth {
                log::warn!(
                    "feature splitting stopped at depth {depth} with {} keys still split",
                    known.len()
                );
                leaves.push(self.blend_controls(&group, t));
                continue;
            }
            log::debug!("splitting {} keys at depth {depth}, features {known:?}", group.len());
            let (before, after): (Vec<Curve>, Vec<Curve>) = group
                .iter()
                .enumerate()
                .map(|(i, key)| key.split_at(piecewise_linear(&known, i).unwrap_or(0.5)))
                .unzip();
            work.push((after, depth + 1));
            work.push((before, depth + 1));
        }
        leaves
    }

    /// Equalize the control counts of the keys and blend them index by index.
    fn blend_controls(&self, keys: &[Curve], t: f64) -> Vec<ControlPoint> {
        let kind = self.kind;
        let count = keys.iter().map(Curve::len).max().unwrap_or(0);
        let keys: Vec<Curve> = keys
            .iter()
            .map(|key| {
                if key.len() == count || key.is_empty() {
                    key.clone()
                } else {
                    key.resampled(count)
                }
            })
            .collect();
        if keys.iter().any(Curve::is_empty) {
            return Vec::new();
        }
        (0..count)
            .map(|i| {
                let points: Vec<Point> = keys.iter().map(|k| k.controls[i].point).collect();
                let weights: Vec<f64> = keys.iter().map(|k| k.controls[i].weight).collect();
                let pressures: Vec<f64> = keys.iter().map(|k| k.controls[i].pressure).collect();
                ControlPoint::new(
                    kind.eval_point(&points, t),
                    kind.eval(&weights, t),
                    kind.eval(&pressures, t),
                )
            })
            .collect()
    }

    fn blend_color(&self, keys: &[Curve], t: f64) -> crate::ColorTag {
        let first = keys[0].color;
        if keys.iter().all(|k| k.color == first) {
            return first;
        }
        first.map(|i, _| {
            let values: Vec<f64> = keys.iter().map(|k| k.color.0[i]).collect();
            self.kind.eval(&values, t)
        })
    }
}

/// Join two blended pieces that share the end point of `left`.
///
/// The seam keeps both shapes exactly. When the shared point lies between
/// its neighbors it is dropped and the weight of the left neighbor is solved
/// to place the connecting point on it. Otherwise it stays, with weights that
/// pin both neighboring segments to it.
fn weld(mut left: Vec<ControlPoint>, right: Vec<ControlPoint>) -> Vec<ControlPoint> {
    let right = quadratic_controls(right);
    if right.is_empty() {
        return left;
    }
    left = quadratic_controls(left);
    if left.is_empty() {
        return right;
    }
    let m = left.len();
    let seam = left[m - 1];
    let (a, b) = (left[m - 2], right[1]);
    if let Some(u) = between(a, b, seam) {
        left[m - 2].weight = u;
        left.pop();
    } else {
        left[m - 2].weight = 1.0;
        left[m - 1].weight = 0.0;
    }
    left.extend_from_slice(&right[1..]);
    left
}

/// Controls describing the same shape with at least three controls.
///
/// A single point has no shape to weld and yields nothing.
fn quadratic_controls(mut controls: Vec<ControlPoint>) -> Vec<ControlPoint> {
    match controls.len() {
        0 | 1 => Vec::new(),
        2 => {
            let (a, b) = (controls[0], controls[1]);
            let mid = ControlPoint::new(
                a.point.midpoint(b.point),
                NEUTRAL_WEIGHT,
                0.5 * (a.pressure + b.pressure),
            );
            controls.insert(1, mid);
            controls
        }
        _ => controls,
    }
}

/// The weight that makes `a` connect to `b` exactly at `seam`, if the seam
/// lies strictly between them, pressure included.
fn between(a: ControlPoint, b: ControlPoint, seam: ControlPoint) -> Option<f64> {
    let d = b.point - a.point;
    let len2 = d.hypot2();
    if len2 <= f64::EPSILON {
        return None;
    }
    let v = seam.point - a.point;
    if d.cross(v).abs() > 1e-9 * len2 {
        return None;
    }
    let u = d.dot(v) / len2;
    if u <= 0.0 || u >= 1.0 {
        return None;
    }
    let pressure = a.pressure + (b.pressure - a.pressure) * u;
    ((pressure - seam.pressure).abs() <= 1e-9).then_some(u)
}

impl Curve {
    /// The arc-length fraction of this curve's feature point, if it has one.
    ///
    /// The feature point is the point farthest from the chord between the
    /// end points. It counts only when that distance exceeds
    /// [`Tuning::feature_deviation_ratio`] times the length of the curve,
    /// and when it is not too close to either end.
    pub fn feature_fraction(&self, tuning: &Tuning) -> Option<f64> {
        if self.len() < 3 {
            return None;
        }
        let (start, end) = (self.start_point()?, self.end_point()?);
        let length = self.length_with(tuning.accuracy);
        if length <= 0.0 {
            return None;
        }
        let chord = end - start;
        let chord_len = chord.hypot();
        let deviation = |p: Point| {
            if chord_len <= f64::EPSILON {
                // Closed curve: measure from the shared end point.
                p.distance(start)
            } else {
                chord.cross(p - start).abs() / chord_len
            }
        };
        let probes = tuning.feature_probes.max(1);
        let mut best = (0.0, CurvePos::START);
        for (i, seg) in self.segments().enumerate() {
            for k in 0..=probes {
                let t = k as f64 / probes as f64;
                let d = deviation(kurbo::ParamCurve::eval(&seg.quad, t));
                if d > best.0 {
                    best = (d, CurvePos::new(i, t));
                }
            }
        }
        if best.0 <= tuning.feature_deviation_ratio * length {
            return None;
        }
        let head = CurveRange::new(CurvePos::START, best.1);
        let fraction = self.length_in_with(head, tuning.accuracy) / length;
        let margin = tuning.min_feature_fraction;
        if fraction < margin || fraction > 1.0 - margin {
            return None;
        }
        log::trace!("feature at {:?}, fraction {fraction}", best.1);
        Some(fraction)
    }
}

/// Blend keys with `kind` at `t`, see [`Interpolator::interpolate`].
///
/// # Errors
///
/// As [`Interpolator::interpolate`].
pub fn interpolate(keys: &[Curve], kind: InterpolationKind, t: f64) -> Result<Curve, CurveError> {
    Interpolator::new(kind).interpolate(keys, t)
}

/// Linear blend from `a` at `t == 0` to `b` at `t == 1`.
///
/// # Errors
///
/// Returns [`CurveError::EmptyCurve`] if exactly one of the keys is empty.
pub fn linear(a: &Curve, b: &Curve, t: f64) -> Result<Curve, CurveError> {
    interpolate(&[a.clone(), b.clone()], InterpolationKind::Linear, t)
}

/// Cubic blend between the first two of three keys.
///
/// # Errors
///
/// As [`Interpolator::interpolate`].
pub fn first_spline(keys: &[Curve], t: f64) -> Result<Curve, CurveError> {
    interpolate(keys, InterpolationKind::FirstSpline, t)
}

/// Cubic blend between the middle two of four keys.
///
/// # Errors
///
/// As [`Interpolator::interpolate`].
pub fn spline(keys: &[Curve], t: f64) -> Result<Curve, CurveError> {
    interpolate(keys, InterpolationKind::Spline, t)
}

/// Cubic blend between the last two of three keys.
///
/// # Errors
///
/// As [`Interpolator::interpolate`].
pub fn last_spline(keys: &[Curve], t: f64) -> Result<Curve, CurveError> {
    interpolate(keys, InterpolationKind::LastSpline, t)
}

/// Monotone cubic blend; the variant is chosen from the number of keys.
///
/// Three keys blend over the first interval unless `last` is set; four keys
/// blend over the middle interval.
///
/// # Errors
///
/// Returns [`CurveError::KeyCount`] for anything but three or four keys, and
/// otherwise as [`Interpolator::interpolate`].
pub fn monotone(keys: &[Curve], last: bool, t: f64) -> Result<Curve, CurveError> {
    let kind = match (keys.len(), last) {
        (3, false) => InterpolationKind::FirstMonotone,
        (3, true) => InterpolationKind::LastMonotone,
        _ => InterpolationKind::Monotone,
    };
    interpolate(keys, kind, t)
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::{interpolate, linear, monotone, spline, weld, Interpolator};
    use crate::{Classification, ColorTag, ControlPoint, Curve, CurveError, InterpolationKind, Tuning};

    fn assert_near(p0: Point, p1: Point, epsilon: f64) {
        assert!(p0.distance(p1) < epsilon, "{p0:?} != {p1:?}");
    }

    fn bump(height: f64, width: f64) -> Curve {
        Curve::new(
            vec![
                ControlPoint::new((0.0, 0.0), 0.5, 1.0),
                ControlPoint::new((1.0, height), 0.3, 0.6),
                ControlPoint::new((2.0, 0.0), 0.5, 0.8),
            ],
            width,
        )
    }

    /// A right-angle corner at (10, 10) with `n` controls per leg.
    fn corner(n: usize, offset: f64) -> Curve {
        let mut points = Vec::new();
        for i in 0..n {
            points.push(Point::new(offset, i as f64 * 10.0 / n as f64));
        }
        points.push(Point::new(offset, 10.0));
        for i in 1..=n {
            points.push(Point::new(offset + i as f64 * 10.0 / n as f64, 10.0));
        }
        Curve::from_points(points, 2.0)
    }

    #[test]
    fn linear_is_exact_at_the_keys() {
        let a = bump(1.0, 2.0);
        let b = bump(-0.5, 6.0).with_color(ColorTag::new(1.0, 0.0, 0.0, 1.0));
        let at0 = linear(&a, &b, 0.0).unwrap();
        let at1 = linear(&a, &b, 1.0).unwrap();
        assert_eq!(at0.controls, a.controls);
        assert_eq!(at1.controls, b.controls);
        assert_eq!(at0.width, 2.0);
        assert_eq!(at1.width, 6.0);
        assert_eq!(at0.color, a.color);
        assert_eq!(at1.color, b.color);
        assert_eq!(at0.id, a.id);
        assert_eq!(at1.id, a.id);
        assert_eq!(at0.classification, Classification::Interpolated);

        let mid = linear(&a, &b, 0.5).unwrap();
        assert_eq!(mid.width, 4.0);
        assert_near(mid.controls[1].point, Point::new(1.0, 0.25), 1e-12);
        assert!((mid.controls[1].pressure - 0.6).abs() < 1e-12);
    }

    #[test]
    fn differing_counts_are_resampled() {
        let a = bump(1.0, 2.0);
        let b = Curve::from_points([(0.0, 0.0), (0.5, 0.2), (1.0, 0.3), (1.5, 0.2), (2.0, 0.0)], 2.0);
        assert_eq!(linear(&a, &b, 0.0).unwrap().controls, a.controls);
        assert_eq!(linear(&a, &b, 1.0).unwrap().controls, b.controls);
        let near_a = linear(&a, &b, 1e-12).unwrap();
        assert_eq!(near_a.len(), 5);
        // The shape of `a` survives resampling.
        for p in a.polyline(1.0) {
            assert!(near_a.nearest(p).unwrap().distance_sq < 1e-12, "{p:?}");
        }
    }

    #[test]
    fn keys_with_features_are_exact_at_the_ends() {
        let a = Curve::from_points([(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)], 1.0);
        let b = Curve::from_points([(0.0, 0.0), (1.0, 8.0), (2.0, 0.0)], 1.0);
        let tuning = Tuning::default();
        assert!(a.feature_fraction(&tuning).is_some());
        assert!(b.feature_fraction(&tuning).is_some());
        assert_eq!(linear(&a, &b, 0.0).unwrap().controls, a.controls);
        assert_eq!(linear(&a, &b, 1.0).unwrap().controls, b.controls);

        let keys = [corner(2, 0.0), corner(3, 1.0), corner(4, 2.0)];
        let first = Interpolator::new(InterpolationKind::FirstMonotone);
        assert_eq!(first.interpolate(&keys, 0.0).unwrap().controls, keys[0].controls);
        assert_eq!(first.interpolate(&keys, 1.0).unwrap().controls, keys[1].controls);
        let last = Interpolator::new(InterpolationKind::LastSpline);
        let end = last.interpolate(&keys, 1.0).unwrap();
        assert_eq!(end.controls, keys[2].controls);
        assert_eq!(end.id, keys[1].id);
    }

    #[test]
    fn corner_has_a_feature() {
        let tuning = Tuning::default();
        let f = corner(3, 0.0).feature_fraction(&tuning).unwrap();
        assert!((f - 0.5).abs() < 0.05, "fraction {f}");
        assert!(bump(0.2, 1.0).feature_fraction(&tuning).is_none());
        assert!(Curve::from_points([(0.0, 0.0), (1.0, 5.0)], 1.0).feature_fraction(&tuning).is_none());

        let coarse = Tuning {
            accuracy: 1e-2,
            ..Tuning::default()
        };
        let g = corner(3, 0.0).feature_fraction(&coarse).unwrap();
        assert!((g - f).abs() < 0.01, "fraction {g} against {f}");
    }

    #[test]
    fn corners_stay_sharp() {
        let a = corner(2, 0.0);
        let b = corner(5, 4.0);
        let mid = linear(&a, &b, 0.5).unwrap();
        // The blend passes through the blend of the two corner apexes.
        let apex = |c: &Curve| c.eval(c.pos_at_fraction(0.5)).unwrap();
        let expected = apex(&a).midpoint(apex(&b));
        let nearest = mid.nearest(expected).unwrap();
        assert!(nearest.distance_sq < 1e-10, "{nearest:?}");
        assert_eq!(mid.start_point(), Some(Point::new(2.0, 0.0)));
        assert_eq!(mid.end_point(), Some(Point::new(12.0, 10.0)));
    }

    #[test]
    fn depth_cap_still_blends() {
        let tuning = Tuning {
            max_feature_depth: 0,
            ..Tuning::default()
        };
        let a = corner(2, 0.0);
        let b = corner(3, 0.0);
        let out = Interpolator::new(InterpolationKind::Linear)
            .with_tuning(tuning)
            .interpolate(&[a.clone(), b], 0.5)
            .unwrap();
        assert_eq!(out.len(), 7);
        assert_eq!(out.start_point(), a.start_point());
        assert_eq!(out.end_point(), a.end_point());
    }

    #[test]
    fn spline_reproduces_the_middle_keys() {
        let keys: Vec<Curve> = [0.0, 1.0, 0.5, 0.8].iter().map(|&h| bump(h, 2.0)).collect();
        let at0 = spline(&keys, 0.0).unwrap();
        let at1 = spline(&keys, 1.0).unwrap();
        assert_eq!(at0.id, keys[1].id);
        for (c, k) in at0.controls.iter().zip(&keys[1].controls) {
            assert_near(c.point, k.point, 1e-12);
        }
        for (c, k) in at1.controls.iter().zip(&keys[2].controls) {
            assert_near(c.point, k.point, 1e-12);
        }
        let m = monotone(&keys, false, 0.3).unwrap();
        let peak = m.controls[1].point.y;
        assert!((0.5..=1.0).contains(&peak), "overshoot to {peak}");
    }

    #[test]
    fn key_errors() {
        let a = bump(1.0, 1.0);
        assert_eq!(
            interpolate(&[a.clone()], InterpolationKind::Linear, 0.5),
            Err(CurveError::KeyCount {
                kind: "linear",
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(linear(&a, &Curve::default(), 0.5), Err(CurveError::EmptyCurve));
        let empty = linear(&Curve::default(), &Curve::default(), 0.5).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn weld_keeps_both_shapes() {
        let left = Curve::from_points([(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)], 1.0);
        let right = Curve::from_points([(2.0, 0.0), (3.0, -1.0), (4.0, 0.0)], 1.0);
        let collinear = weld(left.controls.clone(), right.controls.clone());
        assert_eq!(collinear.len(), 4);
        let bent = Curve::from_points([(2.0, 0.0), (3.0, 2.0), (4.0, 0.0)], 1.0);
        let kept = weld(left.controls.clone(), bent.controls.clone());
        assert_eq!(kept.len(), 5);
        for (controls, parts) in [(collinear, [&left, &right]), (kept, [&left, &bent])] {
            let welded = left.with_controls(controls);
            for part in parts {
                for p in part.polyline(1.0) {
                    assert!(welded.nearest(p).unwrap().distance_sq < 1e-12, "{p:?}");
                }
            }
        }
    }
}
