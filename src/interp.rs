// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar interpolation families used for keyframe blending.
//!
//! Every family blends a short list of key values (two to four) over one
//! interval of that list. The cubic families are cubic Hermite splines with
//! Catmull-Rom tangents, one-sided at the ends of the key list. The monotone
//! families limit those tangents with the Fritsch–Carlson rule so that the
//! result never overshoots the keys.

use core::fmt;

use kurbo::Point;
use smallvec::SmallVec;

/// How a set of key curves is blended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum InterpolationKind {
    /// Straight blend between two keys.
    Linear,
    /// Cubic blend between the first two of three keys.
    FirstSpline,
    /// Cubic blend between the middle two of four keys.
    Spline,
    /// Cubic blend between the last two of three keys.
    LastSpline,
    /// Like [`FirstSpline`](Self::FirstSpline), without overshoot.
    FirstMonotone,
    /// Like [`Spline`](Self::Spline), without overshoot.
    Monotone,
    /// Like [`LastSpline`](Self::LastSpline), without overshoot.
    LastMonotone,
}

impl InterpolationKind {
    /// Number of key values this kind consumes.
    pub fn key_count(self) -> usize {
        match self {
            Self::Linear => 2,
            Self::FirstSpline | Self::LastSpline | Self::FirstMonotone | Self::LastMonotone => 3,
            Self::Spline | Self::Monotone => 4,
        }
    }

    /// Index of the key at the start of the blended interval.
    ///
    /// At `t == 0` the blend reproduces this key exactly.
    pub fn primary_index(self) -> usize {
        match self {
            Self::Linear | Self::FirstSpline | Self::FirstMonotone => 0,
            Self::Spline | Self::Monotone | Self::LastSpline | Self::LastMonotone => 1,
        }
    }

    /// Whether tangents are limited to avoid overshoot.
    pub fn is_monotone(self) -> bool {
        matches!(self, Self::FirstMonotone | Self::Monotone | Self::LastMonotone)
    }

    /// A short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::FirstSpline => "first spline",
            Self::Spline => "spline",
            Self::LastSpline => "last spline",
            Self::FirstMonotone => "first monotone",
            Self::Monotone => "monotone",
            Self::LastMonotone => "last monotone",
        }
    }

    /// Blend scalar keys at `t` in `[0, 1]` over this kind's interval.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` differs from [`key_count`](Self::key_count).
    pub fn eval(self, values: &[f64], t: f64) -> f64 {
        assert_eq!(
            values.len(),
            self.key_count(),
            "{} interpolation takes {} keys",
            self.name(),
            self.key_count()
        );
        let i = self.primary_index();
        if self == Self::Linear {
            return lerp(values[0], values[1], t);
        }
        let m = tangents(values, self.is_monotone());
        hermite(values[i], values[i + 1], m[i], m[i + 1], t)
    }

    /// Blend points componentwise, see [`eval`](Self::eval).
    pub fn eval_point(self, points: &[Point], t: f64) -> Point {
        let xs: SmallVec<[f64; 4]> = points.iter().map(|p| p.x).collect();
        let ys: SmallVec<[f64; 4]> = points.iter().map(|p| p.y).collect();
        Point::new(self.eval(&xs, t), self.eval(&ys, t))
    }
}

impl fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Linear interpolation, exact at both ends.
#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Cubic Hermite interpolation between `y0` and `y1` with tangents `m0`, `m1`.
pub fn hermite(y0: f64, y1: f64, m0: f64, m1: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    h00 * y0 + h10 * m0 + h01 * y1 + h11 * m1
}

/// Tangents at every key, for keys at unit spacing.
///
/// Interior tangents are the Catmull-Rom central differences; the end
/// tangents are one-sided. With `monotone`, tangents are limited as in
/// Fritsch and Carlson, "Monotone Piecewise Cubic Interpolation" (1980).
pub fn tangents(values: &[f64], monotone: bool) -> SmallVec<[f64; 4]> {
    let n = values.len();
    let mut m: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, n);
    if n < 2 {
        return m;
    }
    let d: SmallVec<[f64; 4]> = values.windows(2).map(|w| w[1] - w[0]).collect();
    m[0] = d[0];
    m[n - 1] = d[n - 2];
    for k in 1..n - 1 {
        m[k] = if monotone && d[k - 1] * d[k] <= 0.0 {
            0.0
        } else {
            0.5 * (d[k - 1] + d[k])
        };
    }
    if monotone {
        for k in 0..n - 1 {
            if d[k] == 0.0 {
                m[k] = 0.0;
                m[k + 1] = 0.0;
                continue;
            }
            let a = m[k] / d[k];
            let b = m[k + 1] / d[k];
            // Tangents pointing against the secant cannot stay monotone.
            if a < 0.0 {
                m[k] = 0.0;
            }
            if b < 0.0 {
                m[k + 1] = 0.0;
            }
            let s = a * a + b * b;
            if s > 9.0 {
                let tau = 3.0 / s.sqrt();
                m[k] = tau * a * d[k];
                m[k + 1] = tau * b * d[k];
            }
        }
    }
    m
}

/// Piecewise-linear interpolation over sparse keys at integer positions.
///
/// `known` holds `(index, value)` pairs sorted by index. Positions before the
/// first or after the last known key take that key's value.
pub fn piecewise_linear(known: &[(usize, f64)], index: usize) -> Option<f64> {
    let (first, last) = (known.first()?, known.last()?);
    if index <= first.0 {
        return Some(first.1);
    }
    if index >= last.0 {
        return Some(last.1);
    }
    let upper = known.iter().position(|&(i, _)| i >= index)?;
    let (i1, v1) = known[upper];
    if i1 == index {
        return Some(v1);
    }
    let (i0, v0) = known[upper - 1];
    let t = (index - i0) as f64 / (i1 - i0) as f64;
    Some(lerp(v0, v1, t))
}
