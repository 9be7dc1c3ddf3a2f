// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Control points.

use kurbo::Point;

/// The weight that places a connecting point halfway between two controls.
pub const NEUTRAL_WEIGHT: f64 = 0.5;

/// One node of a [`Curve`](crate::Curve).
///
/// Interior control points do not lie on the curve. Between two adjacent
/// controls `a` and `b` the curve passes through the *connecting point*
/// `a.point.lerp(b.point, a.weight)`, so the weight of a control biases where
/// the curve leaves its neighborhood. Pressure is blended with the same rule.
///
/// Both scalars are always finite and within `[0, 1]`; see [`ControlPoint::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawControlPoint"))]
pub struct ControlPoint {
    /// Position of the control.
    pub point: Point,
    /// Blend weight towards the next control.
    pub weight: f64,
    /// Pen pressure at this control.
    pub pressure: f64,
}

impl ControlPoint {
    /// Create a control point, repairing invalid input.
    ///
    /// Non-finite coordinates are replaced by zero. A NaN weight becomes
    /// [`NEUTRAL_WEIGHT`] and a NaN pressure becomes 1; anything else out of
    /// range is clamped into `[0, 1]`.
    pub fn new(point: impl Into<Point>, weight: f64, pressure: f64) -> ControlPoint {
        ControlPoint {
            point: sanitize_point(point.into()),
            weight: sanitize_unit(weight, NEUTRAL_WEIGHT),
            pressure: sanitize_unit(pressure, 1.0),
        }
    }

    /// A control with neutral weight and full pressure.
    pub fn at(point: impl Into<Point>) -> ControlPoint {
        ControlPoint::new(point, NEUTRAL_WEIGHT, 1.0)
    }

    /// Returns a copy with a different weight, sanitized like [`ControlPoint::new`].
    #[must_use]
    pub fn with_weight(self, weight: f64) -> ControlPoint {
        ControlPoint {
            weight: sanitize_unit(weight, NEUTRAL_WEIGHT),
            ..self
        }
    }

    /// Returns a copy with a different pressure, sanitized like [`ControlPoint::new`].
    #[must_use]
    pub fn with_pressure(self, pressure: f64) -> ControlPoint {
        ControlPoint {
            pressure: sanitize_unit(pressure, 1.0),
            ..self
        }
    }

    /// The connecting point between this control and `next`.
    #[inline]
    pub fn connect(&self, next: &ControlPoint) -> Point {
        self.point.lerp(next.point, self.weight)
    }

    /// The connecting pressure between this control and `next`.
    #[inline]
    pub fn connect_pressure(&self, next: &ControlPoint) -> f64 {
        self.pressure + (next.pressure - self.pressure) * self.weight
    }
}

impl Default for ControlPoint {
    fn default() -> Self {
        ControlPoint::at(Point::ZERO)
    }
}

impl From<Point> for ControlPoint {
    fn from(point: Point) -> Self {
        ControlPoint::at(point)
    }
}

impl From<(f64, f64)> for ControlPoint {
    fn from(point: (f64, f64)) -> Self {
        ControlPoint::at(point)
    }
}

/// Clamp a value into `[0, 1]`, mapping NaN to `nan_value`.
pub(crate) fn sanitize_unit(value: f64, nan_value: f64) -> f64 {
    if value.is_nan() {
        nan_value
    } else {
        value.clamp(0.0, 1.0)
    }
}

fn sanitize_point(p: Point) -> Point {
    let fix = |v: f64| if v.is_finite() { v } else { 0.0 };
    Point::new(fix(p.x), fix(p.y))
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawControlPoint {
    point: Point,
    #[serde(default = "neutral_weight")]
    weight: f64,
    #[serde(default = "full_pressure")]
    pressure: f64,
}

#[cfg(feature = "serde")]
fn neutral_weight() -> f64 {
    NEUTRAL_WEIGHT
}

#[cfg(feature = "serde")]
fn full_pressure() -> f64 {
    1.0
}

#[cfg(feature = "serde")]
impl From<RawControlPoint> for ControlPoint {
    fn from(raw: RawControlPoint) -> Self {
        ControlPoint::new(raw.point, raw.weight, raw.pressure)
    }
}
