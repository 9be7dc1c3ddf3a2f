// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The stroke curve.

use core::fmt;

use kurbo::Point;
use uuid::Uuid;

use crate::control::sanitize_unit;
use crate::{ControlPoint, CurvePos};

/// The widest stroke a curve may carry.
pub const MAX_WIDTH: f64 = 1024.0;

/// Identity of a curve.
///
/// Identity is a plain value: every operation that produces a curve states
/// whether the result keeps the id of its input or receives a fresh one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CurveId(Uuid);

impl CurveId {
    /// Generate a new, globally unique id.
    pub fn new() -> CurveId {
        CurveId(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> CurveId {
        CurveId(uuid)
    }

    /// The underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for CurveId {
    fn default() -> Self {
        CurveId::new()
    }
}

impl fmt::Debug for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CurveId({})", self.0)
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The role of a curve in an animation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum Classification {
    /// A plain drawing.
    #[default]
    None,
    /// A keyframe drawn by the user.
    Key,
    /// A frame produced by interpolating keys.
    Interpolated,
}

/// An opaque RGBA tag carried along with a curve.
///
/// The engine never interprets the components; it copies them and, when
/// interpolating keyframes, blends them componentwise.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorTag(pub [f64; 4]);

impl ColorTag {
    /// Opaque black.
    pub const BLACK: ColorTag = ColorTag([0.0, 0.0, 0.0, 1.0]);

    /// Create a tag from RGBA components, clamped into `[0, 1]`.
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> ColorTag {
        ColorTag([r, g, b, a]).sanitized()
    }

    /// Apply `f` to every component and clamp the results.
    #[must_use]
    pub fn map(self, mut f: impl FnMut(usize, f64) -> f64) -> ColorTag {
        let mut c = self.0;
        for (i, v) in c.iter_mut().enumerate() {
            *v = f(i, *v);
        }
        ColorTag(c).sanitized()
    }

    fn sanitized(self) -> ColorTag {
        ColorTag(self.0.map(|v| sanitize_unit(v, 0.0)))
    }
}

impl Default for ColorTag {
    fn default() -> Self {
        ColorTag::BLACK
    }
}

/// A stroke: an ordered sequence of control points with a width.
///
/// The shape of the curve is defined by its [segments](Curve::segments). A
/// curve with 0, 1, 2 or 3 controls is valid; each count has its own
/// segment rule.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "RawCurve"))]
pub struct Curve {
    /// The control points.
    pub controls: Vec<ControlPoint>,
    /// Stroke width at full pressure, in `[0, MAX_WIDTH]`.
    pub width: f64,
    /// Identity of this curve.
    pub id: CurveId,
    /// Role of this curve in an animation.
    pub classification: Classification,
    /// Color tag.
    pub color: ColorTag,
}

impl Curve {
    /// Create a curve with a fresh id.
    ///
    /// The width is clamped into `[0, MAX_WIDTH]`; NaN becomes 0.
    pub fn new(controls: Vec<ControlPoint>, width: f64) -> Curve {
        Curve {
            controls,
            width: sanitize_width(width),
            id: CurveId::new(),
            classification: Classification::None,
            color: ColorTag::BLACK,
        }
    }

    /// Create a curve from points, using neutral weights and full pressure.
    pub fn from_points<P: Into<Point>>(points: impl IntoIterator<Item = P>, width: f64) -> Curve {
        Curve::new(points.into_iter().map(ControlPoint::at).collect(), width)
    }

    /// Returns a copy with the given controls and everything else unchanged.
    #[must_use]
    pub fn with_controls(&self, controls: Vec<ControlPoint>) -> Curve {
        Curve {
            controls,
            ..self.clone_meta()
        }
    }

    /// Returns a copy with a fresh id.
    #[must_use]
    pub fn with_new_id(mut self) -> Curve {
        self.id = CurveId::new();
        self
    }

    /// Returns a copy with another classification.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Curve {
        self.classification = classification;
        self
    }

    /// Returns a copy with another color tag.
    #[must_use]
    pub fn with_color(mut self, color: ColorTag) -> Curve {
        self.color = color;
        self
    }

    /// Set the width, clamping it like [`Curve::new`].
    pub fn set_width(&mut self, width: f64) {
        self.width = sanitize_width(width);
    }

    /// Number of control points.
    #[inline]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Whether the curve has no control points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// The first point of the curve, which always lies on it.
    pub fn start_point(&self) -> Option<Point> {
        self.controls.first().map(|c| c.point)
    }

    /// The last point of the curve, which always lies on it.
    pub fn end_point(&self) -> Option<Point> {
        self.controls.last().map(|c| c.point)
    }

    /// Index of the last segment, `max(0, n - 3)`.
    #[inline]
    pub fn max_segment_index(&self) -> usize {
        self.len().saturating_sub(3)
    }

    /// The position at the very end of the curve.
    pub fn end_pos(&self) -> CurvePos {
        CurvePos::new(self.max_segment_index(), 1.0)
    }

    /// Whether the first and last point coincide.
    pub fn is_closed(&self) -> bool {
        match (self.start_point(), self.end_point()) {
            (Some(a), Some(b)) => self.len() > 2 && a == b,
            _ => false,
        }
    }

    /// A copy of everything except the controls.
    fn clone_meta(&self) -> Curve {
        Curve {
            controls: Vec::new(),
            width: self.width,
            id: self.id,
            classification: self.classification,
            color: self.color,
        }
    }
}

impl Default for Curve {
    fn default() -> Self {
        Curve::new(Vec::new(), 1.0)
    }
}

fn sanitize_width(width: f64) -> f64 {
    if width.is_nan() {
        0.0
    } else {
        width.clamp(0.0, MAX_WIDTH)
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawCurve {
    controls: Vec<ControlPoint>,
    width: f64,
    #[serde(default)]
    id: CurveId,
    #[serde(default)]
    classification: Classification,
    #[serde(default)]
    color: ColorTag,
}

#[cfg(feature = "serde")]
impl From<RawCurve> for Curve {
    fn from(raw: RawCurve) -> Self {
        Curve {
            controls: raw.controls,
            width: sanitize_width(raw.width),
            id: raw.id,
            classification: raw.classification,
            color: raw.color.sanitized(),
        }
    }
}
