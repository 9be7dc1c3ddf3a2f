// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Heuristic constants that shape sampling, interpolation and snapping.
//!
//! None of these values affect the correctness of the algorithms, but they do
//! affect how strokes look. They are kept together so that an application can
//! adjust them in one place (and persist them, with the `serde` feature).

use core::f64::consts::PI;

/// Accuracy used for arc length computations.
pub const DEFAULT_ACCURACY: f64 = 1e-9;

/// Tunable constants for the curve engine.
///
/// Use [`Tuning::default`] unless there is a measured reason not to.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Tuning {
    /// Accuracy of the arc length solves in feature detection and of the
    /// nearest-point solve against a lasso's closing edge.
    ///
    /// The plain [`Curve`](crate::Curve) queries use [`DEFAULT_ACCURACY`].
    pub accuracy: f64,
    /// A curve needs a feature split when its largest deviation from the
    /// endpoint chord exceeds this fraction of its own length.
    pub feature_deviation_ratio: f64,
    /// Maximum recursion depth of feature-synchronized splitting.
    pub max_feature_depth: usize,
    /// Feature split fractions closer than this to either end are ignored.
    pub min_feature_fraction: f64,
    /// Number of probes per segment used to find the feature point.
    pub feature_probes: usize,
    /// A segment whose chord sub-lengths have a smaller ratio than this is
    /// split once more before sampling.
    pub chord_ratio: f64,
    /// A segment turning by more than this angle (radians) is split once more
    /// before sampling.
    pub sharp_turn: f64,
    /// Lower clamp of the per-segment sample count.
    pub min_samples: usize,
    /// Upper clamp of the per-segment sample count.
    pub max_samples: usize,
    /// Samples per unit of arc length for a segment that does not turn.
    pub flat_density: f64,
    /// Samples per unit of arc length for a segment that turns by π.
    pub turn_density: f64,
    /// The stroke width sample densities are calibrated for.
    pub nominal_width: f64,
    /// Upper bound of `nominal_width / width` when scaling sample density.
    pub max_width_ratio: f64,
    /// Relative size under which a control is considered to coincide with a
    /// segment endpoint.
    pub degenerate_ratio: f64,
    /// Intersection searches stop subdividing below this size.
    pub intersection_tolerance: f64,
}

impl Tuning {
    /// The default tuning, as a constant.
    pub const DEFAULT: Tuning = Tuning {
        accuracy: DEFAULT_ACCURACY,
        feature_deviation_ratio: 0.25,
        max_feature_depth: 4,
        min_feature_fraction: 0.02,
        feature_probes: 8,
        chord_ratio: 0.35,
        sharp_turn: PI * 0.5,
        min_samples: 2,
        max_samples: 32,
        flat_density: 0.1,
        turn_density: 1.0,
        nominal_width: 4.0,
        max_width_ratio: 8.0,
        degenerate_ratio: 1e-3,
        intersection_tolerance: 1e-7,
    };

    /// Samples per unit of arc length for a segment turning by `turn` radians.
    ///
    /// Interpolates between [`flat_density`](Self::flat_density) and
    /// [`turn_density`](Self::turn_density).
    pub fn density(&self, turn: f64) -> f64 {
        let s = (turn.abs() / PI).clamp(0.0, 1.0);
        crate::interp::lerp(self.flat_density, self.turn_density, s)
    }

    /// How much denser than nominal a stroke of `width` is sampled.
    pub fn width_scale(&self, width: f64) -> f64 {
        if width <= 0.0 || width.is_nan() {
            return self.max_width_ratio;
        }
        (self.nominal_width / width).clamp(1.0 / self.max_width_ratio, self.max_width_ratio)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::DEFAULT
    }
}
