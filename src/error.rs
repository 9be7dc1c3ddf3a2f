// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by the fallible curve operations.

/// An error from a curve operation that was called with unusable arguments.
///
/// Most operations in this crate repair bad numeric input instead of failing,
/// and the panicking variants of the operations below treat these as
/// precondition violations. The `try_` variants surface them as values.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum CurveError {
    /// A resample asked for fewer controls than the curve already has.
    #[error("cannot resample a curve of {current} controls down to {requested}")]
    ShrinkingResample {
        /// Number of controls in the curve.
        current: usize,
        /// Number of controls requested.
        requested: usize,
    },
    /// The operation needs at least one control point.
    #[error("the curve has no control points")]
    EmptyCurve,
    /// A segment index past the last segment of the curve.
    #[error("segment {index} is out of bounds for a curve with {count} segments")]
    SegmentOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of segments in the curve.
        count: usize,
    },
    /// A range that starts after it ends, or reaches past the curve.
    #[error("the range does not lie within the curve")]
    InvalidRange,
    /// An interpolation was given the wrong number of key curves.
    #[error("{kind} interpolation needs {expected} key curves, got {actual}")]
    KeyCount {
        /// Name of the interpolation kind.
        kind: &'static str,
        /// Number of keys the kind consumes.
        expected: usize,
        /// Number of keys supplied.
        actual: usize,
    },
}
