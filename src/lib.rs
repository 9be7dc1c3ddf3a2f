// Copyright 2026 the Inkline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A parametric stroke-curve engine for freehand vector drawing.
//!
//! A [`Curve`] is a sequence of [`ControlPoint`]s. Each control carries a
//! weight that says where, between it and the next control, the curve passes
//! through, and a pressure that scales the stroke width. The shape is a chain
//! of quadratic Bézier segments (see [`Curve::segments`]) built on the
//! [`kurbo`] primitives.
//!
//! On top of that, this crate provides the operations a drawing application
//! needs:
//!
//! - exact splitting, point insertion and resampling ([`Curve::sub_curve`],
//!   [`Curve::insert_point`], [`Curve::resampled`]),
//! - keyframe blending of two to four curves ([`Interpolator`]),
//! - lasso selection ([`Lasso`]),
//! - nearest-point and intersection queries ([`Curve::nearest`],
//!   [`Curve::intersections`]),
//! - adaptive flattening for rendering ([`Sampler`]).
//!
//! # Examples
//!
//! ```
//! use inkline::{ControlPoint, Curve};
//!
//! let curve = Curve::new(
//!     vec![
//!         ControlPoint::new((0.0, 0.0), 0.5, 1.0),
//!         ControlPoint::new((1.0, 2.0), 0.5, 1.0),
//!         ControlPoint::new((3.0, 2.0), 0.5, 1.0),
//!         ControlPoint::at((4.0, 0.0)),
//!     ],
//!     2.0,
//! );
//! assert_eq!(curve.segment_count(), 2);
//!
//! let (before, after) = curve.split_at(0.5);
//! assert_eq!(before.end_point(), after.start_point());
//! assert!((before.length() + after.length() - curve.length()).abs() < 1e-6);
//! ```
//!
//! # Features
//!
//! The `serde` feature derives `Serialize` and `Deserialize` for the value
//! types. Deserialized controls and curves are sanitized the same way as
//! constructed ones.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.

#![forbid(unsafe_code)]
#![deny(missing_docs, clippy::trivially_copy_pass_by_ref)]
#![warn(clippy::doc_markdown, rustdoc::broken_intra_doc_links)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(unused_qualifications)]
#![allow(clippy::many_single_char_names, clippy::excessive_precision)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod control;
mod curve;
mod error;
pub mod interp;
mod interpolate;
pub mod intersect;
mod lasso;
mod query;
mod range;
mod sample;
mod segment;
mod split;
mod tuning;

pub use crate::control::*;
pub use crate::curve::*;
pub use crate::error::*;
pub use crate::interp::InterpolationKind;
pub use crate::interpolate::*;
pub use crate::lasso::*;
pub use crate::query::*;
pub use crate::range::*;
pub use crate::sample::*;
pub use crate::segment::*;
pub use crate::split::*;
pub use crate::tuning::*;
