//! # agg-curves
//!
//! Exceedance-probability curves: a probability → loss mapping with
//! memoized linear interpolation, standard return-period extraction and the
//! tail conditional expectation transform.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The [`EpCurve`] type and its curve-type tag.
pub mod ep_curve;

/// Tail conditional expectation (TCE) derived from an OEP curve.
pub mod tce;

pub use ep_curve::{EpCurve, EpType, RETURN_PERIODS};
