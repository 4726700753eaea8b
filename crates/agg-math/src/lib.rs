//! # agg-math
//!
//! Mathematical utilities for loss aggregation: Beta and Poisson
//! distributions (via statrs) and a radix-2 fast Fourier transform over
//! `num_complex::Complex64`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// Probability distributions.
pub mod distributions;

/// Radix-2 fast Fourier transform.
pub mod fft;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use distributions::{BetaDistribution, PoissonDistribution, BETA_SHAPE_FLOOR};
pub use fft::{fft, ifft};
