//! # agg-core
//!
//! Core types and error definitions for aggtools-rs.
//!
//! This crate provides the building blocks shared across the workspace:
//! primitive type aliases and the error hierarchy with its `ensure!` /
//! `fail!` macros.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Public modules ───────────────────────────────────────────────────────────

/// Error types and the `ensure!` / `fail!` macros.
pub mod errors;

// ── Primitive type aliases ────────────────────────────────────────────────────

/// Floating-point type used throughout the library.
pub type Real = f64;

/// Alias used for array sizes / indices.
pub type Size = usize;

/// An annual exceedance or occurrence probability in `[0, 1]`.
pub type Probability = Real;

/// A monetary loss amount.
pub type Loss = Real;

/// Identifier of a catalogue event.
pub type EventId = u64;

/// Identifier of a simulated period (year), starting at 1.
pub type PeriodId = u32;

// ── Re-exports for convenience ────────────────────────────────────────────────

pub use errors::{Error, Result};
