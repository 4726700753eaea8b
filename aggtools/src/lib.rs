//! # aggtools
//!
//! Catastrophe loss aggregation: Event and Period Loss Tables,
//! frequency-severity compounding and exceedance-probability curves.
//!
//! This crate is a **façade** that re-exports the public items of the
//! workspace crates. Application code should depend on this crate rather
//! than the individual `agg-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use aggtools::engine::{calculate_oep_curve, AggregationSettings};
//! use aggtools::tables::{EventLossTable, EventRecord};
//!
//! let elt = EventLossTable::new(vec![
//!     EventRecord::new(1, 0.01, 1_500_000.0, 500_000.0, 300_000.0, 5_500_000.0)?,
//!     EventRecord::new(2, 0.02, 400_000.0, 150_000.0, 100_000.0, 2_000_000.0)?,
//! ])?;
//! let settings = AggregationSettings::default().with_grid_size(1024);
//! let mut oep = calculate_oep_curve(&elt, settings)?;
//! let one_in_100 = oep.loss_at_return_period(100.0)?;
//! assert!(one_in_100 > 0.0 && one_in_100 <= oep.max_loss());
//! # Ok::<(), aggtools::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use agg_core as core;

/// Beta and Poisson distributions, FFT.
pub use agg_math as math;

/// Exceedance-probability curves.
pub use agg_curves as curves;

/// Event and Period Loss Tables.
pub use agg_tables as tables;

/// Frequency-severity aggregation engine.
pub use agg_engine as engine;
