//! # agg-engine
//!
//! Frequency-severity aggregation of an Event Loss Table.
//!
//! Each event's loss given occurrence is modelled as a Beta distribution on
//! `[0, exposure]` fitted by moments; the number of occurrences per year is
//! Poisson with mean equal to the table's total rate.  From these the engine
//! derives:
//!
//! - the conditional exceedance probability (CEP) of a single occurrence,
//! - the occurrence exceedance probability (OEP) curve, analytically,
//! - the aggregate exceedance probability (AEP) curve, by compounding the
//!   discretized severity through the FFT.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// ── Modules ───────────────────────────────────────────────────────────────────

/// The aggregation engine and its free-function entry points.
pub mod aggregation;

/// Poisson occurrence model.
pub mod frequency;

/// The discretization grid over loss.
pub mod grid;

/// Per-event Beta severity.
pub mod severity;

/// Engine configuration.
pub mod settings;

// ── Convenience re-exports ────────────────────────────────────────────────────

pub use aggregation::{
    calculate_aep_curve, calculate_frequency_distribution, calculate_oep_curve,
    calculate_severity_distribution, AggregationEngine, AGGREGATE_TAIL_STD_DEVS,
};
pub use frequency::FrequencyModel;
pub use grid::LossGrid;
pub use settings::AggregationSettings;
pub use severity::{SeverityDistribution, SeverityModel};
