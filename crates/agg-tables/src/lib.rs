//! # agg-tables
//!
//! Loss tables: the Event Loss Table (ELT) of analytic per-event loss
//! statistics and the Period Loss Table (PLT) of simulated-year losses,
//! together with their grouping rules and summary statistics.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Event Loss Table.
pub mod elt;

/// Marginal impact of adding a submission to a base portfolio.
pub mod marginal;

/// Period Loss Table.
pub mod plt;

pub use elt::{group_records, EventLossTable, EventRecord, RawEventRecord};
pub use marginal::MarginalImpact;
pub use plt::{PeriodLoss, PeriodLossTable, RawPeriodLoss, MAX_SIMULATIONS};
