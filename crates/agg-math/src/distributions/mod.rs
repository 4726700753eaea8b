//! Probability distributions used by the aggregation engine.
//!
//! Provides the Beta severity distribution and the Poisson frequency
//! distribution, both wrapping the `statrs` implementations.

pub mod beta;
pub mod poisson;

pub use beta::{BetaDistribution, BETA_SHAPE_FLOOR};
pub use poisson::PoissonDistribution;
