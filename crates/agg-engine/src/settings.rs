//! Configuration of the aggregation engine.
//!
//! Settings are a plain value handed to each engine; there is no
//! process-wide state.

use agg_core::{ensure, Real, Result, Size};
use serde::{Deserialize, Serialize};

/// Default number of grid steps, 2¹⁴.
pub const DEFAULT_GRID_SIZE: Size = 1 << 14;

/// Default ratio of the grid's maximum loss to the largest event mean loss.
pub const DEFAULT_MAX_LOSS_FACTOR: Real = 5.0;

/// Discretization settings for [`crate::AggregationEngine`].
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use agg_engine::AggregationSettings;
/// let s: AggregationSettings = serde_json::from_str(r#"{"grid_size": 1024}"#).unwrap();
/// assert_eq!(s, AggregationSettings::default().with_grid_size(1024));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationSettings {
    /// Number of grid steps N; must be a power of two ≥ 2.
    pub grid_size: Size,
    /// The grid spans `[0, max_loss_factor × largest mean loss]`.
    pub max_loss_factor: Real,
}

impl Default for AggregationSettings {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            max_loss_factor: DEFAULT_MAX_LOSS_FACTOR,
        }
    }
}

impl AggregationSettings {
    /// Set the number of grid steps.
    pub fn with_grid_size(mut self, grid_size: Size) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Set the maximum loss factor.
    pub fn with_max_loss_factor(mut self, max_loss_factor: Real) -> Self {
        self.max_loss_factor = max_loss_factor;
        self
    }

    /// Check the settings.
    ///
    /// # Errors
    /// Returns an error if `grid_size` is not a power of two ≥ 2 or
    /// `max_loss_factor` is not finite and positive.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_size >= 2 && self.grid_size.is_power_of_two(),
            "grid size must be a power of two of at least 2, got {}",
            self.grid_size
        );
        ensure!(
            self.max_loss_factor.is_finite() && self.max_loss_factor > 0.0,
            "max loss factor must be finite and positive, got {}",
            self.max_loss_factor
        );
        Ok(())
    }
}
