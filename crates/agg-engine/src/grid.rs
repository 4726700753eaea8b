//! Uniform loss grid `0, Δ, 2Δ, …, NΔ` on which severities and aggregate
//! losses are discretized.

use agg_core::{ensure, Loss, Result, Size};
use agg_tables::EventLossTable;
use tracing::debug;

use crate::settings::AggregationSettings;

/// A grid of `size` steps of width `step` covering `[0, max_loss]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossGrid {
    size: Size,
    max_loss: Loss,
    step: Loss,
}

impl LossGrid {
    /// Create a grid with `size` steps over `[0, max_loss]`.
    ///
    /// # Errors
    /// Returns an error unless `size` is a power of two ≥ 2 and `max_loss`
    /// is finite and positive.
    pub fn new(max_loss: Loss, size: Size) -> Result<Self> {
        ensure!(
            size >= 2 && size.is_power_of_two(),
            "grid size must be a power of two of at least 2, got {size}"
        );
        ensure!(
            max_loss.is_finite() && max_loss > 0.0,
            "grid maximum loss must be finite and positive, got {max_loss}"
        );
        Ok(Self {
            size,
            max_loss,
            step: max_loss / size as Loss,
        })
    }

    /// The grid for `elt`: `max_loss_factor` times its largest mean loss.
    ///
    /// # Errors
    /// Returns an error if the settings are invalid or every mean loss is 0.
    pub fn for_table(elt: &EventLossTable, settings: &AggregationSettings) -> Result<Self> {
        settings.validate()?;
        let largest = elt.max_loss();
        ensure!(
            largest > 0.0,
            "cannot size a loss grid for a table whose mean losses are all zero"
        );
        let grid = Self::new(settings.max_loss_factor * largest, settings.grid_size)?;
        debug!(
            size = grid.size,
            max_loss = grid.max_loss,
            step = grid.step,
            "loss grid"
        );
        Ok(grid)
    }

    /// Number of steps N.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Upper end of the grid.
    pub fn max_loss(&self) -> Loss {
        self.max_loss
    }

    /// Step width Δ.
    pub fn step(&self) -> Loss {
        self.step
    }

    /// Node `k`, i.e. `kΔ`.
    pub fn threshold(&self, k: Size) -> Loss {
        k as Loss * self.step
    }

    /// Upper edge `(k + ½)Δ` of the bin rounded to node `k`.
    pub fn bin_edge(&self, k: Size) -> Loss {
        (k as Loss + 0.5) * self.step
    }

    /// All N + 1 nodes `0, Δ, …, NΔ`.
    pub fn thresholds(&self) -> impl Iterator<Item = Loss> + '_ {
        (0..=self.size).map(move |k| self.threshold(k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_tables::EventRecord;

    #[test]
    fn nodes_and_edges() {
        let grid = LossGrid::new(40.0, 4).unwrap();
        assert_eq!(grid.step(), 10.0);
        assert_eq!(grid.thresholds().collect::<Vec<_>>(), vec![0.0, 10.0, 20.0, 30.0, 40.0]);
        assert_eq!(grid.bin_edge(0), 5.0);
        assert_eq!(grid.bin_edge(3), 35.0);
    }

    #[test]
    fn rejects_bad_sizes() {
        assert!(LossGrid::new(40.0, 3).is_err());
        assert!(LossGrid::new(40.0, 1).is_err());
        assert!(LossGrid::new(0.0, 4).is_err());
    }

    #[test]
    fn sized_from_largest_mean_loss() {
        let elt = EventLossTable::new(vec![
            EventRecord::new(1, 0.1, 100.0, 10.0, 10.0, 1000.0).unwrap(),
            EventRecord::new(2, 0.1, 300.0, 10.0, 10.0, 1000.0).unwrap(),
        ])
        .unwrap();
        let settings = AggregationSettings::default().with_grid_size(8);
        let grid = LossGrid::for_table(&elt, &settings).unwrap();
        assert_eq!(grid.max_loss(), 1500.0);
        assert_eq!(grid.step(), 1500.0 / 8.0);

        let zero = EventLossTable::new(vec![
            EventRecord::new(1, 0.1, 0.0, 0.0, 0.0, 1000.0).unwrap(),
        ])
        .unwrap();
        assert!(LossGrid::for_table(&zero, &settings).is_err());
    }
}
