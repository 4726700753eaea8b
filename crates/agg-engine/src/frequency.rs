//! Annual occurrence count of a whole table: Poisson with mean equal to the
//! sum of the event rates.

use agg_core::{ensure, Real, Result};
use agg_math::PoissonDistribution;
use agg_tables::EventLossTable;

/// Quantile beyond which occurrence counts are not tabulated.
const MAX_COUNT_QUANTILE: Real = 1.0 - 1.0 / 20_000.0;

/// Poisson occurrence model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyModel {
    poisson: PoissonDistribution,
}

impl FrequencyModel {
    /// Poisson model with mean `lambda`.
    pub fn new(lambda: Real) -> Result<Self> {
        Ok(Self {
            poisson: PoissonDistribution::new(lambda)?,
        })
    }

    /// Poisson model with λ = Σ rates of `elt`.
    ///
    /// # Errors
    /// Returns an error if the total rate is not positive.
    pub fn from_table(elt: &EventLossTable) -> Result<Self> {
        let lambda = elt.total_rate();
        ensure!(
            lambda > 0.0,
            "event loss table has no occurring events (total rate {lambda})"
        );
        Self::new(lambda)
    }

    /// Mean annual number of occurrences.
    pub fn lambda(&self) -> Real {
        self.poisson.lambda()
    }

    /// `P[N = n]`.
    pub fn pmf(&self, n: u64) -> Real {
        self.poisson.pmf(n)
    }

    /// `P[N ≤ n]`.
    pub fn cdf(&self, n: u64) -> Real {
        self.poisson.cdf(n)
    }

    /// Smallest `n` with `P[N ≤ n] > p`.
    pub fn inverse_cdf(&self, p: Real) -> Result<u64> {
        self.poisson.inverse_cdf(p)
    }

    /// Largest count tabulated by [`FrequencyModel::distribution`]:
    /// `max(3, 1 + inverse_cdf(1 − 1/20000))`.
    pub fn max_event_count(&self) -> Result<u64> {
        Ok(3_u64.max(1 + self.inverse_cdf(MAX_COUNT_QUANTILE)?))
    }

    /// `P[N = n]` for `n = 0..=max_event_count()`.
    pub fn distribution(&self) -> Result<Vec<Real>> {
        Ok((0..=self.max_event_count()?).map(|n| self.pmf(n)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_tables::EventRecord;
    use approx::assert_relative_eq;

    #[test]
    fn lambda_is_total_rate() {
        let elt = EventLossTable::new(vec![
            EventRecord::new(1, 0.0081, 1.0, 0.0, 0.0, 10.0).unwrap(),
            EventRecord::new(2, 0.0065, 1.0, 0.0, 0.0, 10.0).unwrap(),
            EventRecord::new(3, 0.0, 1.0, 0.0, 0.0, 10.0).unwrap(),
        ])
        .unwrap();
        let model = FrequencyModel::from_table(&elt).unwrap();
        assert_eq!(model.lambda(), elt.total_rate());
    }

    #[test]
    fn rare_events_tabulate_at_least_four_counts() {
        let model = FrequencyModel::new(0.03476).unwrap();
        assert_eq!(model.max_event_count().unwrap(), 3);
        let dist = model.distribution().unwrap();
        assert_eq!(dist.len(), 4);
        assert_relative_eq!(dist[0], (-0.03476_f64).exp(), max_relative = 1e-12);
        assert_relative_eq!(dist[1], 0.03476 * (-0.03476_f64).exp(), max_relative = 1e-12);
    }

    #[test]
    fn frequent_events_extend_the_table() {
        let model = FrequencyModel::new(10.0).unwrap();
        let n = model.max_event_count().unwrap();
        assert!(model.cdf(n - 1) > MAX_COUNT_QUANTILE);
        assert!(model.cdf(n - 2) <= MAX_COUNT_QUANTILE);
        let total: Real = model.distribution().unwrap().iter().sum();
        assert!(total > MAX_COUNT_QUANTILE && total <= 1.0 + 1e-12);
    }

    #[test]
    fn empty_rate_is_rejected() {
        let elt = EventLossTable::new(vec![
            EventRecord::new(1, 0.0, 1.0, 0.0, 0.0, 10.0).unwrap(),
        ])
        .unwrap();
        assert!(FrequencyModel::from_table(&elt).is_err());
    }
}
