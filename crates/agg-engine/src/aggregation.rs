//! Occurrence and aggregate exceedance curves of an Event Loss Table.
//!
//! With per-event severities `Fᵢ` (see [`SeverityModel`]) and occurrence
//! weights `λᵢ / λ`, the loss of a single occurrence has survival function
//!
//! ```text
//! CEP(t) = Σᵢ (λᵢ / λ) · (1 − Fᵢ(t / exposureᵢ))
//! ```
//!
//! and, occurrences being Poisson(λ), the probability that at least one
//! loss in a year exceeds `t` is `OEP(t) = 1 − exp(−λ · CEP(t))`.
//!
//! The annual aggregate is compound Poisson.  Its distribution is obtained
//! on the [`LossGrid`] from the discretized severity `f` as
//! `IFFT(exp(−λ(1 − FFT(f))))`; the grid must be wide enough for the
//! aggregate, since mass beyond it wraps around.  The aggregate is only
//! computed when the grid covers its mean plus
//! [`AGGREGATE_TAIL_STD_DEVS`] standard deviations.

use agg_core::{ensure, Loss, Probability, Real, Result};
use agg_curves::{EpCurve, EpType};
use agg_math::{fft, ifft};
use agg_tables::EventLossTable;
use num_complex::Complex64;
use tracing::{debug, warn};

use crate::frequency::FrequencyModel;
use crate::grid::LossGrid;
use crate::settings::AggregationSettings;
use crate::severity::SeverityModel;

/// Severity mass beyond the grid above which a warning is logged.
const RESIDUAL_MASS_TOLERANCE: Real = 1e-6;

/// Standard deviations above the mean annual aggregate that the loss grid
/// must reach before the FFT aggregate is computed.
pub const AGGREGATE_TAIL_STD_DEVS: Real = 4.0;

/// Frequency-severity model of an ELT discretized on a loss grid.
#[derive(Debug, Clone)]
pub struct AggregationEngine {
    severities: Vec<SeverityModel>,
    frequency: FrequencyModel,
    grid: LossGrid,
    settings: AggregationSettings,
    aggregate_mean: Loss,
    aggregate_std_dev: Real,
}

impl AggregationEngine {
    /// Fit every event of `elt` and lay out the grid.  Events with a zero
    /// rate carry no weight and are skipped.
    ///
    /// # Errors
    /// Returns an error if the settings are invalid, the total rate is not
    /// positive or every mean loss is zero.
    pub fn new(elt: &EventLossTable, settings: AggregationSettings) -> Result<Self> {
        settings.validate()?;
        let frequency = FrequencyModel::from_table(elt)?;
        let grid = LossGrid::for_table(elt, &settings)?;
        let severities = elt
            .iter()
            .filter(|r| r.rate() > 0.0)
            .map(SeverityModel::fit)
            .collect::<Result<Vec<_>>>()?;
        debug!(
            events = severities.len(),
            lambda = frequency.lambda(),
            grid_size = grid.size(),
            "aggregation engine"
        );
        Ok(Self {
            severities,
            frequency,
            grid,
            settings,
            aggregate_mean: elt.aal(),
            aggregate_std_dev: elt.standard_deviation(),
        })
    }

    /// Total occurrence rate λ.
    pub fn lambda(&self) -> Real {
        self.frequency.lambda()
    }

    /// The occurrence model.
    pub fn frequency(&self) -> &FrequencyModel {
        &self.frequency
    }

    /// The loss grid.
    pub fn grid(&self) -> &LossGrid {
        &self.grid
    }

    /// The settings the engine was built with.
    pub fn settings(&self) -> &AggregationSettings {
        &self.settings
    }

    /// Fitted severities of the occurring events.
    pub fn severities(&self) -> &[SeverityModel] {
        &self.severities
    }

    /// Mean annual aggregate loss plus [`AGGREGATE_TAIL_STD_DEVS`] standard
    /// deviations of the compound Poisson annual loss.
    pub fn aggregate_tail_loss(&self) -> Loss {
        self.aggregate_mean + AGGREGATE_TAIL_STD_DEVS * self.aggregate_std_dev
    }

    /// Whether the grid reaches [`AggregationEngine::aggregate_tail_loss`].
    pub fn grid_covers_aggregate(&self) -> bool {
        self.aggregate_tail_loss() <= self.grid.max_loss()
    }

    /// `CEP(kΔ)` for `k = 0..=N`.
    pub fn conditional_exceedance(&self) -> Vec<Probability> {
        let lambda = self.lambda();
        self.grid
            .thresholds()
            .map(|t| {
                self.severities
                    .iter()
                    .map(|s| s.rate() * s.loss_survival(t))
                    .sum::<Real>()
                    / lambda
            })
            .collect()
    }

    /// `(kΔ, CEP(kΔ))` for `k = 0..=N`.
    pub fn severity_distribution(&self) -> Vec<(Loss, Probability)> {
        self.grid
            .thresholds()
            .zip(self.conditional_exceedance())
            .collect()
    }

    /// `(kΔ, CEP((k−1)Δ) − CEP(kΔ))` for `k = 1..=N`: the probability that
    /// a single occurrence loss falls in `((k−1)Δ, kΔ]`.
    pub fn severity_density(&self) -> Vec<(Loss, Probability)> {
        let cep = self.conditional_exceedance();
        cep.windows(2)
            .enumerate()
            .map(|(i, w)| (self.grid.threshold(i + 1), w[0] - w[1]))
            .collect()
    }

    /// Occurrence EP curve through `(OEP(kΔ), kΔ)`, forced non-increasing
    /// in `k`.
    pub fn oep_curve(&self) -> Result<EpCurve> {
        let lambda = self.lambda();
        let mut running = 1.0_f64;
        let points: Vec<(Probability, Loss)> = self
            .severity_distribution()
            .into_iter()
            .map(|(t, cep)| {
                running = running.min(-(-lambda * cep).exp_m1());
                (running, t)
            })
            .collect();
        EpCurve::new(points, EpType::Oep)
    }

    /// Severity mix rounded to the nearest node: `f[0] = F(Δ/2)` and
    /// `f[k] = F((k+½)Δ) − F((k−½)Δ)` for `k = 1..N`, with
    /// `F = Σᵢ (λᵢ/λ) Fᵢ`.
    pub fn discretized_severity(&self) -> Vec<Probability> {
        let n = self.grid.size();
        let lambda = self.lambda();
        let mut f = vec![0.0; n];
        for severity in &self.severities {
            let weight = severity.rate() / lambda;
            let mut below = 0.0;
            for (k, mass) in f.iter_mut().enumerate() {
                let cdf = severity.loss_cdf(self.grid.bin_edge(k));
                *mass += weight * (cdf - below);
                below = cdf;
            }
        }

        let residual = 1.0 - f.iter().sum::<Real>();
        if residual > RESIDUAL_MASS_TOLERANCE {
            warn!(
                residual,
                max_loss = self.grid.max_loss(),
                "severity mass beyond the loss grid; increase max_loss_factor"
            );
        }
        f
    }

    /// Probability mass of the annual aggregate loss at each node `kΔ`,
    /// `k = 0..N`.
    ///
    /// # Errors
    /// Returns an error if the grid does not cover the aggregate tail (see
    /// [`AggregationEngine::grid_covers_aggregate`]); aggregate mass beyond
    /// the grid would otherwise wrap around onto small losses.
    pub fn aggregate_distribution(&self) -> Result<Vec<Probability>> {
        ensure!(
            self.grid_covers_aggregate(),
            "loss grid up to {} does not cover the annual aggregate tail {}; \
             increase max_loss_factor",
            self.grid.max_loss(),
            self.aggregate_tail_loss()
        );
        let lambda = self.lambda();
        let mut spectrum: Vec<Complex64> = self
            .discretized_severity()
            .into_iter()
            .map(|p| Complex64::new(p, 0.0))
            .collect();
        fft(&mut spectrum)?;
        let one = Complex64::new(1.0, 0.0);
        for z in spectrum.iter_mut() {
            *z = (-lambda * (one - *z)).exp();
        }
        ifft(&mut spectrum)?;
        Ok(spectrum.into_iter().map(|z| z.re).collect())
    }

    /// Aggregate EP curve.  `AEP[k] = 1 − Σ_{j ≤ k} fs[j]` is the
    /// probability that the rounded aggregate exceeds node `k`, reported at
    /// the bin edge `(k+½)Δ`.  Values are clamped to `[0, 1]` and forced
    /// non-increasing.
    pub fn aep_curve(&self) -> Result<EpCurve> {
        let fs = self.aggregate_distribution()?;
        let mut cumulative = 0.0;
        let mut running = 1.0_f64;
        let points: Vec<(Probability, Loss)> = fs
            .iter()
            .enumerate()
            .map(|(k, p)| {
                cumulative += p;
                running = running.min((1.0 - cumulative).clamp(0.0, 1.0));
                (running, self.grid.bin_edge(k))
            })
            .collect();
        EpCurve::new(points, EpType::Aep)
    }

    /// `P[N = n]` for `n = 0..=max_event_count`.
    pub fn frequency_distribution(&self) -> Result<Vec<Real>> {
        self.frequency.distribution()
    }
}

/// Occurrence EP curve of `elt`.
pub fn calculate_oep_curve(elt: &EventLossTable, settings: AggregationSettings) -> Result<EpCurve> {
    AggregationEngine::new(elt, settings)?.oep_curve()
}

/// Aggregate EP curve of `elt`.
pub fn calculate_aep_curve(elt: &EventLossTable, settings: AggregationSettings) -> Result<EpCurve> {
    AggregationEngine::new(elt, settings)?.aep_curve()
}

/// `(distribution, density)` of a single occurrence loss: the CEP at every
/// node and its first differences.
pub fn calculate_severity_distribution(
    elt: &EventLossTable,
    settings: AggregationSettings,
) -> Result<(Vec<(Loss, Probability)>, Vec<(Loss, Probability)>)> {
    let engine = AggregationEngine::new(elt, settings)?;
    Ok((engine.severity_distribution(), engine.severity_density()))
}

/// Poisson occurrence-count probabilities of `elt`.
pub fn calculate_frequency_distribution(elt: &EventLossTable) -> Result<Vec<Real>> {
    FrequencyModel::from_table(elt)?.distribution()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agg_tables::EventRecord;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn single_event() -> EventLossTable {
        EventLossTable::new(vec![EventRecord::new(
            1,
            0.01,
            1_500_000.0,
            500_000.0,
            300_000.0,
            5_500_000.0,
        )
        .unwrap()])
        .unwrap()
    }

    fn engine(grid_size: usize) -> AggregationEngine {
        AggregationEngine::new(
            &single_event(),
            AggregationSettings::default().with_grid_size(grid_size),
        )
        .unwrap()
    }

    #[test]
    fn cep_starts_at_one_and_vanishes_past_exposure() {
        let cep = engine(16).conditional_exceedance();
        assert_eq!(cep.len(), 17);
        assert_eq!(cep[0], 1.0);
        // grid reaches 7.5M, beyond the 5.5M exposure
        assert_eq!(*cep.last().unwrap(), 0.0);
        for w in cep.windows(2) {
            assert!(w[1] <= w[0] + 1e-15);
        }
    }

    #[test]
    fn density_sums_to_exceedance_drop() {
        let e = engine(64);
        let density = e.severity_density();
        assert_eq!(density.len(), 64);
        assert_eq!(density[0].0, e.grid().step());
        let total: Real = density.iter().map(|(_, p)| p).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_event_oep_matches_closed_form() {
        let e = engine(16);
        let oep = e.oep_curve().unwrap();
        let cep = e.conditional_exceedance();
        let p_max = -(-0.01_f64).exp_m1();
        assert!(oep.points().all(|(p, _)| p > 0.0 && p <= p_max));
        assert_eq!(oep.loss_at_probability(p_max).unwrap(), 0.0);

        let expected = -(-0.01 * cep[4]).exp_m1();
        assert_relative_eq!(
            oep.loss_at_probability(expected).unwrap(),
            e.grid().threshold(4),
            max_relative = 1e-9
        );
    }

    #[test]
    fn aggregate_distribution_is_a_distribution() {
        let fs = engine(256).aggregate_distribution().unwrap();
        assert_eq!(fs.len(), 256);
        assert_abs_diff_eq!(fs.iter().sum::<Real>(), 1.0, epsilon = 1e-9);
        // P[no occurrence] dominates node 0
        assert!(fs[0] >= (-0.01_f64).exp() - 1e-9);
        assert!(fs.iter().all(|&p| p > -1e-12));
    }

    fn frequent_small_events() -> EventLossTable {
        EventLossTable::new(
            (1..=50)
                .map(|id| EventRecord::new(id, 20.0, 149.0, 10.0, 10.0, 1000.0).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn aggregate_beyond_grid_is_rejected() {
        let e = AggregationEngine::new(
            &frequent_small_events(),
            AggregationSettings::default().with_grid_size(1024),
        )
        .unwrap();
        assert_eq!(e.grid().max_loss(), 745.0);
        assert!(!e.grid_covers_aggregate());
        assert!(e.aggregate_tail_loss() > 149_000.0);
        assert!(matches!(
            e.aggregate_distribution(),
            Err(agg_core::Error::Precondition(_))
        ));
        assert!(e.aep_curve().is_err());
        // the occurrence curve does not compound and stays available
        assert!(e.oep_curve().is_ok());
    }

    #[test]
    fn wider_grid_covers_frequent_events() {
        let settings = AggregationSettings::default()
            .with_grid_size(1024)
            .with_max_loss_factor(2000.0);
        let e = AggregationEngine::new(&frequent_small_events(), settings).unwrap();
        assert!(e.grid_covers_aggregate());
        let fs = e.aggregate_distribution().unwrap();
        assert_abs_diff_eq!(fs.iter().sum::<Real>(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn zero_rate_events_are_skipped() {
        let elt = EventLossTable::new(vec![
            EventRecord::new(1, 0.01, 1_500_000.0, 500_000.0, 300_000.0, 5_500_000.0).unwrap(),
            EventRecord::new(2, 0.0, 9_000_000.0, 0.0, 0.0, 9_000_000.0).unwrap(),
        ])
        .unwrap();
        let e = AggregationEngine::new(&elt, AggregationSettings::default().with_grid_size(16))
            .unwrap();
        assert_eq!(e.severities().len(), 1);
        assert_eq!(e.lambda(), 0.01);
        // the zero-rate event still sizes the grid
        assert_eq!(e.grid().max_loss(), 45_000_000.0);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = AggregationSettings::default().with_grid_size(12);
        assert!(AggregationEngine::new(&single_event(), settings).is_err());
    }
}
