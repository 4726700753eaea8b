//! Exceedance-probability (EP) curve.
//!
//! An [`EpCurve`] stores unique exceedance probabilities in `(0, 1]` and the
//! loss at each of them.  Losses at probabilities that are not stored are
//! linearly interpolated in probability space.  Return-period queries
//! memoize the interpolated point into the curve, so repeated queries and
//! standard return-period tables are served from the stored map.
//!
//! The maximum input loss is anchored at the smallest positive normal `f64`:
//! queries below the smallest sampled probability saturate at that loss
//! instead of extrapolating.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::ops::Bound;

use agg_core::{ensure, fail, Error, Loss, Probability, Real, Result};
use serde::{Deserialize, Serialize};

/// Canonical return periods (years) of a standard EP table.
pub const RETURN_PERIODS: [Real; 13] = [
    2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 250.0, 500.0, 1000.0, 5000.0, 10000.0, 50000.0,
];

/// Kind of loss measured by an [`EpCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EpType {
    /// Occurrence exceedance probability: largest single event in a year.
    Oep,
    /// Aggregate exceedance probability: total loss in a year.
    Aep,
    /// Tail conditional expectation of an OEP curve.
    TceOep,
    /// Type not supplied.
    #[default]
    Unknown,
}

/// Map key ordering probabilities by `f64::total_cmp`.  Only finite,
/// positive probabilities are ever stored.
#[derive(Debug, Clone, Copy)]
struct ProbabilityKey(Probability);

impl PartialEq for ProbabilityKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ProbabilityKey {}

impl PartialOrd for ProbabilityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProbabilityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// A probability → loss exceedance curve.
#[derive(Debug, Clone, PartialEq)]
pub struct EpCurve {
    points: BTreeMap<ProbabilityKey, Loss>,
    ep_type: EpType,
}

impl EpCurve {
    /// Probability at which the maximum loss is anchored.
    pub const ANCHOR_PROBABILITY: Probability = f64::MIN_POSITIVE;

    /// Build a curve from `(probability, loss)` pairs.
    ///
    /// Pairs with a non-positive probability are dropped (they still count
    /// towards the anchored maximum loss).  When a probability repeats, the
    /// first pair wins.
    ///
    /// # Errors
    /// Returns an error if no pairs are supplied, if any value is not
    /// finite, or if a probability exceeds 1.
    pub fn new(
        points: impl IntoIterator<Item = (Probability, Loss)>,
        ep_type: EpType,
    ) -> Result<Self> {
        let mut map = BTreeMap::new();
        let mut max_loss: Option<Loss> = None;
        for (probability, loss) in points {
            ensure!(
                probability.is_finite() && loss.is_finite(),
                "ep curve points must be finite, got ({probability}, {loss})"
            );
            ensure!(
                probability <= 1.0,
                "exceedance probability {probability} exceeds 1"
            );
            max_loss = Some(max_loss.map_or(loss, |m: Loss| m.max(loss)));
            if probability > 0.0 {
                map.entry(ProbabilityKey(probability)).or_insert(loss);
            }
        }
        let Some(max_loss) = max_loss else {
            return Err(Error::Precondition(
                "ep curve requires at least one point".into(),
            ));
        };
        map.entry(ProbabilityKey(Self::ANCHOR_PROBABILITY))
            .or_insert(max_loss);
        Ok(Self {
            points: map,
            ep_type,
        })
    }

    /// The curve type tag.
    pub fn ep_type(&self) -> EpType {
        self.ep_type
    }

    /// Number of stored points, including the anchor.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`: a curve holds at least its anchor point.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest stored loss.
    pub fn max_loss(&self) -> Loss {
        self.points.values().copied().fold(Real::NEG_INFINITY, Real::max)
    }

    /// Whether `probability` is stored exactly.
    pub fn contains_probability(&self, probability: Probability) -> bool {
        self.points.contains_key(&ProbabilityKey(probability))
    }

    /// Stored `(probability, loss)` pairs in ascending probability order.
    pub fn points(&self) -> impl Iterator<Item = (Probability, Loss)> + '_ {
        self.points.iter().map(|(k, &loss)| (k.0, loss))
    }

    /// Loss at `probability` without memoizing.
    ///
    /// Probabilities above the largest stored key return the loss at that
    /// key; probabilities below the anchor return the anchored maximum.
    ///
    /// # Errors
    /// Returns an error unless `probability` is finite and positive.
    pub fn loss_at_probability(&self, probability: Probability) -> Result<Loss> {
        ensure!(
            probability.is_finite() && probability > 0.0,
            "probability must be finite and positive, got {probability}"
        );
        self.interpolate(probability)
    }

    /// Loss at return period `return_period` (years), memoizing the
    /// interpolated point when `1 / return_period` is not already stored.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] if `return_period` is not positive.
    pub fn loss_at_return_period(&mut self, return_period: Real) -> Result<Loss> {
        if return_period.is_nan() || return_period <= 0.0 {
            return Err(Error::InvalidArgument(format!(
                "return_period: {return_period} supplied is not positive"
            )));
        }
        let probability = 1.0 / return_period;
        self.insert_probability(probability)
    }

    /// Extend the curve with the probabilities of [`RETURN_PERIODS`] and
    /// return every stored `(probability, loss)` pair in ascending
    /// probability order.
    pub fn standard_return_period_table(&mut self) -> Result<Vec<(Probability, Loss)>> {
        for return_period in RETURN_PERIODS {
            self.insert_probability(1.0 / return_period)?;
        }
        Ok(self.points().collect())
    }

    /// `(return period, loss)` for each of [`RETURN_PERIODS`], without
    /// modifying the curve.
    pub fn standard_return_period_losses(&self) -> Result<Vec<(Real, Loss)>> {
        RETURN_PERIODS
            .iter()
            .map(|&rp| Ok((rp, self.interpolate(1.0 / rp)?)))
            .collect()
    }

    fn insert_probability(&mut self, probability: Probability) -> Result<Loss> {
        let key = ProbabilityKey(probability);
        if let Some(&loss) = self.points.get(&key) {
            return Ok(loss);
        }
        let loss = self.interpolate(probability)?;
        self.points.insert(key, loss);
        Ok(loss)
    }

    fn interpolate(&self, probability: Probability) -> Result<Loss> {
        let key = ProbabilityKey(probability);
        if let Some(&loss) = self.points.get(&key) {
            return Ok(loss);
        }
        let below = self.points.range(..key).next_back();
        let above = self
            .points
            .range((Bound::Excluded(key), Bound::Unbounded))
            .next();
        match (below, above) {
            (Some((p0, &l0)), Some((p1, &l1))) => {
                Ok(l0 + (probability - p0.0) * (l1 - l0) / (p1.0 - p0.0))
            }
            (Some((_, &l0)), None) => Ok(l0),
            (None, Some((_, &l1))) => Ok(l1),
            (None, None) => fail!("ep curve has no points"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn small_curve() -> EpCurve {
        EpCurve::new(
            vec![(0.1, 1000.0), (0.01, 5000.0), (0.5, 100.0)],
            EpType::Aep,
        )
        .unwrap()
    }

    #[test]
    fn anchor_carries_max_loss() {
        let curve = small_curve();
        assert_eq!(curve.len(), 4);
        let (p, loss) = curve.points().next().unwrap();
        assert_eq!(p, EpCurve::ANCHOR_PROBABILITY);
        assert_eq!(loss, 5000.0);
        assert_eq!(curve.max_loss(), 5000.0);
    }

    #[test]
    fn duplicate_probability_keeps_first() {
        let curve = EpCurve::new(vec![(0.2, 10.0), (0.2, 20.0)], EpType::Oep).unwrap();
        assert_eq!(curve.loss_at_probability(0.2).unwrap(), 10.0);
        // the anchor still sees the larger loss
        assert_eq!(curve.max_loss(), 20.0);
    }

    #[test]
    fn zero_probabilities_are_dropped() {
        let curve = EpCurve::new(
            vec![(0.3, 0.0), (0.1, 10.0), (0.0, 20.0), (0.0, 30.0)],
            EpType::Oep,
        )
        .unwrap();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.max_loss(), 30.0);
        // below 0.1 the curve runs to the anchored maximum
        assert_abs_diff_eq!(curve.loss_at_probability(0.05).unwrap(), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn interpolates_linearly_in_probability() {
        let curve = small_curve();
        // halfway between 0.1 (1000) and 0.5 (100)
        assert_abs_diff_eq!(curve.loss_at_probability(0.3).unwrap(), 550.0, epsilon = 1e-9);
    }

    #[test]
    fn above_largest_probability_is_flat() {
        let curve = small_curve();
        assert_eq!(curve.loss_at_probability(0.9).unwrap(), 100.0);
        assert_eq!(curve.loss_at_probability(3.0).unwrap(), 100.0);
    }

    #[test]
    fn return_period_query_memoizes() {
        let mut curve = small_curve();
        assert!(!curve.contains_probability(0.25));
        let loss = curve.loss_at_return_period(4.0).unwrap();
        assert!(curve.contains_probability(0.25));
        assert_eq!(curve.len(), 5);
        assert_abs_diff_eq!(loss, 662.5, epsilon = 1e-9);
    }

    #[test]
    fn non_positive_return_period_is_invalid() {
        let mut curve = small_curve();
        assert!(matches!(
            curve.loss_at_return_period(0.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            curve.loss_at_return_period(-10.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            curve.loss_at_return_period(Real::NAN),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejects_bad_points() {
        assert!(EpCurve::new(Vec::new(), EpType::Oep).is_err());
        assert!(EpCurve::new(vec![(1.5, 10.0)], EpType::Oep).is_err());
        assert!(EpCurve::new(vec![(0.5, Real::NAN)], EpType::Oep).is_err());
    }

    #[test]
    fn default_type_is_unknown() {
        assert_eq!(EpType::default(), EpType::Unknown);
    }
}
