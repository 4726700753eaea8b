//! Beta distribution and its method-of-moments fit.

use agg_core::{ensure, Error, Real, Result};
use statrs::distribution::{Beta, Continuous, ContinuousCDF};
use statrs::statistics::Distribution;
use tracing::debug;

/// Value substituted for a non-positive shape parameter produced by the
/// moment-matching formulas.
pub const BETA_SHAPE_FLOOR: Real = 1e-6;

/// Beta distribution with shape parameters `α` and `β` on `[0, 1]`.
#[derive(Debug, Clone)]
pub struct BetaDistribution {
    inner: Beta,
    alpha: Real,
    beta: Real,
}

impl BetaDistribution {
    /// Create a Beta(α, β) distribution.
    ///
    /// # Errors
    /// Returns an error unless both shapes are finite and strictly positive.
    pub fn new(alpha: Real, beta: Real) -> Result<Self> {
        ensure!(
            alpha.is_finite() && alpha > 0.0,
            "beta shape alpha must be finite and positive, got {alpha}"
        );
        ensure!(
            beta.is_finite() && beta > 0.0,
            "beta shape beta must be finite and positive, got {beta}"
        );
        let inner = Beta::new(alpha, beta).map_err(|_| {
            Error::Precondition(format!("invalid beta parameters α={alpha}, β={beta}"))
        })?;
        Ok(Self { inner, alpha, beta })
    }

    /// Fit a Beta distribution to a mean `mu` in `(0, 1)` and standard
    /// deviation `sigma > 0` by matching the first two moments:
    ///
    /// ```text
    /// α = μ²(1 − μ)/σ² − μ
    /// β = α(1 − μ)/μ
    /// ```
    ///
    /// A non-positive α or β (variance at or above the Bernoulli bound
    /// `μ(1 − μ)`) is replaced by [`BETA_SHAPE_FLOOR`].  With α floored the
    /// fitted mean is still exactly `μ`.
    pub fn from_moments(mu: Real, sigma: Real) -> Result<Self> {
        ensure!(
            mu > 0.0 && mu < 1.0,
            "beta mean must lie in (0, 1), got {mu}"
        );
        ensure!(
            sigma.is_finite() && sigma > 0.0,
            "beta standard deviation must be positive, got {sigma}"
        );

        let mut alpha = mu * mu * (1.0 - mu) / (sigma * sigma) - mu;
        if alpha <= 0.0 {
            debug!(mu, sigma, alpha, "beta alpha floored");
            alpha = BETA_SHAPE_FLOOR;
        }
        let mut beta = alpha * (1.0 - mu) / mu;
        if beta <= 0.0 {
            debug!(mu, sigma, beta, "beta beta floored");
            beta = BETA_SHAPE_FLOOR;
        }
        Self::new(alpha, beta)
    }

    /// Shape parameter α.
    pub fn alpha(&self) -> Real {
        self.alpha
    }

    /// Shape parameter β.
    pub fn beta(&self) -> Real {
        self.beta
    }

    /// Mean `α / (α + β)`.
    pub fn mean(&self) -> Option<Real> {
        self.inner.mean()
    }

    /// Variance `αβ / ((α + β)²(α + β + 1))`.
    pub fn variance(&self) -> Option<Real> {
        self.inner.variance()
    }

    /// Probability density function.
    pub fn pdf(&self, x: Real) -> Real {
        self.inner.pdf(x)
    }

    /// Cumulative distribution function (regularized incomplete beta
    /// function).  Saturates at 0 below the support and 1 above it.
    pub fn cdf(&self, x: Real) -> Real {
        if x <= 0.0 {
            0.0
        } else if x >= 1.0 {
            1.0
        } else {
            self.inner.cdf(x)
        }
    }

    /// Survival function `P[X > x]`.
    pub fn sf(&self, x: Real) -> Real {
        if x <= 0.0 {
            1.0
        } else if x >= 1.0 {
            0.0
        } else {
            self.inner.sf(x)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn beta_pdf_uniform() {
        // Beta(1,1) is the uniform distribution
        let d = BetaDistribution::new(1.0, 1.0).unwrap();
        assert_abs_diff_eq!(d.pdf(0.5), 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(d.cdf(0.5), 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(d.sf(0.25), 0.75, epsilon = 1e-10);
    }

    #[test]
    fn beta_cdf_saturates_outside_support() {
        let d = BetaDistribution::new(2.0, 5.0).unwrap();
        assert_eq!(d.cdf(-0.5), 0.0);
        assert_eq!(d.cdf(0.0), 0.0);
        assert_eq!(d.cdf(1.0), 1.0);
        assert_eq!(d.cdf(3.0), 1.0);
        assert_eq!(d.sf(3.0), 0.0);
    }

    #[test]
    fn moments_fit_recovers_mean_and_variance() {
        let mu = 1_500_000.0 / 5_500_000.0;
        let sigma = 800_000.0 / 5_500_000.0;
        let d = BetaDistribution::from_moments(mu, sigma).unwrap();
        assert!(d.alpha() > 0.0 && d.beta() > 0.0);
        assert_abs_diff_eq!(d.mean().unwrap(), mu, epsilon = 1e-12);
        assert_abs_diff_eq!(d.variance().unwrap(), sigma * sigma, epsilon = 1e-12);
    }

    #[test]
    fn moments_fit_floors_alpha_at_bernoulli_bound() {
        // σ² ≥ μ(1−μ) makes the moment formula non-positive
        let d = BetaDistribution::from_moments(0.5, 0.6).unwrap();
        assert_eq!(d.alpha(), BETA_SHAPE_FLOOR);
        assert_abs_diff_eq!(d.beta(), BETA_SHAPE_FLOOR, epsilon = 1e-18);
        assert_abs_diff_eq!(d.mean().unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn moments_fit_rejects_out_of_range_mean() {
        assert!(BetaDistribution::from_moments(0.0, 0.1).is_err());
        assert!(BetaDistribution::from_moments(1.2, 0.1).is_err());
        assert!(BetaDistribution::from_moments(0.3, 0.0).is_err());
    }

    #[test]
    fn new_rejects_non_positive_shapes() {
        assert!(BetaDistribution::new(0.0, 1.0).is_err());
        assert!(BetaDistribution::new(1.0, -2.0).is_err());
        assert!(BetaDistribution::new(Real::NAN, 1.0).is_err());
    }
}
