//! Poisson distribution.
//!
//! Wraps the `statrs` crate's Poisson implementation, whose mass function is
//! evaluated in log space so that large means and counts neither overflow a
//! factorial nor underflow `e^{-λ}` prematurely.

use agg_core::{ensure, Error, Real, Result};
use statrs::distribution::{Discrete, DiscreteCDF, Poisson};
use statrs::statistics::Distribution;

/// Poisson distribution with mean `lambda`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonDistribution {
    dist: Poisson,
    lambda: Real,
}

impl PoissonDistribution {
    /// Create a Poisson distribution with the given mean `lambda`.
    ///
    /// # Errors
    /// Returns an error unless `lambda` is finite and strictly positive.
    pub fn new(lambda: Real) -> Result<Self> {
        ensure!(
            lambda.is_finite() && lambda > 0.0,
            "poisson mean must be finite and positive, got {lambda}"
        );
        let dist = Poisson::new(lambda)
            .map_err(|_| Error::Precondition(format!("invalid poisson mean {lambda}")))?;
        Ok(Self { dist, lambda })
    }

    /// Mean parameter λ.
    pub fn lambda(&self) -> Real {
        self.lambda
    }

    /// Natural log of the probability mass `ln P(X = k)`.
    pub fn ln_pmf(&self, k: u64) -> Real {
        self.dist.ln_pmf(k)
    }

    /// Probability mass function P(X = k).
    pub fn pmf(&self, k: u64) -> Real {
        self.dist.pmf(k)
    }

    /// Cumulative distribution function P(X ≤ k).
    pub fn cdf(&self, k: u64) -> Real {
        self.dist.cdf(k)
    }

    /// Smallest `n` such that `P(X ≤ n) > p`.
    ///
    /// `statrs` returns the smallest `n` with `P(X ≤ n) ≥ p`; a count whose
    /// cdf equals `p` exactly is stepped past.
    ///
    /// # Errors
    /// Returns an error unless `0 ≤ p < 1`.
    pub fn inverse_cdf(&self, p: Real) -> Result<u64> {
        ensure!(
            (0.0..1.0).contains(&p),
            "poisson quantile level must lie in [0, 1), got {p}"
        );
        let mut n = self.dist.inverse_cdf(p);
        while self.cdf(n) <= p {
            n += 1;
        }
        while n > 0 && self.cdf(n - 1) > p {
            n -= 1;
        }
        Ok(n)
    }

    /// Mean of the distribution (= λ).
    pub fn mean(&self) -> Real {
        self.dist.mean().unwrap_or(self.lambda)
    }

    /// Variance of the distribution (= λ).
    pub fn variance(&self) -> Real {
        self.dist.variance().unwrap_or(self.lambda)
    }
}
