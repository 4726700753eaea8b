//! Per-event severity: the loss given occurrence as a fraction of exposure.

use agg_core::{EventId, Loss, Probability, Real, Result};
use agg_math::BetaDistribution;
use agg_tables::EventRecord;
use tracing::debug;

/// Distribution of the normalized loss `loss / exposure`.
#[derive(Debug, Clone)]
pub enum SeverityDistribution {
    /// Moment-matched Beta distribution on `[0, 1]`.
    Beta(BetaDistribution),
    /// All mass at one normalized loss.  Used when the mean lies outside
    /// `(0, 1)` or the standard deviation is zero.
    PointMass(Real),
}

impl SeverityDistribution {
    /// `P[X ≤ x]`.
    pub fn cdf(&self, x: Real) -> Probability {
        match self {
            Self::Beta(beta) => beta.cdf(x),
            Self::PointMass(at) => {
                if x >= *at {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// `P[X > x]`.
    pub fn survival(&self, x: Real) -> Probability {
        match self {
            Self::Beta(beta) => beta.sf(x),
            Self::PointMass(_) => 1.0 - self.cdf(x),
        }
    }

    /// Mean normalized loss.
    pub fn mean(&self) -> Option<Real> {
        match self {
            Self::Beta(beta) => beta.mean(),
            Self::PointMass(at) => Some(*at),
        }
    }
}

/// Severity of one event together with its weight in the occurrence mix.
#[derive(Debug, Clone)]
pub struct SeverityModel {
    event_id: EventId,
    rate: Real,
    exposure: Real,
    distribution: SeverityDistribution,
}

impl SeverityModel {
    /// Fit the severity of `record` from its normalized mean and standard
    /// deviation.
    pub fn fit(record: &EventRecord) -> Result<Self> {
        let mu = record.normalized_mean();
        let sigma = record.normalized_std_dev();
        let distribution = if mu > 0.0 && mu < 1.0 && sigma > 0.0 {
            SeverityDistribution::Beta(BetaDistribution::from_moments(mu, sigma)?)
        } else {
            debug!(
                event_id = record.event_id(),
                mu,
                sigma,
                "degenerate severity, using a point mass"
            );
            SeverityDistribution::PointMass(mu)
        };
        Ok(Self {
            event_id: record.event_id(),
            rate: record.rate(),
            exposure: record.exposure(),
            distribution,
        })
    }

    /// Event identifier.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Occurrence rate of the event.
    pub fn rate(&self) -> Real {
        self.rate
    }

    /// Exposed value the distribution is scaled by.
    pub fn exposure(&self) -> Real {
        self.exposure
    }

    /// The fitted distribution.
    pub fn distribution(&self) -> &SeverityDistribution {
        &self.distribution
    }

    /// `(α, β)` of a Beta fit, `None` for a point mass.
    pub fn parameters(&self) -> Option<(Real, Real)> {
        match &self.distribution {
            SeverityDistribution::Beta(beta) => Some((beta.alpha(), beta.beta())),
            SeverityDistribution::PointMass(_) => None,
        }
    }

    /// `P[X ≤ x]` for the normalized loss `x`.
    pub fn cdf(&self, x: Real) -> Probability {
        self.distribution.cdf(x)
    }

    /// `P[X > x]` for the normalized loss `x`.
    pub fn survival(&self, x: Real) -> Probability {
        self.distribution.survival(x)
    }

    /// `P[loss ≤ loss]` in monetary terms.
    pub fn loss_cdf(&self, loss: Loss) -> Probability {
        self.cdf(loss / self.exposure)
    }

    /// `P[loss > loss]` in monetary terms.
    pub fn loss_survival(&self, loss: Loss) -> Probability {
        self.survival(loss / self.exposure)
    }
}
