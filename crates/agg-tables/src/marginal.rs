//! Marginal impact of a submission on a base portfolio, measured on the
//! grouped PLT.

use agg_core::{Loss, Real, Result};
use agg_curves::EpCurve;

use crate::plt::PeriodLossTable;

/// A base PLT, a submission PLT and their grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginalImpact {
    base: PeriodLossTable,
    submission: PeriodLossTable,
    grouped: PeriodLossTable,
}

impl MarginalImpact {
    /// Group `submission` into `base`.
    ///
    /// # Errors
    /// Returns [`agg_core::Error::InconsistentInput`] if the two tables
    /// simulate a different number of periods.
    pub fn new(base: PeriodLossTable, submission: PeriodLossTable) -> Result<Self> {
        let grouped = base.group(&submission)?;
        Ok(Self {
            base,
            submission,
            grouped,
        })
    }

    /// The base portfolio.
    pub fn base(&self) -> &PeriodLossTable {
        &self.base
    }

    /// The submission.
    pub fn submission(&self) -> &PeriodLossTable {
        &self.submission
    }

    /// Base and submission grouped together.
    pub fn grouped(&self) -> &PeriodLossTable {
        &self.grouped
    }

    /// AAL of the base portfolio.
    pub fn base_aal(&self) -> Loss {
        self.base.aal()
    }

    /// AAL of the submission on its own.
    pub fn submission_aal(&self) -> Loss {
        self.submission.aal()
    }

    /// AAL of the grouped portfolio.
    pub fn grouped_aal(&self) -> Loss {
        self.grouped.aal()
    }

    /// `|base − grouped| / base` of the AALs, `None` when the base AAL is 0.
    pub fn change_in_aal(&self) -> Option<Real> {
        relative_change(self.base_aal(), self.grouped_aal())
    }

    /// Empirical AEP of the base portfolio.
    pub fn base_aep(&self) -> Result<EpCurve> {
        self.base.aep_curve()
    }

    /// Empirical AEP of the submission.
    pub fn submission_aep(&self) -> Result<EpCurve> {
        self.submission.aep_curve()
    }

    /// Empirical AEP of the grouped portfolio.
    pub fn grouped_aep(&self) -> Result<EpCurve> {
        self.grouped.aep_curve()
    }

    /// `(return period, |base − grouped| / base)` of the AEP losses at each
    /// standard return period.  The ratio is `None` where the base loss is 0.
    pub fn marginal_aep(&self) -> Result<Vec<(Real, Option<Real>)>> {
        let base = self.base_aep()?.standard_return_period_losses()?;
        let grouped = self.grouped_aep()?.standard_return_period_losses()?;
        Ok(base
            .into_iter()
            .zip(grouped)
            .map(|((rp, b), (_, g))| (rp, relative_change(b, g)))
            .collect())
    }
}

fn relative_change(base: Real, other: Real) -> Option<Real> {
    (base != 0.0).then(|| (base - other).abs() / base)
}
