//! Period Loss Table (PLT).
//!
//! A PLT records the realized loss of every event occurrence in each
//! simulated period (year).  Periods are numbered from 1 up to the number of
//! simulations; a period with no rows is a loss-free year and still counts
//! in every statistic.

use std::collections::HashMap;

use agg_core::{ensure, Error, EventId, Loss, PeriodId, Real, Result};
use agg_curves::{EpCurve, EpType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field names a PLT row must carry.
pub const REQUIRED_FIELDS: [&str; 3] = ["PeriodId", "EventId", "Loss"];

/// Largest number of simulated periods a table may declare.  Annual
/// statistics hold one value per simulated period.
pub const MAX_SIMULATIONS: PeriodId = 10_000_000;

/// One event occurrence in one simulated period.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodLoss {
    period_id: PeriodId,
    event_id: EventId,
    loss: Loss,
}

impl PeriodLoss {
    /// Create a row.
    ///
    /// # Errors
    /// Returns an error if `period_id` is 0 or `loss` is negative or not
    /// finite.
    pub fn new(period_id: PeriodId, event_id: EventId, loss: Loss) -> Result<Self> {
        ensure!(period_id >= 1, "period ids start at 1, got {period_id}");
        ensure!(
            loss.is_finite() && loss >= 0.0,
            "period {period_id} event {event_id}: loss must be finite and non-negative, got {loss}"
        );
        Ok(Self {
            period_id,
            event_id,
            loss,
        })
    }

    /// Simulated period.
    pub fn period_id(&self) -> PeriodId {
        self.period_id
    }

    /// Event identifier.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Realized loss.
    pub fn loss(&self) -> Loss {
        self.loss
    }
}

/// A loosely typed PLT row.  Dates, perils and other columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawPeriodLoss {
    /// `PeriodId`
    pub period_id: Option<PeriodId>,
    /// `EventId`
    pub event_id: Option<EventId>,
    /// `Loss`
    pub loss: Option<Loss>,
}

/// A Period Loss Table over a fixed number of simulated periods.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodLossTable {
    records: Vec<PeriodLoss>,
    simulations: PeriodId,
}

impl PeriodLossTable {
    /// Build a table.  When `simulations` is `None` the largest period id is
    /// taken as the number of simulated periods.
    ///
    /// # Errors
    /// Returns an error if there are no simulated periods, more than
    /// [`MAX_SIMULATIONS`] of them, or a row refers to a period beyond
    /// `simulations`.
    pub fn new(records: Vec<PeriodLoss>, simulations: Option<PeriodId>) -> Result<Self> {
        let max_period = records.iter().map(PeriodLoss::period_id).max().unwrap_or(0);
        let simulations = simulations.unwrap_or(max_period);
        ensure!(simulations >= 1, "a period loss table needs at least one simulated period");
        ensure!(
            simulations <= MAX_SIMULATIONS,
            "{simulations} simulated periods exceed the limit of {MAX_SIMULATIONS}"
        );
        ensure!(
            max_period <= simulations,
            "period {max_period} lies beyond {simulations} simulated periods"
        );
        Ok(Self {
            records,
            simulations,
        })
    }

    /// Build a table from raw rows.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] naming every required field missing from
    /// any row, or the validation errors of [`PeriodLossTable::new`].
    pub fn from_raw(rows: Vec<RawPeriodLoss>, simulations: Option<PeriodId>) -> Result<Self> {
        let present = |row: &RawPeriodLoss| {
            [
                row.period_id.is_some(),
                row.event_id.is_some(),
                row.loss.is_some(),
            ]
        };
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .enumerate()
            .filter(|(i, _)| rows.iter().any(|row| !present(row)[*i]))
            .map(|(_, name)| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            if let (Some(period_id), Some(event_id), Some(loss)) =
                (row.period_id, row.event_id, row.loss)
            {
                records.push(PeriodLoss::new(period_id, event_id, loss)?);
            }
        }
        Self::new(records, simulations)
    }

    /// Rows in insertion order.
    pub fn records(&self) -> &[PeriodLoss] {
        &self.records
    }

    /// Number of simulated periods.
    pub fn simulations(&self) -> PeriodId {
        self.simulations
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows (every period is loss-free).
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total loss per period, index `k` holding period `k + 1`.
    pub fn annual_losses(&self) -> Vec<Loss> {
        let mut totals = vec![0.0; self.simulations as usize];
        for r in &self.records {
            totals[(r.period_id - 1) as usize] += r.loss;
        }
        totals
    }

    /// Largest single loss per period, index `k` holding period `k + 1`.
    pub fn annual_max_losses(&self) -> Vec<Loss> {
        let mut maxima = vec![0.0_f64; self.simulations as usize];
        for r in &self.records {
            let slot = &mut maxima[(r.period_id - 1) as usize];
            *slot = slot.max(r.loss);
        }
        maxima
    }

    /// Average annual loss: total loss over the number of simulations.
    pub fn aal(&self) -> Loss {
        self.records.iter().map(PeriodLoss::loss).sum::<Real>() / Real::from(self.simulations)
    }

    /// Sample standard deviation of the annual totals, loss-free periods
    /// included.  Zero for a single simulated period.
    pub fn standard_deviation(&self) -> Real {
        let annual = self.annual_losses();
        let n = annual.len();
        if n < 2 {
            return 0.0;
        }
        let mean = annual.iter().sum::<Real>() / n as Real;
        let ss: Real = annual.iter().map(|x| (x - mean) * (x - mean)).sum();
        (ss / (n - 1) as Real).sqrt()
    }

    /// Empirical occurrence EP curve from the ranked annual maxima.
    pub fn oep_curve(&self) -> Result<EpCurve> {
        ranked_curve(self.annual_max_losses(), EpType::Oep)
    }

    /// Empirical aggregate EP curve from the ranked annual totals.
    pub fn aep_curve(&self) -> Result<EpCurve> {
        ranked_curve(self.annual_losses(), EpType::Aep)
    }

    /// Combine with `other`, summing losses of rows that share a period and
    /// an event.  Rows keep the order in which their key was first seen.
    ///
    /// # Errors
    /// Returns [`Error::InconsistentInput`] if the tables simulate a
    /// different number of periods.
    pub fn group(&self, other: &PeriodLossTable) -> Result<Self> {
        if self.simulations != other.simulations {
            return Err(Error::InconsistentInput(format!(
                "cannot group period loss tables with {} and {} simulations",
                self.simulations, other.simulations
            )));
        }
        let mut grouped: Vec<PeriodLoss> = Vec::with_capacity(self.len() + other.len());
        let mut slots: HashMap<(PeriodId, EventId), usize> = HashMap::new();
        for r in self.records.iter().chain(other.records.iter()) {
            match slots.get(&(r.period_id, r.event_id)) {
                Some(&slot) => grouped[slot].loss += r.loss,
                None => {
                    slots.insert((r.period_id, r.event_id), grouped.len());
                    grouped.push(*r);
                }
            }
        }
        debug!(
            rows = grouped.len(),
            simulations = self.simulations,
            "grouped period loss tables"
        );
        Self::new(grouped, Some(self.simulations))
    }
}

/// Rank `values` ascending and give row `i` of `n` the exceedance
/// probability `(n − i) / n`.
fn ranked_curve(mut values: Vec<Loss>, ep_type: EpType) -> Result<EpCurve> {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len() as Real;
    EpCurve::new(
        values
            .into_iter()
            .enumerate()
            .map(|(i, loss)| ((n - i as Real) / n, loss)),
        ep_type,
    )
}
