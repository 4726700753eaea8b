//! Event Loss Table (ELT).
//!
//! An ELT lists, per catalogue event, the annual occurrence rate and the
//! loss distribution given occurrence: a mean loss, an independent and a
//! correlated standard deviation component, and the exposed value that
//! bounds the loss.  Tables are unique by event id; duplicated ids are
//! merged with [`group_records`].

use std::collections::HashMap;

use agg_core::{ensure, Error, EventId, Loss, Real, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Field names an ELT row must carry.
pub const REQUIRED_FIELDS: [&str; 6] = ["EventId", "Rate", "Loss", "StdDevI", "StdDevC", "ExpValue"];

/// Loss statistics of one catalogue event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    event_id: EventId,
    rate: Real,
    loss: Loss,
    std_dev_i: Real,
    std_dev_c: Real,
    exposure: Real,
    total_std_dev: Option<Real>,
}

impl EventRecord {
    /// Create a record.
    ///
    /// # Errors
    /// Returns an error if `rate`, `loss` or either standard deviation is
    /// negative or not finite, or if `exposure` is not strictly positive.
    pub fn new(
        event_id: EventId,
        rate: Real,
        loss: Loss,
        std_dev_i: Real,
        std_dev_c: Real,
        exposure: Real,
    ) -> Result<Self> {
        ensure!(
            rate.is_finite() && rate >= 0.0,
            "event {event_id}: rate must be finite and non-negative, got {rate}"
        );
        ensure!(
            loss.is_finite() && loss >= 0.0,
            "event {event_id}: loss must be finite and non-negative, got {loss}"
        );
        ensure!(
            std_dev_i.is_finite() && std_dev_i >= 0.0,
            "event {event_id}: independent std dev must be non-negative, got {std_dev_i}"
        );
        ensure!(
            std_dev_c.is_finite() && std_dev_c >= 0.0,
            "event {event_id}: correlated std dev must be non-negative, got {std_dev_c}"
        );
        ensure!(
            exposure.is_finite() && exposure > 0.0,
            "event {event_id}: exposure must be finite and positive, got {exposure}"
        );
        Ok(Self {
            event_id,
            rate,
            loss,
            std_dev_i,
            std_dev_c,
            exposure,
            total_std_dev: None,
        })
    }

    /// Replace the additive `std_dev_i + std_dev_c` with a pre-combined total.
    pub fn with_total_std_dev(mut self, std_dev: Real) -> Result<Self> {
        ensure!(
            std_dev.is_finite() && std_dev >= 0.0,
            "event {}: total std dev must be non-negative, got {std_dev}",
            self.event_id
        );
        self.total_std_dev = Some(std_dev);
        Ok(self)
    }

    /// Event identifier.
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Expected occurrences per year.
    pub fn rate(&self) -> Real {
        self.rate
    }

    /// Mean loss given occurrence.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Independent standard deviation component.
    pub fn std_dev_i(&self) -> Real {
        self.std_dev_i
    }

    /// Correlated standard deviation component.
    pub fn std_dev_c(&self) -> Real {
        self.std_dev_c
    }

    /// Exposed value bounding the loss.
    pub fn exposure(&self) -> Real {
        self.exposure
    }

    /// Total standard deviation: the supplied total, otherwise
    /// `std_dev_i + std_dev_c`.
    pub fn std_dev(&self) -> Real {
        self.total_std_dev
            .unwrap_or(self.std_dev_i + self.std_dev_c)
    }

    /// Loss as a fraction of exposure.
    pub fn normalized_mean(&self) -> Real {
        self.loss / self.exposure
    }

    /// Standard deviation as a fraction of exposure.
    pub fn normalized_std_dev(&self) -> Real {
        self.std_dev() / self.exposure
    }

    /// Coefficient of variation `std_dev / loss`; `None` for a zero loss.
    pub fn coefficient_of_variation(&self) -> Option<Real> {
        (self.loss > 0.0).then(|| self.std_dev() / self.loss)
    }
}

/// A loosely typed ELT row as found in CSV/JSON extracts.  Extra columns
/// (account, location, line of business, ...) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawEventRecord {
    /// `EventId`
    pub event_id: Option<EventId>,
    /// `Rate`
    pub rate: Option<Real>,
    /// `Loss`
    pub loss: Option<Loss>,
    /// `StdDevI`
    pub std_dev_i: Option<Real>,
    /// `StdDevC`
    pub std_dev_c: Option<Real>,
    /// `ExpValue`
    pub exp_value: Option<Real>,
    /// `StdDev` (optional pre-combined total)
    pub std_dev: Option<Real>,
}

impl RawEventRecord {
    fn missing_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        let present = [
            self.event_id.is_some(),
            self.rate.is_some(),
            self.loss.is_some(),
            self.std_dev_i.is_some(),
            self.std_dev_c.is_some(),
            self.exp_value.is_some(),
        ];
        REQUIRED_FIELDS
            .iter()
            .zip(present)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
    }

    fn into_record(self) -> Result<EventRecord> {
        match self {
            RawEventRecord {
                event_id: Some(event_id),
                rate: Some(rate),
                loss: Some(loss),
                std_dev_i: Some(std_dev_i),
                std_dev_c: Some(std_dev_c),
                exp_value: Some(exposure),
                std_dev,
            } => {
                let record =
                    EventRecord::new(event_id, rate, loss, std_dev_i, std_dev_c, exposure)?;
                match std_dev {
                    Some(total) => record.with_total_std_dev(total),
                    None => Ok(record),
                }
            }
            raw => Err(Error::Schema {
                missing: raw.missing_fields().map(String::from).collect(),
            }),
        }
    }
}

/// Check that every row carries the required fields, naming all fields
/// missing from any row.
fn check_schema(rows: &[RawEventRecord]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|name| {
            rows.iter()
                .any(|row| row.missing_fields().any(|m| m == **name))
        })
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Schema { missing })
    }
}

/// An Event Loss Table, unique by event id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLossTable {
    records: Vec<EventRecord>,
    index: HashMap<EventId, usize>,
}

impl EventLossTable {
    /// Build a table from records.
    ///
    /// # Errors
    /// Returns [`Error::DuplicateEvent`] if an event id occurs twice.
    pub fn new(records: Vec<EventRecord>) -> Result<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.event_id, i).is_some() {
                return Err(Error::DuplicateEvent(record.event_id));
            }
        }
        Ok(Self { records, index })
    }

    /// Build a table from raw rows.
    ///
    /// # Errors
    /// Returns [`Error::Schema`] naming every required field missing from
    /// any row, or the validation errors of [`EventRecord::new`] and
    /// [`EventLossTable::new`].
    pub fn from_raw(rows: Vec<RawEventRecord>) -> Result<Self> {
        check_schema(&rows)?;
        let records = rows
            .into_iter()
            .map(RawEventRecord::into_record)
            .collect::<Result<Vec<_>>>()?;
        Self::new(records)
    }

    /// Build a table from raw rows that may repeat event ids, merging the
    /// repeats with [`group_records`].
    pub fn group_raw(rows: Vec<RawEventRecord>) -> Result<Self> {
        check_schema(&rows)?;
        let records = rows
            .into_iter()
            .map(RawEventRecord::into_record)
            .collect::<Result<Vec<_>>>()?;
        group_records(records)
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Iterate over records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, EventRecord> {
        self.records.iter()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no events.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up an event by id.
    pub fn get(&self, event_id: EventId) -> Option<&EventRecord> {
        self.index.get(&event_id).map(|&i| &self.records[i])
    }

    /// Total occurrence rate λ = Σ λᵢ.
    pub fn total_rate(&self) -> Real {
        self.records.iter().map(EventRecord::rate).sum()
    }

    /// Average annual loss Σ λᵢ μᵢ.
    pub fn aal(&self) -> Loss {
        self.records.iter().map(|r| r.rate * r.loss).sum()
    }

    /// Standard deviation of annual loss, `sqrt(Σ λᵢ (μᵢ² + σᵢ²))`.
    pub fn standard_deviation(&self) -> Real {
        self.records
            .iter()
            .map(|r| {
                let sd = r.std_dev();
                r.rate * (r.loss * r.loss + sd * sd)
            })
            .sum::<Real>()
            .sqrt()
    }

    /// Coefficient of variation of annual loss; `None` when the AAL is zero.
    pub fn coefficient_of_variation(&self) -> Option<Real> {
        let aal = self.aal();
        (aal > 0.0).then(|| self.standard_deviation() / aal)
    }

    /// Largest mean loss of any event (0 for an empty table).
    pub fn max_loss(&self) -> Loss {
        self.records.iter().map(EventRecord::loss).fold(0.0, Real::max)
    }

    /// Merge `other` into a new table, combining events present in both.
    /// See [`group_records`] for the combination rules.
    pub fn group(&self, other: &EventLossTable) -> Result<Self> {
        group_records(self.records.iter().chain(other.records.iter()).cloned())
    }
}

impl<'a> IntoIterator for &'a EventLossTable {
    type Item = &'a EventRecord;
    type IntoIter = std::slice::Iter<'a, EventRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ── Grouping ──────────────────────────────────────────────────────────────────

/// Independent components are uncorrelated across contributions.
fn root_sum_of_squares(a: Real, b: Real) -> Real {
    a.hypot(b)
}

/// Correlated components, losses and exposures add.
fn sum(a: Real, b: Real) -> Real {
    a + b
}

#[derive(Debug)]
struct EventAccumulator {
    record: EventRecord,
    contributions: usize,
}

impl EventAccumulator {
    fn absorb(&mut self, other: &EventRecord) -> Result<()> {
        let acc = &mut self.record;
        if acc.rate != other.rate {
            return Err(Error::InconsistentInput(format!(
                "event {} has rates {} and {}",
                acc.event_id, acc.rate, other.rate
            )));
        }
        acc.loss = sum(acc.loss, other.loss);
        acc.std_dev_c = sum(acc.std_dev_c, other.std_dev_c);
        acc.exposure = sum(acc.exposure, other.exposure);
        acc.std_dev_i = root_sum_of_squares(acc.std_dev_i, other.std_dev_i);
        acc.total_std_dev = None;
        self.contributions += 1;
        Ok(())
    }
}

/// Group records into an ELT keyed by event id.
///
/// Records sharing an id are merged: loss, correlated std dev and exposure
/// are summed; the independent std dev combines as `sqrt(Σ σᵢ²)`.  A
/// supplied total std dev is dropped from merged events.  Events keep the
/// order in which their id was first seen.
///
/// # Errors
/// Returns [`Error::InconsistentInput`] if records sharing an id disagree
/// on the rate.
pub fn group_records(records: impl IntoIterator<Item = EventRecord>) -> Result<EventLossTable> {
    let mut order: Vec<EventAccumulator> = Vec::new();
    let mut slots: HashMap<EventId, usize> = HashMap::new();
    for record in records {
        match slots.get(&record.event_id) {
            Some(&slot) => order[slot].absorb(&record)?,
            None => {
                slots.insert(record.event_id, order.len());
                order.push(EventAccumulator {
                    record,
                    contributions: 1,
                });
            }
        }
    }

    let merged = order.iter().filter(|acc| acc.contributions > 1).count();
    debug!(
        events = order.len(),
        merged,
        "grouped event loss records"
    );
    EventLossTable::new(order.into_iter().map(|acc| acc.record).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn record(id: EventId, rate: Real, loss: Loss, sdi: Real, sdc: Real, exp: Real) -> EventRecord {
        EventRecord::new(id, rate, loss, sdi, sdc, exp).unwrap()
    }

    #[test]
    fn std_dev_is_additive_unless_supplied() {
        let r = record(1, 0.01, 100.0, 30.0, 20.0, 1000.0);
        assert_eq!(r.std_dev(), 50.0);
        let r = r.with_total_std_dev(42.0).unwrap();
        assert_eq!(r.std_dev(), 42.0);
        assert_eq!(r.coefficient_of_variation(), Some(0.42));
    }

    #[test]
    fn record_validation() {
        assert!(EventRecord::new(1, -0.1, 1.0, 0.0, 0.0, 1.0).is_err());
        assert!(EventRecord::new(1, 0.1, -1.0, 0.0, 0.0, 1.0).is_err());
        assert!(EventRecord::new(1, 0.1, 1.0, -1.0, 0.0, 1.0).is_err());
        assert!(EventRecord::new(1, 0.1, 1.0, 0.0, 0.0, 0.0).is_err());
        assert!(EventRecord::new(1, Real::NAN, 1.0, 0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = EventLossTable::new(vec![
            record(7, 0.01, 1.0, 0.0, 0.0, 1.0),
            record(7, 0.01, 2.0, 0.0, 0.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, Error::DuplicateEvent(7));
    }

    #[test]
    fn aal_ignores_exposure() {
        let a = EventLossTable::new(vec![
            record(1, 0.02, 1000.0, 10.0, 10.0, 5000.0),
            record(2, 0.5, 40.0, 1.0, 1.0, 100.0),
        ])
        .unwrap();
        let b = EventLossTable::new(vec![
            record(1, 0.02, 1000.0, 10.0, 10.0, 9_000_000.0),
            record(2, 0.5, 40.0, 1.0, 1.0, 100.0),
        ])
        .unwrap();
        assert_abs_diff_eq!(a.aal(), 0.02 * 1000.0 + 0.5 * 40.0, epsilon = 1e-12);
        assert_eq!(a.aal(), b.aal());
    }

    #[test]
    fn grouping_merges_fields() {
        let table = group_records(vec![
            record(100, 0.000018, 51765.0, 2591.0, 67373.0, 200000.0),
            record(200, 0.00021, 30931.0, 10482.0, 13942.0, 200000.0),
            record(100, 0.000018, 16329.0, 26826.0, 18160.0, 100000.0),
        ])
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[0].event_id(), 100);
        let merged = table.get(100).unwrap();
        assert_eq!(merged.loss(), 68094.0);
        assert_eq!(merged.std_dev_c(), 85533.0);
        assert_eq!(merged.exposure(), 300000.0);
        assert_abs_diff_eq!(merged.std_dev_i(), 26950.83592, epsilon = 1e-5);
        // untouched events pass through exactly
        assert_eq!(table.get(200).unwrap().std_dev_i(), 10482.0);
    }

    #[test]
    fn grouping_rejects_conflicting_rates() {
        let err = group_records(vec![
            record(1, 0.01, 1.0, 0.0, 0.0, 10.0),
            record(1, 0.02, 1.0, 0.0, 0.0, 10.0),
        ])
        .unwrap_err();
        assert!(matches!(err, Error::InconsistentInput(_)));
    }

    #[test]
    fn raw_rows_name_missing_fields() {
        let rows = vec![
            RawEventRecord {
                event_id: Some(1),
                rate: Some(0.1),
                loss: Some(10.0),
                std_dev_i: Some(1.0),
                std_dev_c: Some(1.0),
                exp_value: Some(100.0),
                std_dev: None,
            },
            RawEventRecord {
                loss: Some(10.0),
                std_dev_c: Some(1.0),
                exp_value: Some(100.0),
                ..Default::default()
            },
        ];
        let err = EventLossTable::from_raw(rows).unwrap_err();
        assert_eq!(
            err,
            Error::Schema {
                missing: vec!["EventId".into(), "Rate".into(), "StdDevI".into()]
            }
        );
    }
}
