use crate::data::{MovementKind, MovementRecord};
use crate::detection::{GroupAnalysis, GroupStatisticsEngine, RecordScore};
use crate::error::{DataError, DataResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// One flagged movement, annotated for the alert panel
///
/// Field order is the column order handed to table/chart renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub date: NaiveDate,
    pub unit: String,
    pub material: String,
    pub kind: MovementKind,
    pub quantity: i64,
    /// Z-score rounded to 2 decimals; `None` when the group has no signal
    pub zscore: Option<f64>,
    pub zscore_flag: bool,
    pub iqr_flag: bool,
    /// |quantity| x unit cost, rounded to 2 decimals
    pub impact: Decimal,
    pub combined_flag: bool,
    pub unit_cost: f64,
}

/// Flagged movements ordered by impact, largest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertPanel {
    entries: Vec<AlertEntry>,
}

impl AlertPanel {
    pub fn entries(&self) -> &[AlertEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlertEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First `n` entries (the highest impacts)
    pub fn top(&self, n: usize) -> &[AlertEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

}

impl<'a> IntoIterator for &'a AlertPanel {
    type Item = &'a AlertEntry;
    type IntoIter = std::slice::Iter<'a, AlertEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Round to 2 decimals, ties to even
///
/// Same rule as the `round_dp` used for impacts, so a displayed Z-score
/// and an impact never disagree on how a half is resolved.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn check_unit_cost(unit_cost: f64, row: usize) -> DataResult<()> {
    if unit_cost.is_finite() && unit_cost > 0.0 {
        Ok(())
    } else {
        Err(DataError::InvalidUnitCost { row, value: unit_cost.to_string() })
    }
}

/// Monetary impact of a movement: |quantity| x unit cost, 2 decimals.
///
/// `None` when the product does not fit in a `Decimal`.
pub fn movement_impact(quantity: i64, unit_cost: Decimal) -> Option<Decimal> {
    Decimal::from(quantity.unsigned_abs())
        .checked_mul(unit_cost)
        .map(|impact| impact.round_dp(2))
}

/// Alert Panel Builder
///
/// 1. Score every record per (unit, material) group
/// 2. Keep records whose fused flag is set
/// 3. Attach rounded Z-score and monetary impact
/// 4. Stable sort by impact, descending (ties keep input order)
#[derive(Debug, Clone, Default)]
pub struct AlertPanelBuilder {
    engine: GroupStatisticsEngine,
}

impl AlertPanelBuilder {
    pub fn new(engine: GroupStatisticsEngine) -> Self {
        Self { engine }
    }

    /// Build the panel. Any record with an unusable unit cost rejects the
    /// whole run before scoring; a flagged record whose impact overflows
    /// rejects it after.
    pub fn build(&self, records: &[MovementRecord]) -> DataResult<AlertPanel> {
        self.build_with_analysis(records).map(|(panel, _)| panel)
    }

    /// Build the panel and also return the per-record scores and group stats
    pub fn build_with_analysis(&self, records: &[MovementRecord]) -> DataResult<(AlertPanel, GroupAnalysis)> {
        for (i, record) in records.iter().enumerate() {
            check_unit_cost(record.unit_cost, i + 1)?;
        }

        let analysis = self.engine.evaluate(records);

        let mut entries = records
            .iter()
            .zip(analysis.scores.iter())
            .enumerate()
            .filter(|(_, (_, score))| score.flags.combined_flag)
            .map(|(i, (record, score))| Self::entry(record, score, i + 1))
            .collect::<DataResult<Vec<AlertEntry>>>()?;

        entries.sort_by(|a, b| b.impact.cmp(&a.impact));

        debug!(groups = analysis.groups.len(), "alert panel scored");
        info!(
            records = records.len(),
            alerts = entries.len(),
            "alert panel built"
        );

        Ok((AlertPanel { entries }, analysis))
    }

    fn entry(record: &MovementRecord, score: &RecordScore, row: usize) -> DataResult<AlertEntry> {
        // from_f64_retain is None for costs above Decimal::MAX
        let impact = Decimal::from_f64_retain(record.unit_cost)
            .and_then(|cost| movement_impact(record.quantity, cost))
            .ok_or(DataError::ImpactOverflow { row })?;

        Ok(AlertEntry {
            date: record.date,
            unit: record.unit.clone(),
            material: record.material.clone(),
            kind: record.kind,
            quantity: record.quantity,
            zscore: score.zscore.map(round2),
            zscore_flag: score.flags.zscore_flag,
            iqr_flag: score.flags.iqr_flag,
            impact,
            combined_flag: score.flags.combined_flag,
            unit_cost: record.unit_cost,
        })
    }
}
