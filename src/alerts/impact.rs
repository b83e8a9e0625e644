use crate::alerts::panel::AlertPanel;
use crate::data::GroupKey;
use crate::error::{DataError, DataResult};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Total monetary exposure of the panel, rounded to 2 decimals.
///
/// An empty panel yields exactly zero.
pub fn estimate_financial_impact(panel: &AlertPanel) -> DataResult<Decimal> {
    panel
        .iter()
        .try_fold(Decimal::ZERO, |total, e| total.checked_add(e.impact))
        .map(|total| total.round_dp(2))
        .ok_or(DataError::TotalImpactOverflow)
}

/// Impact per (unit, material), largest first; ties ordered by key.
/// Group sums saturate at `Decimal::MAX`.
pub fn impact_by_group(panel: &AlertPanel) -> Vec<(GroupKey, Decimal)> {
    let mut totals: HashMap<GroupKey, Decimal> = HashMap::new();
    for entry in panel {
        let total = totals
            .entry(GroupKey::new(&entry.unit, &entry.material))
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(entry.impact);
    }

    let mut ranked: Vec<(GroupKey, Decimal)> = totals.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::panel::AlertPanelBuilder;
    use crate::data::{MovementKind, MovementRecord};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn panel() -> AlertPanel {
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut records = Vec::new();
        for (unit, cost) in [("U01", 1.25), ("U02", 3.10)] {
            for q in [10, 11, 9, 10, 10, 11, 9, 10] {
                records.push(MovementRecord::new(date, unit, "MAT-001", MovementKind::Inflow, q, cost));
            }
            records.push(MovementRecord::new(date, unit, "MAT-001", MovementKind::Outflow, -90, cost));
        }
        AlertPanelBuilder::default().build(&records).unwrap()
    }

    #[test]
    fn test_total_is_sum_of_entries() {
        let panel = panel();
        let total = estimate_financial_impact(&panel).unwrap();

        // 90 x 1.25 + 90 x 3.10
        assert_eq!(panel.len(), 2);
        assert_eq!(total, dec!(391.50));
        assert_eq!(total, panel.iter().map(|e| e.impact).sum::<Decimal>().round_dp(2));
    }

    #[test]
    fn test_empty_panel_is_zero() {
        let total = estimate_financial_impact(&AlertPanel::default()).unwrap();
        assert_eq!(total, Decimal::ZERO);
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        // Each group holds one flagged movement of 6e28, two of them exceed Decimal::MAX
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let mut records = Vec::new();
        for unit in ["U01", "U02"] {
            for q in [10, 11, 9, 10, 10, 11, 9, 10] {
                records.push(MovementRecord::new(date, unit, "MAT-001", MovementKind::Inflow, q, 1.0));
            }
            records.push(MovementRecord::new(
                date,
                unit,
                "MAT-001",
                MovementKind::Outflow,
                -6_000_000_000_000_000_000,
                1.0e10,
            ));
        }
        let panel = AlertPanelBuilder::default().build(&records).unwrap();

        assert_eq!(panel.len(), 2);
        assert!(matches!(
            estimate_financial_impact(&panel),
            Err(DataError::TotalImpactOverflow)
        ));

        let ranked = impact_by_group(&panel);
        assert_eq!(
            ranked[0].1,
            Decimal::from(6_000_000_000_000_000_000i64) * Decimal::from(10_000_000_000i64)
        );
    }

    #[test]
    fn test_impact_by_group_ranked() {
        let ranked = impact_by_group(&panel());

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, GroupKey::new("U02", "MAT-001"));
        assert_eq!(ranked[0].1, dec!(279.00));
        assert_eq!(ranked[1].1, dec!(112.50));
    }
}
