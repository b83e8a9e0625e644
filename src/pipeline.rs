//! Single-pass batch analysis: score, filter, rank, aggregate.

use crate::alerts::{estimate_financial_impact, AlertPanel, AlertPanelBuilder};
use crate::data::MovementRecord;
use crate::detection::{GroupStatisticsEngine, GroupStats};
use crate::error::DataResult;
use crate::utils::config::DetectionConfig;
use rust_decimal::Decimal;
use tracing::info;

/// Everything one analysis run produces
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub panel: AlertPanel,
    pub total_impact: Decimal,
    pub groups: Vec<GroupStats>,
}

/// Run the full detection pipeline over an immutable dataset.
///
/// Performs no I/O and holds no state between calls: the same input and
/// configuration always give the same panel and total.
pub fn run_pipeline(records: &[MovementRecord], config: &DetectionConfig) -> DataResult<PipelineOutput> {
    let builder = AlertPanelBuilder::new(GroupStatisticsEngine::from_config(config));
    let (panel, analysis) = builder.build_with_analysis(records)?;
    let total_impact = estimate_financial_impact(&panel)?;

    info!(
        records = records.len(),
        groups = analysis.groups.len(),
        alerts = panel.len(),
        total_impact = %total_impact,
        "pipeline finished"
    );

    Ok(PipelineOutput {
        panel,
        total_impact,
        groups: analysis.groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MovementKind;
    use crate::error::DataError;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_dataset() {
        let output = run_pipeline(&[], &DetectionConfig::default()).unwrap();

        assert!(output.panel.is_empty());
        assert_eq!(output.total_impact, dec!(0.00));
        assert!(output.groups.is_empty());
    }

    #[test]
    fn test_reference_scenario() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let records: Vec<_> = [20, 21, 19, 20, -200, 18]
            .into_iter()
            .map(|q| {
                let kind = if q > 0 { MovementKind::Inflow } else { MovementKind::Outflow };
                MovementRecord::new(date, "U01", "MAT-001", kind, q, 7.5)
            })
            .collect();

        let output = run_pipeline(&records, &DetectionConfig::default()).unwrap();

        assert_eq!(output.panel.len(), 1);
        assert_eq!(output.panel.entries()[0].impact, dec!(1500.00));
        assert_eq!(output.total_impact, dec!(1500.00));
        assert_eq!(output.groups.len(), 1);
    }

    #[test]
    fn test_impact_overflow_is_an_error_not_a_panic() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();
        let mut records: Vec<_> = [20, 21, 19, 20, 18, 20, 21, 19]
            .into_iter()
            .map(|q| MovementRecord::new(date, "U01", "MAT-001", MovementKind::Inflow, q, 7.5))
            .collect();
        records.push(MovementRecord::new(
            date,
            "U01",
            "MAT-001",
            MovementKind::Outflow,
            -9_000_000_000_000_000_000,
            1.0e10,
        ));

        let result = std::panic::catch_unwind(|| run_pipeline(&records, &DetectionConfig::default()));

        assert!(matches!(
            result.expect("pipeline must not panic"),
            Err(DataError::ImpactOverflow { row: 9 })
        ));
    }
}
