//! CSV movement dataset loader.
//!
//! Expected CSV columns:
//!   date, unit, material, kind, quantity, unit_cost[, movement_value]
//!
//! `movement_value` is recomputed from quantity and unit cost, so it may be
//! absent on input.

use crate::data::record::{MovementKind, MovementRecord};
use crate::error::{DataError, DataResult};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::debug;

/// Column order used when writing datasets
pub const DATASET_COLUMNS: [&str; 7] = [
    "date",
    "unit",
    "material",
    "kind",
    "quantity",
    "unit_cost",
    "movement_value",
];

/// A CSV row before validation. Every field is kept as text so that a
/// malformed value can be reported with its row instead of a generic
/// deserialization failure.
#[derive(Debug, Default, Deserialize)]
struct RawRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    material: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    quantity: Option<String>,
    #[serde(default)]
    unit_cost: Option<String>,
}

fn required(value: Option<String>, row: usize, field: &'static str) -> DataResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(DataError::MissingField { row, field }),
    }
}

impl RawRow {
    fn validate(self, row: usize) -> DataResult<MovementRecord> {
        let date_text = required(self.date, row, "date")?;
        let unit = required(self.unit, row, "unit")?;
        let material = required(self.material, row, "material")?;
        let kind_text = required(self.kind, row, "kind")?;
        let quantity_text = required(self.quantity, row, "quantity")?;
        let cost_text = required(self.unit_cost, row, "unit_cost")?;

        // Accept full timestamps by looking at the date part only
        let date = NaiveDate::parse_from_str(date_text.get(..10).unwrap_or(&date_text), "%Y-%m-%d")
            .map_err(|_| DataError::InvalidDate { row, value: date_text.clone() })?;

        let kind: MovementKind = kind_text
            .parse()
            .map_err(|reason| DataError::InvalidKind { row, reason })?;

        let quantity: i64 = quantity_text
            .parse()
            .map_err(|_| DataError::InvalidQuantity { row, value: quantity_text.clone() })?;

        let unit_cost = match cost_text.parse::<f64>() {
            Ok(c) if c.is_finite() && c > 0.0 => c,
            _ => return Err(DataError::InvalidUnitCost { row, value: cost_text }),
        };

        Ok(MovementRecord::new(date, unit, material, kind, quantity, unit_cost))
    }
}

/// Load and validate movement records from a CSV reader.
///
/// The first malformed row aborts the load; row numbers are 1-based and
/// count data rows only.
pub fn load_records<R: Read>(reader: R) -> DataResult<Vec<MovementRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<RawRow>().enumerate() {
        let raw = result?;
        records.push(raw.validate(idx + 1)?);
    }

    debug!(records = records.len(), "loaded movement dataset");
    Ok(records)
}

/// Load a dataset from a CSV file on disk
pub fn load_records_from_path<P: AsRef<Path>>(path: P) -> DataResult<Vec<MovementRecord>> {
    let file = File::open(path)?;
    load_records(file)
}

/// Write records as CSV, header first (also for an empty dataset)
pub fn write_records<W: Write>(writer: W, records: &[MovementRecord]) -> DataResult<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(DATASET_COLUMNS)?;
    for record in records {
        csv_writer.serialize(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date,unit,material,kind,quantity,unit_cost,movement_value\n";

    #[test]
    fn test_load_valid_rows() {
        let csv = format!(
            "{}2024-01-02,U01,MAT-001,inflow,20,12.5,250\n2024-01-02,U01,MAT-001,outflow,-18,12.5,-225\n",
            HEADER
        );
        let records = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, MovementKind::Inflow);
        assert_eq!(records[1].quantity, -18);
        assert_eq!(records[1].movement_value, -225.0);
    }

    #[test]
    fn test_movement_value_column_optional() {
        let csv = "date,unit,material,kind,quantity,unit_cost\n2024-01-02,U01,MAT-001,saida,-3,2.0\n";
        let records = load_records(csv.as_bytes()).unwrap();

        assert_eq!(records[0].kind, MovementKind::Outflow);
        assert_eq!(records[0].movement_value, -6.0);
    }

    #[test]
    fn test_non_numeric_quantity_rejects_run() {
        let csv = format!(
            "{}2024-01-02,U01,MAT-001,inflow,20,12.5,250\n2024-01-03,U01,MAT-001,inflow,lots,12.5,0\n",
            HEADER
        );
        let err = load_records(csv.as_bytes()).unwrap_err();

        match err {
            DataError::InvalidQuantity { row, value } => {
                assert_eq!(row, 2);
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_field_rejects_run() {
        let csv = format!("{}2024-01-02,,MAT-001,inflow,20,12.5,250\n", HEADER);
        let err = load_records(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, DataError::MissingField { row: 1, field: "unit" }));
    }

    #[test]
    fn test_missing_column_rejects_run() {
        let csv = "date,unit,material,kind,unit_cost\n2024-01-02,U01,MAT-001,inflow,12.5\n";
        let err = load_records(csv.as_bytes()).unwrap_err();

        assert!(matches!(err, DataError::MissingField { field: "quantity", .. }));
    }

    #[test]
    fn test_bad_unit_cost_and_date() {
        let zero_cost = format!("{}2024-01-02,U01,MAT-001,inflow,20,0,0\n", HEADER);
        assert!(matches!(
            load_records(zero_cost.as_bytes()).unwrap_err(),
            DataError::InvalidUnitCost { .. }
        ));

        let bad_date = format!("{}02/01/2024,U01,MAT-001,inflow,20,1.0,20\n", HEADER);
        assert!(matches!(
            load_records(bad_date.as_bytes()).unwrap_err(),
            DataError::InvalidDate { .. }
        ));
    }

    #[test]
    fn test_write_then_load() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        let records = vec![
            MovementRecord::new(date, "U03", "MAT-002", MovementKind::Inflow, 21, 7.25),
            MovementRecord::new(date, "U03", "MAT-002", MovementKind::Outflow, -140, 7.25),
        ];

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with(HEADER));

        let loaded = load_records(buf.as_slice()).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_empty_dataset() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[]).unwrap();

        assert!(load_records(buf.as_slice()).unwrap().is_empty());
    }
}
