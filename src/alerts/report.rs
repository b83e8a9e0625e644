use crate::alerts::impact::impact_by_group;
use crate::alerts::panel::{AlertEntry, AlertPanel};
use anyhow::Result;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::io::Write;

/// Column headers of the exported panel, in order
pub const PANEL_COLUMNS: [&str; 11] = [
    "date",
    "unit",
    "material",
    "kind",
    "quantity",
    "zscore",
    "zscore_flag",
    "iqr_flag",
    "impact",
    "combined_flag",
    "unit_cost",
];

/// `R$ 12,345.67` style amount with thousands separators
pub fn format_currency(value: Decimal, currency: &str) -> String {
    let text = format!("{:.2}", value.round_dp(2).abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.is_sign_negative() && !value.round_dp(2).is_zero() { "-" } else { "" };
    format!("{} {}{}.{}", currency, sign, grouped, frac_part)
}

/// The one-line aggregate figure
pub fn summary_line(total: Decimal, currency: &str) -> String {
    format!("total potential impact: {}", format_currency(total, currency))
}

fn zscore_cell(zscore: Option<f64>) -> String {
    match zscore {
        Some(z) => format!("{:.2}", z),
        None => "NaN".to_string(),
    }
}

/// Fixed-width table of alert entries
pub fn render_alert_table(entries: &[AlertEntry]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<10} {:<5} {:<8} {:<7} {:>8} {:>7} {:>11} {:>8} {:>12}",
        "date", "unit", "material", "kind", "quantity", "zscore", "zscore_flag", "iqr_flag", "impact"
    );
    for e in entries {
        let _ = writeln!(
            out,
            "{:<10} {:<5} {:<8} {:<7} {:>8} {:>7} {:>11} {:>8} {:>12}",
            e.date.format("%Y-%m-%d").to_string(),
            e.unit,
            e.material,
            e.kind,
            e.quantity,
            zscore_cell(e.zscore),
            e.zscore_flag,
            e.iqr_flag,
            format!("{:.2}", e.impact),
        );
    }
    out
}

/// Console summary: headline counts, top groups, preview of the panel and
/// the total impact line.
pub fn render_summary(panel: &AlertPanel, total: Decimal, currency: &str, preview_rows: usize) -> String {
    let zscore_hits = panel.iter().filter(|e| e.zscore_flag).count();
    let iqr_hits = panel.iter().filter(|e| e.iqr_flag).count();

    let mut out = String::new();
    let _ = writeln!(out, "╔════════════════════════════════════════════════╗");
    let _ = writeln!(out, "║         ANOMALY ALERT PANEL                    ║");
    let _ = writeln!(out, "╠════════════════════════════════════════════════╣");
    let _ = writeln!(out, "║ Alerts: {:<38} ║", panel.len());
    let _ = writeln!(out, "║ Z-score hits: {:<32} ║", zscore_hits);
    let _ = writeln!(out, "║ IQR hits: {:<36} ║", iqr_hits);
    let _ = writeln!(out, "╚════════════════════════════════════════════════╝");

    let groups = impact_by_group(panel);
    if !groups.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top groups by impact:");
        for (key, impact) in groups.iter().take(5) {
            let _ = writeln!(out, "  {:<14} {}", key.to_string(), format_currency(*impact, currency));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "=== FIRST {} ALERTS ===", preview_rows.min(panel.len()));
    out.push_str(&render_alert_table(panel.top(preview_rows)));
    let _ = writeln!(out);
    let _ = writeln!(out, ">>> {}", summary_line(total, currency));
    out
}

/// Panel as a JSON array of entries
pub fn write_panel_json<W: Write>(writer: W, panel: &AlertPanel) -> Result<()> {
    serde_json::to_writer_pretty(writer, panel)?;
    Ok(())
}

/// Panel as CSV with `PANEL_COLUMNS` headers; a missing Z-score is an empty cell
pub fn write_panel_csv<W: Write>(writer: W, panel: &AlertPanel) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    csv_writer.write_record(PANEL_COLUMNS)?;
    for entry in panel {
        csv_writer.serialize(entry)?;
    }
    csv_writer.flush()?;
    Ok(())
}
