pub mod panel;
pub mod impact;
pub mod report;

pub use panel::{movement_impact, round2, AlertEntry, AlertPanel, AlertPanelBuilder};
pub use impact::{estimate_financial_impact, impact_by_group};
pub use report::{
    format_currency, render_alert_table, render_summary, summary_line,
    write_panel_csv, write_panel_json, PANEL_COLUMNS,
};
