use material_flow_audit::alerts::{render_summary, write_panel_csv, write_panel_json};
use material_flow_audit::data::load_records_from_path;
use material_flow_audit::utils::init_from_config;
use material_flow_audit::{run_pipeline, Config, RecordGenerator};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

/// Detect anomalous material movements and estimate their financial impact
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file (defaults to $CONFIG_FILE or config/default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Movement dataset CSV; a synthetic dataset is generated when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Generator seed override
    #[arg(long)]
    seed: Option<u64>,

    /// Last simulated day (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,

    /// Z-score threshold override
    #[arg(long)]
    zscore_threshold: Option<f64>,

    /// IQR fence multiplier override
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Score groups on worker threads
    #[arg(long)]
    parallel: bool,

    /// Number of alerts to preview
    #[arg(long)]
    top: Option<usize>,

    /// Write the full panel as JSON
    #[arg(long)]
    json_out: Option<PathBuf>,

    /// Write the full panel as CSV
    #[arg(long)]
    csv_out: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(p) => Config::from_file(p).with_context(|| format!("loading {}", p.display())),
        None if std::env::var("CONFIG_FILE").is_ok() || Path::new("config/default.toml").exists() => {
            Config::load()
        }
        None => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    if let Some(end) = &args.end_date {
        config.generator.end_date = Some(NaiveDate::parse_from_str(end, "%Y-%m-%d")?);
    }
    if let Some(z) = args.zscore_threshold {
        config.detection.zscore_threshold = z;
    }
    if let Some(k) = args.iqr_multiplier {
        config.detection.iqr_multiplier = k;
    }
    if args.parallel {
        config.detection.parallel = true;
    }
    if let Some(top) = args.top {
        config.report.preview_rows = top;
    }
    config.detection.validate()?;

    init_from_config(&config.logging)?;

    let records = match &args.input {
        Some(path) => {
            info!("Loading movement dataset from {}", path.display());
            load_records_from_path(path)?
        }
        None => {
            info!(seed = config.generator.seed, "Generating synthetic movement dataset");
            RecordGenerator::new(config.generator.clone()).generate()?
        }
    };
    info!("✓ {} movement records ready", records.len());

    let output = run_pipeline(&records, &config.detection)?;

    println!();
    print!(
        "{}",
        render_summary(&output.panel, output.total_impact, &config.report.currency, config.report.preview_rows)
    );

    let json_path = args
        .json_out
        .or_else(|| non_empty_path(&config.report.json_path));
    if let Some(path) = json_path {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_panel_json(BufWriter::new(file), &output.panel)?;
        info!("Panel saved to: {}", path.display());
    }

    let csv_path = args
        .csv_out
        .or_else(|| non_empty_path(&config.report.csv_path));
    if let Some(path) = csv_path {
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        write_panel_csv(BufWriter::new(file), &output.panel)?;
        info!("Panel saved to: {}", path.display());
    }

    Ok(())
}

fn non_empty_path(path: &str) -> Option<PathBuf> {
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}
