use material_flow_audit::data::write_records;
use material_flow_audit::utils::init_logger;
use material_flow_audit::utils::LogFormat;
use material_flow_audit::{Config, RecordGenerator};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

/// Write a synthetic material movement dataset as CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file; only the [generator] section is used
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long, default_value = "movements.csv")]
    output: PathBuf,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Number of simulated days
    #[arg(long)]
    days: Option<u32>,

    /// Last simulated day (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    init_logger("info", LogFormat::Compact, None)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        config.generator.seed = seed;
    }
    if let Some(days) = args.days {
        config.generator.days = days;
    }
    if let Some(end) = &args.end_date {
        config.generator.end_date = Some(NaiveDate::parse_from_str(end, "%Y-%m-%d")?);
    }

    let records = RecordGenerator::new(config.generator).generate()?;

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    write_records(BufWriter::new(file), &records)?;

    info!("Wrote {} records to {}", records.len(), args.output.display());
    Ok(())
}
