//! orblab CLI — import, build, query and export commands.
//!
//! Commands:
//! - `import` — load a CSV of 1-minute bars into the Parquet bar cache
//! - `build` — compute and persist DailyFeatureRecords for a date range
//! - `query` — aggregate stored trades, gross and net of costs
//! - `export` — write the stored trade tape as CSV

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use orblab_core::data::{import_csv, ParquetBarCache};
use orblab_runner::{
    write_trades_csv, AggregateQuery, DailyFeatureBuilder, FeatureStore, OrbConfig, RecordStore,
};

#[derive(Parser)]
#[command(
    name = "orblab",
    about = "orblab — opening range breakout feature engine"
)]
struct Cli {
    /// Path to the TOML config with instruments and trade specs
    #[arg(long, global = true, default_value = "orb.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV of bars (timestamp,open,high,low,close,volume) into the bar cache
    Import {
        /// Symbol the bars belong to
        #[arg(long)]
        symbol: String,

        /// CSV file to read
        #[arg(long)]
        csv: PathBuf,

        /// Bar cache directory (overrides the config)
        #[arg(long)]
        bars_dir: Option<PathBuf>,
    },

    /// Build daily feature records for every scheduled day in a range
    Build {
        /// Instrument symbol from the config
        #[arg(long)]
        instrument: String,

        /// First trading day (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last trading day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Feature store directory (overrides the config)
        #[arg(long)]
        features_dir: Option<PathBuf>,

        /// Bar cache directory (overrides the config)
        #[arg(long)]
        bars_dir: Option<PathBuf>,
    },

    /// Aggregate stored trades into gross and cost-adjusted metrics
    Query {
        #[arg(long)]
        instrument: String,

        /// Only this session (e.g. 0900)
        #[arg(long)]
        session: Option<String>,

        /// Only this trade spec
        #[arg(long)]
        trade_spec: Option<String>,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        #[arg(long)]
        features_dir: Option<PathBuf>,
    },

    /// Export the trade tape of stored records as CSV
    Export {
        #[arg(long)]
        instrument: String,

        #[arg(long)]
        start: Option<String>,

        #[arg(long)]
        end: Option<String>,

        /// Output CSV path
        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        features_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            symbol,
            csv,
            bars_dir,
        } => run_import(&cli.config, &symbol, &csv, bars_dir),
        Commands::Build {
            instrument,
            start,
            end,
            features_dir,
            bars_dir,
        } => run_build(&cli.config, &instrument, &start, &end, features_dir, bars_dir),
        Commands::Query {
            instrument,
            session,
            trade_spec,
            start,
            end,
            features_dir,
        } => run_query(&cli.config, instrument, session, trade_spec, start, end, features_dir),
        Commands::Export {
            instrument,
            start,
            end,
            out,
            features_dir,
        } => run_export(&cli.config, &instrument, start, end, &out, features_dir),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn parse_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
    s.as_deref().map(parse_date).transpose()
}

fn load_config(path: &Path) -> Result<OrbConfig> {
    OrbConfig::from_file(path).with_context(|| format!("loading config {}", path.display()))
}

/// Reads the config only when `--bars-dir` is not given.
fn run_import(config: &Path, symbol: &str, csv: &Path, bars_dir: Option<PathBuf>) -> Result<()> {
    let bars_dir = match bars_dir {
        Some(dir) => dir,
        None => load_config(config)?.store.bars_dir,
    };

    let imported = import_csv(symbol, csv).with_context(|| format!("reading {}", csv.display()))?;
    if imported.bars.is_empty() {
        bail!("{} contains no usable bars", csv.display());
    }

    let cache = ParquetBarCache::new(bars_dir);
    let summary = cache.write(symbol, &imported.bars)?;

    println!("Imported {} bars for {}", imported.bars.len(), summary.symbol);
    if imported.duplicates > 0 || imported.insane > 0 {
        println!(
            "  dropped {} duplicate and {} malformed bars",
            imported.duplicates, imported.insane
        );
    }
    println!(
        "  {} bars stored across years {:?} in {}",
        summary.stored,
        summary.years,
        cache.cache_dir().display()
    );
    Ok(())
}

fn run_build(
    config: &Path,
    instrument: &str,
    start: &str,
    end: &str,
    features_dir: Option<PathBuf>,
    bars_dir: Option<PathBuf>,
) -> Result<()> {
    let cfg = load_config(config)?;
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    let inst = cfg.instrument(instrument)?;

    let cache = ParquetBarCache::new(bars_dir.unwrap_or_else(|| cfg.store.bars_dir.clone()));
    let store = FeatureStore::open(features_dir.unwrap_or_else(|| cfg.store.features_dir.clone()))?;

    tracing::info!(%instrument, %start, %end, "building daily features");
    let builder = DailyFeatureBuilder::new(inst, &cfg.trade_specs, cfg.rolling.atr_lookback);
    let report = builder.build_range(&cache, &store, start, end)?;

    println!(
        "{}: {} of {} days built into {}",
        report.instrument,
        report.succeeded.len(),
        report.total(),
        store.root().display()
    );
    for failure in &report.failed {
        println!("  FAILED {}: {}", failure.day, failure.reason);
    }

    if !report.all_succeeded() {
        eprintln!("{} day(s) failed.", report.failed.len());
        std::process::exit(1);
    }
    Ok(())
}

fn open_store(config: &Path, features_dir: Option<PathBuf>) -> Result<FeatureStore> {
    let root = match features_dir {
        Some(dir) => dir,
        None => load_config(config)?.store.features_dir,
    };
    Ok(FeatureStore::open(root)?)
}

fn run_query(
    config: &Path,
    instrument: String,
    session: Option<String>,
    trade_spec: Option<String>,
    start: Option<String>,
    end: Option<String>,
    features_dir: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(config, features_dir)?;

    let mut query = AggregateQuery::new(instrument).between(parse_opt_date(start)?, parse_opt_date(end)?);
    if let Some(session) = session {
        query = query.session(session);
    }
    if let Some(trade_spec) = trade_spec {
        query = query.trade_spec(trade_spec);
    }

    let result = query.run(&store)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_export(
    config: &Path,
    instrument: &str,
    start: Option<String>,
    end: Option<String>,
    out: &Path,
    features_dir: Option<PathBuf>,
) -> Result<()> {
    let store = open_store(config, features_dir)?;
    let records = store.read_range(instrument, parse_opt_date(start)?, parse_opt_date(end)?)?;
    if records.is_empty() {
        bail!("no stored records for {instrument} in the requested range");
    }

    let file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    let rows = write_trades_csv(&records, BufWriter::new(file))?;
    println!(
        "Exported {rows} trades from {} days to {}",
        records.len(),
        out.display()
    );
    Ok(())
}
