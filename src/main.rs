use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use wellness_hub::config::{self, SourceConfig};
use wellness_hub::filter::{self, DateRange, PlayerFilter};
use wellness_hub::models::{Dataset, NormalizedRecord};
use wellness_hub::source::{CachedSource, CsvSource};
use wellness_hub::{coerce, report};

#[derive(Parser)]
#[command(name = "wellness-hub")]
#[command(
    about = "Performance & wellness dashboards over published spreadsheet exports",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    sources: SourceConfig,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wellness check-ins
    Wellness {
        #[command(subcommand)]
        view: WellnessView,
    },
    /// Individual activity calendar
    Calendar {
        #[arg(long)]
        player: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Physiotherapy procedures
    Procedures {
        #[arg(long)]
        player: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Weight and body fat tracking
    Weight {
        /// Repeat to compare players; defaults to the first player
        #[arg(long = "player")]
        players: Vec<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write a normalized table as CSV or JSON
    Export {
        #[arg(long, value_enum)]
        dataset: DatasetArg,
        #[arg(long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum WellnessView {
    /// Every player's check-in for one day
    Daily {
        /// Defaults to the latest check-in date
        #[arg(long, value_parser = parse_day)]
        date: Option<NaiveDate>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// One player, or the daily average, over a date range
    Trend {
        #[arg(long)]
        player: Option<String>,
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Both bounds or neither; neither selects a trailing window ending on the
/// latest record.
#[derive(Args)]
struct RangeArgs {
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DatasetArg {
    Wellness,
    Calendar,
    Procedures,
    WeightFat,
}

impl From<DatasetArg> for Dataset {
    fn from(value: DatasetArg) -> Self {
        match value {
            DatasetArg::Wellness => Dataset::Wellness,
            DatasetArg::Calendar => Dataset::Calendar,
            DatasetArg::Procedures => Dataset::Procedures,
            DatasetArg::WeightFat => Dataset::WeightFat,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn parse_day(raw: &str) -> Result<NaiveDate, String> {
    coerce::date(raw)
        .ok_or_else(|| format!("`{raw}` is not a date (expected DD/MM/YYYY or YYYY-MM-DD)"))
}

fn emit(content: &str, out: Option<&Path>) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}.", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
        }
    }
    Ok(())
}

fn resolve_range(
    range: &RangeArgs,
    records: &[NormalizedRecord],
    default_days: i64,
) -> anyhow::Result<Option<DateRange>> {
    DateRange::resolve(range.from, range.to, records, default_days)
        .context("invalid date range")
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .init();

    let cli = Cli::parse();
    let mut source = CachedSource::new(CsvSource::new(cli.sources.paths()), config::cache_ttls());

    match cli.command {
        Commands::Wellness { view } => {
            let records = wellness_hub::load(&mut source, Dataset::Wellness)?;
            match view {
                WellnessView::Daily { date, out } => {
                    let Some(date) = date.or_else(|| filter::latest_date(&records)) else {
                        println!("No wellness check-ins found.");
                        return Ok(());
                    };
                    let day = DateRange::day(date);
                    let filtered = filter::filter(&records, &day, &PlayerFilter::All);
                    if filtered.is_empty() {
                        println!("No data available for the selected date.");
                        return Ok(());
                    }
                    emit(&report::wellness_daily(date, &filtered), out.as_deref())?;
                }
                WellnessView::Trend { player, range, out } => {
                    let Some(range) = resolve_range(&range, &records, 30)? else {
                        println!("No wellness check-ins found.");
                        return Ok(());
                    };
                    let players = PlayerFilter::parse(player.as_deref());
                    let filtered = filter::filter(&records, &range, &players);
                    if filtered.is_empty() {
                        println!("No data available for the selected filters.");
                        return Ok(());
                    }
                    let markdown = report::wellness_trend(&players, &range, &filtered);
                    emit(&markdown, out.as_deref())?;
                }
            }
        }
        Commands::Calendar { player, range, out } => {
            let records = wellness_hub::load(&mut source, Dataset::Calendar)?;
            let Some(range) = resolve_range(&range, &records, 30)? else {
                println!("No activity data found.");
                return Ok(());
            };
            let players = PlayerFilter::parse(player.as_deref());
            let filtered = filter::filter(&records, &range, &players);
            if filtered.is_empty() {
                println!("No activity data available for the selected filters.");
                return Ok(());
            }
            let markdown = report::calendar(&players, &range, &filtered);
            emit(&markdown, out.as_deref())?;
        }
        Commands::Procedures { player, range, out } => {
            let records = wellness_hub::load(&mut source, Dataset::Procedures)?;
            let Some(range) = resolve_range(&range, &records, 14)? else {
                println!("No procedures found.");
                return Ok(());
            };
            let players = PlayerFilter::parse(player.as_deref());
            let filtered = filter::filter(&records, &range, &players);
            if filtered.is_empty() {
                println!("No data available for the selected filters.");
                return Ok(());
            }
            let markdown = report::procedures(&players, &range, &filtered);
            emit(&markdown, out.as_deref())?;
        }
        Commands::Weight { players, range, out } => {
            let records = wellness_hub::load(&mut source, Dataset::WeightFat)?;
            let Some(range) = resolve_range(&range, &records, 30)? else {
                println!("No weight or body fat readings found.");
                return Ok(());
            };
            let selected: Vec<String> = if players.is_empty() {
                filter::players(&records).into_iter().take(1).collect()
            } else {
                players
            };
            let players = PlayerFilter::AnyOf(selected.clone());
            let filtered = filter::filter(&records, &range, &players);
            if filtered.is_empty() {
                println!("No data for selected filters.");
                return Ok(());
            }
            let markdown = report::weight_fat(&selected, &range, &filtered, &records);
            emit(&markdown, out.as_deref())?;
        }
        Commands::Export { dataset, format, out } => {
            let dataset = Dataset::from(dataset);
            let records = wellness_hub::load(&mut source, dataset)?;
            log::info!("exporting {} {dataset:?} records", records.len());
            let exported = match format {
                Format::Csv => report::export_csv(dataset, &records)?,
                Format::Json => report::export_json(&records)?,
            };
            emit(&exported, out.as_deref())?;
        }
    }

    Ok(())
}
