use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

mod aggregate;
mod config;
mod error;
mod loader;
mod logging;
mod models;
mod report;
mod scoring;
mod views;
mod zones;

use crate::aggregate::Reducer;
use crate::config::ScoringConfig;
use crate::models::{Dimension, Metric, Record};

#[derive(Parser)]
#[command(name = "supply-chain-insights")]
#[command(about = "Risk, replenishment and sales views over a supply chain CSV", long_about = None)]
struct Cli {
    /// TOML file overriding scoring weights, zone thresholds and fallback
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    Risk,
    Priority,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank products by risk or replenishment priority
    Score {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum, default_value = "risk")]
        scheme: SchemeArg,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print the full scored table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Group records by a column and reduce a numeric field
    Aggregate {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, value_enum)]
        by: Dimension,
        #[arg(long, value_enum)]
        field: Metric,
        #[arg(long, value_enum, default_value = "sum")]
        reducer: Reducer,
        /// Decimal places shown; defaults by field and reducer
        #[arg(long)]
        precision: Option<u32>,
    },
    /// Emit all ten dashboard views as JSON
    Dashboard {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a markdown report
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ScoringConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ScoringConfig::default(),
    };

    match cli.command {
        Commands::Score {
            csv,
            scheme,
            limit,
            json,
        } => {
            let records = load(&csv)?;
            let outcome = match scheme {
                SchemeArg::Risk => scoring::compute_risk_scores(&records, &config),
                SchemeArg::Priority => scoring::compute_priority_scores(&records, &config),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }

            if outcome.scored.is_empty() {
                println!("No scorable records found.");
                return Ok(());
            }

            println!("Top products by {} score:", outcome.noun.to_lowercase());
            for scored in outcome.ranked().into_iter().take(limit) {
                println!(
                    "- {} score {:.2} ({}) stock {:.2} {} {:.2} lead time {:.2}",
                    scored.sku,
                    scored.score,
                    outcome.zone_label(scored.zone),
                    scored.normalized_stock().unwrap_or_default(),
                    match scheme {
                        SchemeArg::Risk => "sales",
                        SchemeArg::Priority => "order",
                    },
                    scored.normalized_sales_or_order().unwrap_or_default(),
                    scored.normalized_lead_time().unwrap_or_default(),
                );
            }
            if outcome.skipped > 0 {
                println!("Skipped {} records with missing values.", outcome.skipped);
            }
        }
        Commands::Aggregate {
            csv,
            by,
            field,
            reducer,
            precision,
        } => {
            let records = load(&csv)?;
            let precision = precision.unwrap_or_else(|| reducer.default_precision(field));
            let outcome = aggregate::aggregate_by_key(&records, by, field, reducer, precision);

            for row in &outcome.rows {
                println!(
                    "- {}: {:.*} ({} records)",
                    row.key, precision as usize, row.rounded, row.count
                );
            }
            if outcome.skipped > 0 {
                println!("Skipped {} records with missing values.", outcome.skipped);
            }
        }
        Commands::Dashboard { csv, out } => {
            let records = load(&csv)?;
            let dashboard = views::build_dashboard(&records, &config);
            let json = serde_json::to_string_pretty(&dashboard)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Report { csv, out } => {
            let records = load(&csv)?;
            let dashboard = views::build_dashboard(&records, &config);
            let report = report::build_report(
                &csv.display().to_string(),
                chrono::Utc::now(),
                &dashboard,
            );
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load(csv: &std::path::Path) -> anyhow::Result<Vec<Record>> {
    loader::load_records_file(csv).with_context(|| format!("failed to load {}", csv.display()))
}
