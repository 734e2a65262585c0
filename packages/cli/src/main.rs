#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the crime demo query engine.
//!
//! ```text
//! crime_demo_cli total data/crimes.csv
//! crime_demo_cli breakdown data/crimes.csv --group-by year
//! crime_demo_cli summary data/crimes.csv --group-by place
//! crime_demo_cli chain-snatching data/fir_data.csv --area Downtown --limit 10
//! crime_demo_cli patterns data/crimes.csv --column vehicle_color --column phone_id
//! crime_demo_cli serve
//! ```
//!
//! Every query subcommand prints pretty JSON on stdout. Area coordinates for
//! `chain-snatching` and everything `serve` needs come from the same
//! environment and TOML configuration as the standalone server.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use crime_demo_dataset::{loader, patterns, query, reports};
use crime_demo_dataset_models::query::DEFAULT_LIMIT;
use crime_demo_dataset_models::{ChainSnatchingQuery, GroupBy, RepeatIndicatorOutcome};
use crime_demo_server::config::AppConfig;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "crime_demo_cli",
    about = "Query crime incident CSV files or run the API server"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count every row in the file
    Total {
        path: PathBuf,
    },
    /// Break the file down by crime type, year or location
    Breakdown {
        path: PathBuf,
        #[arg(long, default_value = "type")]
        group_by: GroupBy,
    },
    /// Legacy label/value summary
    Summary {
        path: PathBuf,
        /// Unknown groupings produce an empty list
        #[arg(long, default_value = "type")]
        group_by: String,
    },
    /// Chain-snatching counts per area
    ChainSnatching {
        path: PathBuf,
        #[arg(long)]
        area: Option<String>,
        /// Inclusive lower bound, YYYY-MM-DD
        #[arg(long)]
        start_date: Option<String>,
        /// Inclusive upper bound, YYYY-MM-DD
        #[arg(long)]
        end_date: Option<String>,
        /// Inclusive lower bound, HH:MM
        #[arg(long)]
        start_time: Option<String>,
        /// Inclusive upper bound, HH:MM
        #[arg(long)]
        end_time: Option<String>,
        #[arg(long, default_value_t = DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Flag values repeated across incidents (same vehicle, same phone)
    Patterns {
        path: PathBuf,
        /// Column to scan; may be repeated
        #[arg(long = "column", default_values_t = ["vehicle_color".to_string(), "phone_id".to_string()])]
        columns: Vec<String>,
        /// Occurrences of the top value that raise an alert
        #[arg(long, default_value_t = patterns::DEFAULT_REPEAT_THRESHOLD)]
        threshold: u64,
    },
    /// Run the HTTP API server
    Serve,
}

#[derive(Serialize)]
struct PatternReport {
    total_crimes: u64,
    indicators: Vec<RepeatIndicatorOutcome>,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::formatted_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Total { path } => print_json(&reports::get_total_crimes(&path)?)?,
        Commands::Breakdown { path, group_by } => {
            print_json(&reports::get_breakdown(&path, group_by)?)?;
        }
        Commands::Summary { path, group_by } => {
            print_json(&reports::summarize_by(&path, &group_by)?)?;
        }
        Commands::ChainSnatching {
            path,
            area,
            start_date,
            end_date,
            start_time,
            end_time,
            limit,
            offset,
        } => {
            let config = AppConfig::from_env()?;
            let request = ChainSnatchingQuery {
                area,
                start_date,
                end_date,
                start_time,
                end_time,
                limit,
                offset,
            };
            print_json(&query::run_chain_snatching(
                &path,
                &request,
                &config.area_coordinates,
            )?)?;
        }
        Commands::Patterns {
            path,
            columns,
            threshold,
        } => {
            let table = loader::process_csv(&path)?;
            let indicators = patterns::repeat_indicators(&table, &columns, threshold);
            for indicator in &indicators {
                if let RepeatIndicatorOutcome::Found(found) = indicator
                    && found.alert
                    && let Some(top) = &found.top
                {
                    log::warn!(
                        "{:?} repeats {} times in {}",
                        top.value,
                        top.count,
                        found.column
                    );
                }
            }
            print_json(&PatternReport {
                total_crimes: table.len() as u64,
                indicators,
            })?;
        }
        Commands::Serve => {
            let config = AppConfig::from_env()?;
            // The server uses actix-web's runtime.
            actix_web::rt::System::new().block_on(crime_demo_server::run_server(config))?;
        }
    }

    Ok(())
}
