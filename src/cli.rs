//! CLI argument parsing for the poolroute binary.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "poolroute", about = "Route sequencing for pool-service technicians")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute a route for a JSON list of stops and print the plan
    Route {
        /// JSON file with `[{id, lat, lng, sequence?}]`
        #[arg(long)]
        stops: PathBuf,
        /// Let the provider reorder the intermediate stops
        #[arg(long)]
        optimize: bool,
        #[arg(long)]
        technician: Option<Uuid>,
        /// Service day (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Extra attempts after a retryable directions failure
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
    /// Validate configuration and print the selected provider
    CheckConfig,
}
