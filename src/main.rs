//! Poolroute - route sequencing CLI
//!
//! Reads a technician's stops, asks the configured directions provider for a
//! route and prints the resequenced plan as JSON.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use poolroute::config::Config;
use poolroute::{create_directions_client, RouteSequencer, RoutingContext, StopInput, StopSet};

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;

    std::fs::create_dir_all(&config.logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &config.logs_dir, "poolroute.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Initialize logging - stderr (stdout carries the JSON plan) and file
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,poolroute=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("Configuration loaded: provider {}", config.provider);

    match cli.command {
        Command::CheckConfig => {
            let client = create_directions_client(config.directions_config())?;
            println!("provider: {} ({})", config.provider, client.name());
            println!("timeout: {} s", config.directions_timeout_seconds);
            Ok(())
        }
        Command::Route { stops, optimize, technician, date, retries } => {
            let raw = std::fs::read_to_string(&stops)
                .with_context(|| format!("Failed to read stops file {}", stops.display()))?;
            let items: Vec<StopInput> =
                serde_json::from_str(&raw).context("Failed to parse stops file")?;
            let stop_set = StopSet::from_ordered_list(items)?;
            info!("Loaded {} stops from {}", stop_set.len(), stops.display());

            let client = create_directions_client(config.directions_config())?;

            let cancellation = CancellationToken::new();
            let on_interrupt = cancellation.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, cancelling directions request");
                    on_interrupt.cancel();
                }
            });

            let mut context = RoutingContext::new(optimize)
                .with_timeout(config.directions_timeout())
                .with_cancellation(cancellation);
            context.technician_id = technician;
            context.date = date;

            let plan = RouteSequencer::compute_route_with_retries(
                &stop_set,
                client.as_ref(),
                &context,
                retries,
            )
            .await
            .inspect_err(|e| error!("Route computation failed: {}", e))?;

            info!(
                "Route: {:.1} mi, {:.0} min over {} legs",
                plan.result.total_distance_miles,
                plan.result.total_duration_minutes,
                plan.result.legs.len()
            );
            for warning in &plan.result.warnings {
                warn!("{}: {}", warning.warning_type, warning.message);
            }

            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }
    }
}
