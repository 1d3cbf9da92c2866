//! xwalk - crossing near-miss evaluation CLI

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use xwalk_core::{to_geodetic, to_planar, EncounterEvaluator, GeodeticPoint, PlanarPoint};
use xwalk_data::{load_crossings, HistoryClient};
use xwalk_runner::output::{read_history, write_records};
use xwalk_runner::{evaluate_window, run_window_loop, Config, RetryPolicy, WindowPlan};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Crossing near-miss evaluation for recorded vehicle and pedestrian telemetry
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Frame parameters JSON (defaults to the Martinez CCTA survey)
    #[arg(long, global = true)]
    frame: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pull telemetry from the history API window by window and evaluate it
    Run {
        /// Start time, "YYYY-MM-DD HH:MM:SS"
        #[arg(long, value_parser = parse_time)]
        start: NaiveDateTime,

        /// End time, "YYYY-MM-DD HH:MM:SS"
        #[arg(long, value_parser = parse_time)]
        end: NaiveDateTime,

        /// Window length in seconds
        #[arg(long)]
        window_secs: Option<u64>,

        /// Result file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Street map GeoJSON with crossing features
        #[arg(long)]
        crossings: Option<PathBuf>,

        /// History API URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Evaluate saved history API responses
    Evaluate {
        /// Saved ego vehicle response
        #[arg(long)]
        ego: PathBuf,

        /// Saved pedestrian response
        #[arg(long)]
        pedestrians: PathBuf,

        /// Street map GeoJSON with crossing features
        #[arg(long)]
        crossings: Option<PathBuf>,

        /// Result file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Convert planar x/y metres to latitude/longitude
    Xy2ll {
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },
    /// Convert latitude/longitude to planar x/y metres
    Ll2xy {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
    },
}

fn parse_time(value: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(value, TIME_FORMAT)
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {}", e))
}

/// `RUST_LOG` plus info level for the runner and data crates.
fn log_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env()
        .add_directive("xwalk_runner=info".parse()?)
        .add_directive("xwalk_data=info".parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(log_filter()?)
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(frame) = args.frame {
        config.frame_path = Some(frame);
    }

    match args.command {
        Command::Run {
            start,
            end,
            window_secs,
            output,
            crossings,
            url,
        } => {
            if let Some(secs) = window_secs {
                config.window_secs = secs;
            }
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(path) = crossings {
                config.crossings_path = path;
            }
            if let Some(url) = url {
                config.history_url = url;
            }
            run(config, start, end).await
        }
        Command::Evaluate {
            ego,
            pedestrians,
            crossings,
            output,
        } => {
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(path) = crossings {
                config.crossings_path = path;
            }
            evaluate(config, ego, pedestrians).await
        }
        Command::Xy2ll { x, y } => {
            let frame = config.load_frame()?;
            let point = to_geodetic(&frame, PlanarPoint::new(x, y))?;
            println!("Latitude: {}", point.latitude);
            println!("Longitude: {}", point.longitude);
            Ok(())
        }
        Command::Ll2xy { lat, lon } => {
            let frame = config.load_frame()?;
            let point = to_planar(&frame, GeodeticPoint::new(lat, lon));
            println!("X: {}", point.x);
            println!("Y: {}", point.y);
            Ok(())
        }
    }
}

fn build_evaluator(config: &Config) -> Result<EncounterEvaluator> {
    let frame = config.load_frame()?;
    let crossings = load_crossings(&config.crossings_path)?;
    Ok(EncounterEvaluator::new(frame, config.rules, &crossings))
}

async fn run(config: Config, start: NaiveDateTime, end: NaiveDateTime) -> Result<()> {
    if end <= start {
        anyhow::bail!("End time {} is not after start time {}", end, start);
    }

    let evaluator = build_evaluator(&config)?;
    let client = HistoryClient::new(config.history_url.clone(), config.request_timeout())?;
    tracing::info!(
        "Evaluating {} - {} in {}s windows against {}",
        start,
        end,
        config.window_secs,
        client.url()
    );

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let ctrl_c_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping window loop");
            let _ = ctrl_c_tx.send(());
        }
    });

    let plan = WindowPlan::new(start, end, config.window());
    let summary = run_window_loop(
        &client,
        &evaluator,
        plan,
        RetryPolicy::from_config(&config),
        shutdown_rx,
    )
    .await;
    drop(shutdown_tx);

    tracing::info!(
        "Evaluated {} window(s): {} empty, {} failed, {} unpaired, {} malformed",
        summary.windows_evaluated,
        summary.windows_empty,
        summary.windows_failed,
        summary.unpaired,
        summary.malformed
    );

    write_records(&config.output_path, &summary.records)
        .await
        .context("Failed to persist results")
}

async fn evaluate(config: Config, ego: PathBuf, pedestrians: PathBuf) -> Result<()> {
    let evaluator = build_evaluator(&config)?;
    let ego = read_history(&ego).await?;
    let pedestrians = read_history(&pedestrians).await?;

    let outcome = evaluate_window(&evaluator, &ego, &pedestrians);
    tracing::info!(
        "{} record(s), {} unpaired, {} malformed",
        outcome.records.len(),
        outcome.unpaired,
        outcome.malformed
    );

    write_records(&config.output_path, &outcome.records)
        .await
        .context("Failed to persist results")
}
