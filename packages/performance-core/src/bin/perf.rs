//! perf CLI - Command line interface for balance performance analytics.
//!
//! Every command prints a JSON `ApiResponse` on stdout; logs go to stderr.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use performance_core::performance::cumulative_returns;
use performance_core::{
    analyze_risk_profile, compare_with_benchmark, filter_by_period, ApiResponse, BalanceObservation,
    Benchmark, CalculatorConfig, ChartPeriod, HistoryStore, PerformanceCalculator,
    PerformanceReport,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "perf")]
#[command(about = "Balance history performance metrics and projections")]
#[command(version)]
struct Cli {
    /// Balance history JSON file (defaults to PERF_HISTORY_FILE or the data dir)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Calculator config TOML file (defaults to PERF_CONFIG_FILE or the config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Chart period to analyze: 1M, 3M, 6M, 1Y or ALL
    #[arg(long, global = true, default_value = "ALL")]
    period: String,

    /// End of the chart period window (RFC 3339, defaults to now)
    #[arg(long, global = true)]
    as_of: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Analyze(AnalysisCommand),
    /// Append a balance observation to the history
    Record {
        /// Balance after any deposit or withdrawal
        #[arg(short, long)]
        balance: f64,
        /// Deposit (positive) or withdrawal (negative) included in the balance
        #[arg(short, long, allow_hyphen_values = true)]
        flow: Option<f64>,
        /// Observation date (YYYY-MM-DD, defaults to now)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
}

/// Commands that read the history filtered to `--period`.
#[derive(Subcommand)]
enum AnalysisCommand {
    /// Summary return and risk metrics
    Metrics,
    /// Daily or cumulative returns
    Returns {
        /// Returns relative to the first balance instead of day over day
        #[arg(long)]
        cumulative: bool,
    },
    /// Illustrative balance projection
    Project {
        /// Days to project (defaults to config)
        #[arg(long)]
        horizon: Option<u32>,
        /// Recent daily returns to average (defaults to config)
        #[arg(long)]
        lookback: Option<u32>,
        /// Seed for reproducible jitter
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare annualized return with a market benchmark
    Compare {
        /// SP500, NASDAQ or DOWJONES
        #[arg(short, long, default_value = "SP500")]
        benchmark: String,
    },
    /// Risk profile from volatility and Sharpe ratio
    Risk,
    /// Write a JSON report with metrics, history and projection
    Export {
        /// Output directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
        /// Seed for reproducible jitter
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let (output, code) = match run(cli) {
        Ok(data) => (render(&ApiResponse::ok(data)), ExitCode::SUCCESS),
        Err(e) => {
            tracing::error!("{:#}", e);
            (render(&ApiResponse::<()>::err(format!("{:#}", e))), ExitCode::FAILURE)
        }
    };

    println!("{}", output);
    code
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}

fn run(cli: Cli) -> anyhow::Result<Value> {
    let config_path = cli.config.unwrap_or_else(CalculatorConfig::default_path);
    let config = CalculatorConfig::load_from_path(&config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;
    let calculator = PerformanceCalculator::new(config)?;

    let history_path = cli.history.unwrap_or_else(HistoryStore::default_path);
    let mut store = HistoryStore::with_path(history_path.clone())
        .with_context(|| format!("loading history from {}", history_path.display()))?;

    match cli.command {
        Commands::Record {
            balance,
            flow,
            date,
        } => handle_record(&mut store, balance, flow, date),
        Commands::Analyze(command) => {
            let period: ChartPeriod = cli.period.parse()?;
            let as_of = cli.as_of.unwrap_or_else(Utc::now);
            let observations = filter_by_period(store.observations(), period, as_of)?;
            tracing::debug!(%period, observations = observations.len(), "analyzing history");

            handle_analysis(command, &calculator, period, observations)
        }
    }
}

fn handle_analysis(
    command: AnalysisCommand,
    calculator: &PerformanceCalculator,
    period: ChartPeriod,
    observations: &[BalanceObservation],
) -> anyhow::Result<Value> {
    match command {
        AnalysisCommand::Metrics => {
            let metrics = calculator.compute_metrics(observations)?;
            Ok(json!({ "period": period, "metrics": metrics }))
        }
        AnalysisCommand::Returns { cumulative } => {
            if cumulative {
                Ok(json!({ "cumulative_returns": cumulative_returns(observations) }))
            } else {
                let returns = calculator.compute_daily_returns(observations)?;
                Ok(json!({ "daily_returns": returns }))
            }
        }
        AnalysisCommand::Project {
            horizon,
            lookback,
            seed,
        } => {
            let horizon = horizon.unwrap_or(calculator.config().projection_horizon_days);
            let lookback = lookback.unwrap_or(calculator.config().lookback_days);
            let projection = match seed {
                Some(seed) => {
                    calculator.compute_projection_seeded(observations, horizon, lookback, seed)?
                }
                None => calculator.compute_projection(
                    observations,
                    horizon,
                    lookback,
                    &mut rand::rng(),
                )?,
            };
            Ok(json!({
                "horizon_days": horizon,
                "lookback_days": lookback,
                "illustrative": true,
                "projection": projection,
            }))
        }
        AnalysisCommand::Compare { benchmark } => {
            let benchmark: Benchmark = benchmark.parse()?;
            let metrics = calculator.compute_metrics(observations)?;
            Ok(json!({ "comparison": compare_with_benchmark(&metrics, benchmark) }))
        }
        AnalysisCommand::Risk => {
            let metrics = calculator.compute_metrics(observations)?;
            Ok(json!({ "risk_profile": analyze_risk_profile(&metrics) }))
        }
        AnalysisCommand::Export { dir, seed } => {
            let report = match seed {
                Some(seed) => PerformanceReport::generate(
                    calculator,
                    observations,
                    &mut StdRng::seed_from_u64(seed),
                )?,
                None => PerformanceReport::generate(calculator, observations, &mut rand::rng())?,
            };
            let path = report.write_to_dir(&dir, &calculator.config().report_prefix)?;
            Ok(json!({ "path": path, "exported_at": report.exported_at }))
        }
    }
}

fn handle_record(
    store: &mut HistoryStore,
    balance: f64,
    flow: Option<f64>,
    date: Option<NaiveDate>,
) -> anyhow::Result<Value> {
    let timestamp = match date {
        Some(date) => date
            .and_hms_opt(0, 0, 0)
            .context("invalid observation date")?
            .and_utc(),
        None => Utc::now(),
    };

    let mut observation = BalanceObservation::new(timestamp, balance);
    if let Some(flow) = flow {
        observation = observation.with_flow(flow);
    }

    store.record(observation.clone())?;
    store.save()?;

    Ok(json!({
        "observation": observation,
        "observations": store.len(),
        "path": store.path(),
    }))
}
