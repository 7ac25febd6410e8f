//! Command-line parsing for the fixing regime analyzer.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! analytics code. Tunable flags are all optional: an unset flag falls back to
//! the environment, then to the built-in default.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fxr", version, about = "FX fixing analytics, regime classification, and confidence scoring")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one fixing series, print the per-day report, and optionally export.
    Analyze(AnalyzeArgs),
    /// Analyze several pairs in parallel and print one report per pair.
    Batch(BatchArgs),
    /// Generate a seeded synthetic series and analyze it.
    Demo(DemoArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Series CSV with `date` and `mid` columns.
    #[arg(long, value_name = "CSV")]
    pub series: PathBuf,

    /// Manual annotations CSV (`date`, `mid`, `is_manual_override`, ...).
    #[arg(long, value_name = "CSV")]
    pub annotations: Option<PathBuf>,

    /// Display name of the currency pair.
    #[arg(long, default_value = "USD/MXN")]
    pub pair: String,

    /// Explain a single date (defaults to the latest point when exporting a summary).
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Export per-day results to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the commentary request payload for the selected date to JSON.
    #[arg(long = "export-summary")]
    pub export_summary: Option<PathBuf>,

    /// Skip the per-day table.
    #[arg(long)]
    pub quiet: bool,

    #[command(flatten)]
    pub tunables: TunableArgs,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    /// Pair inputs as `PAIR=CSV`, repeatable (e.g. `--input USD/BRL=brl.csv`).
    #[arg(long = "input", value_name = "PAIR=CSV", required = true, value_parser = parse_pair_input)]
    pub inputs: Vec<(String, PathBuf)>,

    /// Per-pair annotations as `PAIR=CSV`, repeatable.
    #[arg(long = "annotations", value_name = "PAIR=CSV", value_parser = parse_pair_input)]
    pub annotations: Vec<(String, PathBuf)>,

    #[command(flatten)]
    pub tunables: TunableArgs,
}

#[derive(Debug, Args, Clone)]
pub struct DemoArgs {
    #[arg(long, default_value = "USD/MXN")]
    pub pair: String,

    /// Random seed (same seed, same series).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of business days to generate.
    #[arg(long, default_value_t = 120)]
    pub days: usize,

    /// First date (rolled forward to a business day).
    #[arg(long, value_parser = parse_date_arg, default_value = "2025-01-02")]
    pub start: NaiveDate,

    /// Starting mid-rate.
    #[arg(long, default_value_t = 17.0)]
    pub level: f64,

    /// Daily return std dev (percentage points).
    #[arg(long, default_value_t = 0.35)]
    pub vol: f64,

    /// Mean daily return (percentage points).
    #[arg(long, default_value_t = 0.0)]
    pub drift: f64,

    /// Probability of a jump day.
    #[arg(long, default_value_t = 0.02)]
    pub jump_prob: f64,

    /// Jump size (percentage points).
    #[arg(long, default_value_t = 6.0)]
    pub jump_size: f64,

    /// Probability of a manual (non-override) fixing on a day.
    #[arg(long, default_value_t = 0.03)]
    pub manual_prob: f64,

    /// Probability of a manual override on a day.
    #[arg(long, default_value_t = 0.02)]
    pub override_prob: f64,

    /// Export per-day results to JSON.
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub tunables: TunableArgs,
}

/// Pipeline tunables; each overrides the matching `FXR_*` environment value.
#[derive(Debug, Args, Clone, Default)]
pub struct TunableArgs {
    /// Rolling volatility window (clamped to 2..=60).
    #[arg(long, allow_negative_numbers = true)]
    pub vol_window: Option<i64>,

    /// Jump threshold in percentage points (floor 0).
    #[arg(long, allow_negative_numbers = true)]
    pub jump_threshold: Option<f64>,

    /// Flat-run epsilon in rate units (floor 0).
    #[arg(long, allow_negative_numbers = true)]
    pub flat_epsilon: Option<f64>,

    /// Trailing slope window for drift (clamped to 7..=60).
    #[arg(long, allow_negative_numbers = true)]
    pub slope_window: Option<i64>,

    /// Drift slope threshold in %/day (floor 0).
    #[arg(long, allow_negative_numbers = true)]
    pub drift_slope: Option<f64>,

    /// Shock threshold in percentage points (floor 0).
    #[arg(long, allow_negative_numbers = true)]
    pub shock_threshold: Option<f64>,

    /// Upper bound of the low volatility bucket (percentage points).
    #[arg(long, allow_negative_numbers = true)]
    pub vol_low: Option<f64>,

    /// Lower bound of the high volatility bucket (percentage points).
    #[arg(long, allow_negative_numbers = true)]
    pub vol_high: Option<f64>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    crate::io::ingest::parse_date(s)
}

fn parse_pair_input(s: &str) -> Result<(String, PathBuf), String> {
    let (pair, path) = s
        .split_once('=')
        .ok_or_else(|| format!("Expected PAIR=CSV, got '{s}'."))?;
    let pair = pair.trim();
    let path = path.trim();
    if pair.is_empty() || path.is_empty() {
        return Err(format!("Expected PAIR=CSV, got '{s}'."));
    }
    Ok((pair.to_string(), PathBuf::from(path)))
}
