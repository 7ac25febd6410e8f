//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves pipeline settings (defaults, environment, flags)
//! - loads series and annotations
//! - runs the pipeline
//! - prints reports and writes optional exports

use std::collections::HashMap;
use std::path::Path;

use clap::Parser;

use crate::cli::{AnalyzeArgs, BatchArgs, Command, DemoArgs, TunableArgs};
use crate::config::PipelineConfig;
use crate::data::{SampleSpec, generate_series};
use crate::error::AppError;
use crate::io::ingest::{load_annotations, load_series};

pub mod pipeline;

use pipeline::{PairInput, run_batch, run_pipeline};

/// Entry point for the `fxr` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    let base = PipelineConfig::from_env()?;

    match cli.command {
        Command::Analyze(args) => handle_analyze(args, base),
        Command::Batch(args) => handle_batch(args, base),
        Command::Demo(args) => handle_demo(args, base),
    }
}

fn handle_analyze(args: AnalyzeArgs, base: PipelineConfig) -> Result<(), AppError> {
    let config = apply_tunables(base, &args.tunables);

    let ingest = load_series(&args.series)?;
    log::info!(
        "{}: {} of {} rows usable",
        args.pair,
        ingest.points.len(),
        ingest.rows_read
    );
    let annotations = match &args.annotations {
        Some(path) => load_annotations(path)?.by_date,
        None => HashMap::new(),
    };

    let output = run_pipeline(&ingest.points, &annotations, &config);

    if !args.quiet {
        println!("{}", crate::report::format_run_report(&args.pair, &output, &config));
    }

    let selected = match args.date {
        Some(date) => Some(output.summary_for_date(date).ok_or_else(|| {
            AppError::new(2, format!("Date {date} is not present in the series."))
        })?),
        None => output.latest_summary(),
    };

    if args.date.is_some() {
        if let Some(summary) = &selected {
            println!("{}", crate::report::format_point_summary(summary));
        }
    }

    if let Some(path) = &args.export {
        crate::io::export::write_output_json(path, &args.pair, &output, &config)?;
    }
    if let Some(path) = &args.export_summary {
        let summary = selected.ok_or_else(|| AppError::new(3, "No points available for a summary."))?;
        let payload = output.payload(&args.pair, summary);
        crate::io::export::write_payload_json(path, &payload)?;
    }

    Ok(())
}

fn handle_batch(args: BatchArgs, base: PipelineConfig) -> Result<(), AppError> {
    let config = apply_tunables(base, &args.tunables);

    let mut annotation_paths: HashMap<&str, &Path> = HashMap::new();
    for (pair, path) in &args.annotations {
        annotation_paths.insert(pair.as_str(), path.as_path());
    }

    let mut inputs = Vec::with_capacity(args.inputs.len());
    for (pair, path) in &args.inputs {
        let series = load_series(path)?.points;
        let annotations = match annotation_paths.get(pair.as_str()) {
            Some(p) => load_annotations(p)?.by_date,
            None => HashMap::new(),
        };
        inputs.push(PairInput {
            pair: pair.clone(),
            series,
            annotations,
        });
    }

    for (pair, output) in run_batch(&inputs, &config) {
        println!("{}", crate::report::format_run_report(&pair, &output, &config));
    }
    Ok(())
}

fn handle_demo(args: DemoArgs, base: PipelineConfig) -> Result<(), AppError> {
    let config = apply_tunables(base, &args.tunables);
    let spec = SampleSpec {
        pair: args.pair.clone(),
        start: args.start,
        days: args.days,
        level: args.level,
        daily_vol_pct: args.vol,
        drift_pct_per_day: args.drift,
        jump_prob: args.jump_prob,
        jump_size_pct: args.jump_size,
        manual_prob: args.manual_prob,
        override_prob: args.override_prob,
        seed: args.seed,
    };
    let sample = generate_series(&spec)?;
    let output = run_pipeline(&sample.series, &sample.annotations, &config);

    println!("{}", crate::report::format_run_report(&sample.pair, &output, &config));

    if let Some(path) = &args.export {
        crate::io::export::write_output_json(path, &sample.pair, &output, &config)?;
    }
    Ok(())
}

/// Layer command-line tunables over an already-resolved config.
pub fn apply_tunables(base: PipelineConfig, args: &TunableArgs) -> PipelineConfig {
    let mut config = base;
    if let Some(v) = args.vol_window {
        config.analytics.vol_window = window_from_i64(v);
    }
    if let Some(v) = args.jump_threshold {
        config.analytics.jump_threshold_pct = v;
    }
    if let Some(v) = args.flat_epsilon {
        config.analytics.flat_epsilon = v;
    }
    if let Some(v) = args.slope_window {
        config.regime.slope_window = window_from_i64(v);
    }
    if let Some(v) = args.drift_slope {
        config.regime.drift_slope_abs_pct_per_day = v;
    }
    if let Some(v) = args.shock_threshold {
        config.regime.shock_jump_threshold_pct = v;
    }
    if let Some(v) = args.vol_low {
        config.buckets.low_max_pct = v;
    }
    if let Some(v) = args.vol_high {
        config.buckets.high_min_pct = v;
    }
    config.normalized()
}

fn window_from_i64(v: i64) -> usize {
    usize::try_from(v.max(0)).unwrap_or(usize::MAX)
}
