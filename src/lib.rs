//! `fx-regimes` library crate.
//!
//! Deterministic analytics over a daily FX fixing series: day-over-day
//! changes, rolling volatility, jump and flat-run flags, a regime label per
//! day, and an explainable confidence verdict per day.
//!
//! The binary (`fxr`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can be embedded by a dashboard or commentary service

pub mod analytics;
pub mod annotations;
pub mod app;
pub mod cli;
pub mod confidence;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod regime;
pub mod report;

pub use app::pipeline::{PairInput, PipelineOutput, PointSummary, SummaryPayload, run_batch, run_pipeline};
pub use config::PipelineConfig;
