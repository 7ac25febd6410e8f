//! JSON exports.
//!
//! - per-day rows (analytics + regime + confidence) for chart overlays
//! - a single-point `SummaryPayload` for the commentary generator

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::{PipelineOutput, PointSummary, SummaryPayload};
use crate::config::PipelineConfig;
use crate::domain::RegimeSegment;
use crate::error::AppError;

/// Full run export schema.
#[derive(Debug, Serialize)]
pub struct RunExport<'a> {
    pub tool: &'static str,
    pub pair: &'a str,
    pub config: PipelineConfig,
    pub points: Vec<PointSummary>,
    pub segments: &'a [RegimeSegment],
}

pub fn write_output_json(
    path: &Path,
    pair: &str,
    output: &PipelineOutput,
    config: &PipelineConfig,
) -> Result<(), AppError> {
    let export = RunExport {
        tool: "fxr",
        pair,
        config: config.normalized(),
        points: output.summaries(),
        segments: &output.segments,
    };
    write_json(path, &export)
}

pub fn write_payload_json(path: &Path, payload: &SummaryPayload) -> Result<(), AppError> {
    write_json(path, payload)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| AppError::new(4, format!("Failed to write JSON export: {e}")))?;
    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush JSON export: {e}")))?;
    log::info!("wrote {}", path.display());
    Ok(())
}
