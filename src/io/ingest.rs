//! CSV ingest and normalization.
//!
//! This module turns exported fixing histories and operator annotation sheets
//! into clean in-memory inputs for the pipeline.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior**: rows are sorted by date and duplicates resolved
//!   by a fixed rule
//! - **Separation of concerns**: no analytics here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use csv::StringRecord;

use crate::domain::{ManualAnnotation, SeriesPoint};
use crate::error::AppError;

/// Accepted column names for the mid-rate, in priority order.
const MID_COLUMNS: [&str; 3] = ["mid", "rate", "value"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingested fixing series: sorted points + row diagnostics.
#[derive(Debug, Clone)]
pub struct IngestedSeries {
    pub points: Vec<SeriesPoint>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Ingested annotations keyed by date.
#[derive(Debug, Clone, Default)]
pub struct IngestedAnnotations {
    pub by_date: HashMap<NaiveDate, ManualAnnotation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

pub fn load_series(path: &Path) -> Result<IngestedSeries, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open series CSV '{}': {e}", path.display())))?;
    read_series(file)
}

pub fn load_annotations(path: &Path) -> Result<IngestedAnnotations, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open annotations CSV '{}': {e}", path.display())))?;
    read_annotations(file)
}

/// Parse a `date,mid` series from any reader.
///
/// Rows are sorted ascending by date. A repeated date keeps the later row and
/// records a row error for the earlier one.
pub fn read_series<R: Read>(input: R) -> Result<IngestedSeries, AppError> {
    let mut reader = csv_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read series CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    if !header_map.contains_key("date") {
        return Err(AppError::new(2, "Missing required column: `date`"));
    }
    let mid_column = MID_COLUMNS
        .iter()
        .copied()
        .find(|c| header_map.contains_key(*c))
        .ok_or_else(|| AppError::new(2, "Missing required column: `mid` (or `rate` / `value`)"))?;

    let mut by_date: HashMap<NaiveDate, (usize, f64)> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1, records are 1-based after it.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_series_row(&record, &header_map, mid_column) {
            Ok(point) => {
                if let Some((prev_line, _)) = by_date.insert(point.date, (line, point.mid)) {
                    row_errors.push(RowError {
                        line: prev_line,
                        message: format!("Duplicate date {}; superseded by line {line}.", point.date),
                    });
                }
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if by_date.is_empty() {
        return Err(AppError::new(3, "No valid series rows remain after validation."));
    }

    let mut points: Vec<SeriesPoint> = by_date
        .into_iter()
        .map(|(date, (_, mid))| SeriesPoint::new(date, mid))
        .collect();
    points.sort_by_key(|p| p.date);

    for err in &row_errors {
        log::warn!("series line {}: {}", err.line, err.message);
    }

    Ok(IngestedSeries {
        points,
        row_errors,
        rows_read,
    })
}

/// Parse operator annotations from any reader.
///
/// When a date appears twice, the annotation with the later `created_at` wins
/// (a missing timestamp sorts before any timestamp; ties keep the later row).
pub fn read_annotations<R: Read>(input: R) -> Result<IngestedAnnotations, AppError> {
    let mut reader = csv_reader(input);
    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read annotations CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["date", "mid"] {
        if !header_map.contains_key(required) {
            return Err(AppError::new(2, format!("Missing required annotation column: `{required}`")));
        }
    }

    let mut by_date: HashMap<NaiveDate, ManualAnnotation> = HashMap::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let annotation = match parse_annotation_row(&record, &header_map) {
            Ok(a) => a,
            Err(message) => {
                row_errors.push(RowError { line, message });
                continue;
            }
        };

        let replace = by_date
            .get(&annotation.date)
            .is_none_or(|existing| annotation.created_at >= existing.created_at);
        if replace {
            by_date.insert(annotation.date, annotation);
        }
    }

    for err in &row_errors {
        log::warn!("annotations line {}: {}", err.line, err.message);
    }

    Ok(IngestedAnnotations {
        by_date,
        row_errors,
        rows_read,
    })
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn parse_series_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    mid_column: &str,
) -> Result<SeriesPoint, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let mid = parse_mid(get_required(record, header_map, mid_column)?)?;
    Ok(SeriesPoint::new(date, mid))
}

fn parse_annotation_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<ManualAnnotation, String> {
    let date = parse_date(get_required(record, header_map, "date")?)?;
    let mid = parse_mid(get_required(record, header_map, "mid")?)?;

    let is_official = get_optional(record, header_map, "is_official")
        .map(parse_bool)
        .transpose()?
        .unwrap_or(false);
    let is_manual_override = get_optional(record, header_map, "is_manual_override")
        .map(parse_bool)
        .transpose()?
        .unwrap_or(false);

    let created_at = get_optional(record, header_map, "created_at")
        .map(parse_timestamp)
        .transpose()?;

    Ok(ManualAnnotation {
        date,
        mid,
        is_official,
        is_manual_override,
        notes: get_optional(record, header_map, "notes").map(str::to_string),
        created_at,
        created_by: get_optional(record, header_map, "created_by").map(str::to_string),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn parse_mid(s: &str) -> Result<f64, String> {
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid mid-rate '{s}'."))?;
    if !(v.is_finite() && v > 0.0) {
        return Err(format!("Mid-rate must be finite and positive, got '{s}'."));
    }
    Ok(v)
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Ok(true),
        "false" | "f" | "0" | "no" | "n" => Ok(false),
        _ => Err(format!("Invalid boolean '{s}'.")),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("Invalid created_at '{s}' (expected RFC 3339): {e}"))
}
