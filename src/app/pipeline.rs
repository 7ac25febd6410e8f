//! Shared pipeline logic used by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! analytics -> volatility buckets -> regimes -> segments -> confidence
//!
//! Everything here is computed fresh per call; nothing is cached between runs.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::analytics::{compute_series_analytics, is_sorted_by_date, vol_buckets};
use crate::annotations::AnnotationIndex;
use crate::config::PipelineConfig;
use crate::confidence::score_series;
use crate::domain::{
    ConfidenceLevel, ConfidenceResult, ManualAnnotation, PointAnalytics, RegimeKey, RegimePoint, RegimeSegment,
    SeriesPoint, VolBucket,
};
use crate::regime::{build_regime_segments, classify_regimes, regime_counts};

/// All computed outputs of one pipeline run, positionally aligned with `series`.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub series: Vec<SeriesPoint>,
    pub analytics: Vec<PointAnalytics>,
    pub vol_buckets: Vec<VolBucket>,
    pub regimes: Vec<RegimePoint>,
    pub segments: Vec<RegimeSegment>,
    pub confidence: Vec<ConfidenceResult>,
    pub annotations: HashMap<NaiveDate, ManualAnnotation>,
    pub annotation_index: AnnotationIndex,
}

/// Flattened per-point view of a pipeline run.
///
/// This is the unit exported as JSON and embedded into commentary payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSummary {
    pub index: usize,
    pub date: NaiveDate,
    pub mid: f64,
    pub delta: Option<f64>,
    pub pct_delta: Option<f64>,
    pub vol_pct: Option<f64>,
    pub vol_bucket: VolBucket,
    pub is_jump: bool,
    pub flat_run: usize,
    pub regime: RegimeKey,
    pub regime_label: String,
    pub regime_reason: String,
    pub confidence: ConfidenceLevel,
    pub confidence_label: String,
    pub confidence_reasons: Vec<String>,
    pub has_manual_fixing: bool,
    pub has_manual_override: bool,
    pub manual_mid: Option<f64>,
    pub manual_notes: Option<String>,
}

/// Request body for an external commentary generator.
///
/// This crate only builds and serializes it.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryPayload {
    pub pair: String,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
    pub points: usize,
    pub point: PointSummary,
    pub segments: Vec<RegimeSegment>,
    pub regime_counts: BTreeMap<&'static str, usize>,
}

/// One currency pair's inputs for a batch run.
#[derive(Debug, Clone)]
pub struct PairInput {
    pub pair: String,
    pub series: Vec<SeriesPoint>,
    pub annotations: HashMap<NaiveDate, ManualAnnotation>,
}

/// Run analytics, classification, and scoring over one series.
///
/// The series is expected in ascending date order; it is not re-sorted.
pub fn run_pipeline(
    series: &[SeriesPoint],
    annotations: &HashMap<NaiveDate, ManualAnnotation>,
    config: &PipelineConfig,
) -> PipelineOutput {
    let config = config.normalized();
    if !is_sorted_by_date(series) {
        log::warn!("series is not sorted ascending by date; analytics follow input order");
    }

    let analytics = compute_series_analytics(series, config.analytics);
    let buckets = vol_buckets(&analytics, config.buckets);
    let index = AnnotationIndex::build(series, annotations);

    let regimes = classify_regimes(
        &analytics,
        |i| buckets[i],
        |i| index.has_override(i),
        config.regime,
    );
    let segments = build_regime_segments(&regimes);
    let confidence = score_series(
        &analytics,
        &buckets,
        &regimes,
        |i| index.has_manual(i),
        |i| index.has_override(i),
    );

    log::debug!(
        "pipeline: points={} manual={} overrides={} segments={}",
        series.len(),
        index.manual_count(),
        index.override_count(),
        segments.len()
    );

    PipelineOutput {
        series: series.to_vec(),
        analytics,
        vol_buckets: buckets,
        regimes,
        segments,
        confidence,
        annotations: annotations.clone(),
        annotation_index: index,
    }
}

/// Run the pipeline for several pairs in parallel, preserving input order.
pub fn run_batch(inputs: &[PairInput], config: &PipelineConfig) -> Vec<(String, PipelineOutput)> {
    inputs
        .par_iter()
        .map(|input| {
            (
                input.pair.clone(),
                run_pipeline(&input.series, &input.annotations, config),
            )
        })
        .collect()
}

impl PipelineOutput {
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn summary_at(&self, index: usize) -> Option<PointSummary> {
        let point = self.series.get(index)?;
        let a = self.analytics.get(index)?;
        let regime = self.regimes.get(index)?;
        let confidence = self.confidence.get(index)?;
        let annotation = self.annotations.get(&point.date);

        Some(PointSummary {
            index,
            date: point.date,
            mid: point.mid,
            delta: a.delta,
            pct_delta: a.pct_delta,
            vol_pct: a.vol_pct,
            vol_bucket: self.vol_buckets.get(index).copied().unwrap_or(VolBucket::Unknown),
            is_jump: a.is_jump,
            flat_run: a.flat_run,
            regime: regime.key,
            regime_label: regime.label.clone(),
            regime_reason: regime.reason.clone(),
            confidence: confidence.level,
            confidence_label: confidence.label.clone(),
            confidence_reasons: confidence.reasons.clone(),
            has_manual_fixing: self.annotation_index.has_manual(index),
            has_manual_override: self.annotation_index.has_override(index),
            manual_mid: annotation.map(|n| n.mid),
            manual_notes: annotation.and_then(|n| n.notes.clone()),
        })
    }

    /// Summary of the last point on `date` (series dates are expected unique).
    pub fn summary_for_date(&self, date: NaiveDate) -> Option<PointSummary> {
        let index = self.series.iter().rposition(|p| p.date == date)?;
        self.summary_at(index)
    }

    pub fn latest_summary(&self) -> Option<PointSummary> {
        self.len().checked_sub(1).and_then(|i| self.summary_at(i))
    }

    pub fn summaries(&self) -> Vec<PointSummary> {
        (0..self.len()).filter_map(|i| self.summary_at(i)).collect()
    }

    pub fn payload(&self, pair: &str, point: PointSummary) -> SummaryPayload {
        SummaryPayload {
            pair: pair.to_string(),
            window_start: self.series.first().map(|p| p.date),
            window_end: self.series.last().map(|p| p.date),
            points: self.len(),
            point,
            segments: self.segments.clone(),
            regime_counts: regime_counts(&self.regimes),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 3).unwrap() + Duration::days(offset)
    }

    fn series(mids: &[f64]) -> Vec<SeriesPoint> {
        mids.iter()
            .enumerate()
            .map(|(i, &m)| SeriesPoint::new(day(i as i64), m))
            .collect()
    }

    #[test]
    fn outputs_are_aligned_and_override_wins() {
        let s = series(&[20.0, 20.1, 22.0, 22.05, 22.0]);
        let mut notes = HashMap::new();
        notes.insert(
            day(2),
            ManualAnnotation {
                date: day(2),
                mid: 21.9,
                is_official: false,
                is_manual_override: true,
                notes: Some("desk correction".to_string()),
                created_at: None,
                created_by: Some("ops".to_string()),
            },
        );

        let out = run_pipeline(&s, &notes, &PipelineConfig::default());
        assert_eq!(out.analytics.len(), 5);
        assert_eq!(out.regimes.len(), 5);
        assert_eq!(out.confidence.len(), 5);
        assert_eq!(out.vol_buckets.len(), 5);

        // +9.45% move with an override recorded.
        assert_eq!(out.regimes[2].key, RegimeKey::Intervention);
        assert_eq!(out.confidence[2].level, ConfidenceLevel::Low);

        let summary = out.summary_for_date(day(2)).unwrap();
        assert!(summary.has_manual_override);
        assert_eq!(summary.manual_mid, Some(21.9));
        assert_eq!(summary.manual_notes.as_deref(), Some("desk correction"));
        assert_eq!(summary.regime_label, "Intervention");
    }

    #[test]
    fn empty_series_gives_empty_outputs() {
        let out = run_pipeline(&[], &HashMap::new(), &PipelineConfig::default());
        assert!(out.is_empty());
        assert!(out.segments.is_empty());
        assert!(out.confidence.is_empty());
        assert!(out.latest_summary().is_none());
    }

    #[test]
    fn payload_carries_window_and_counts() {
        let out = run_pipeline(&series(&[1.0, 1.0, 1.0]), &HashMap::new(), &PipelineConfig::default());
        let point = out.latest_summary().unwrap();
        let payload = out.payload("USD/MXN", point);
        assert_eq!(payload.window_start, Some(day(0)));
        assert_eq!(payload.window_end, Some(day(2)));
        assert_eq!(payload.points, 3);
        let total: usize = payload.regime_counts.values().sum();
        assert_eq!(total, 3);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["pair"], "USD/MXN");
        assert_eq!(json["point"]["index"], 2);
    }

    #[test]
    fn batch_preserves_input_order() {
        let inputs: Vec<PairInput> = ["USD/BRL", "USD/CLP", "USD/COP"]
            .iter()
            .enumerate()
            .map(|(k, pair)| PairInput {
                pair: pair.to_string(),
                series: series(&vec![1.0 + k as f64; k + 2]),
                annotations: HashMap::new(),
            })
            .collect();
        let results = run_batch(&inputs, &PipelineConfig::default());
        let pairs: Vec<&str> = results.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(pairs, vec!["USD/BRL", "USD/CLP", "USD/COP"]);
        assert_eq!(results[2].1.len(), 4);
    }
}
