use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use fx_regimes::analytics::compute_series_analytics;
use fx_regimes::data::{SampleSpec, generate_series};
use fx_regimes::domain::{
    AnalyticsOptions, ConfidenceLevel, ManualAnnotation, RegimeKey, SeriesPoint, VolBucket,
};
use fx_regimes::regime::segments_from_keys;
use fx_regimes::{PairInput, PipelineConfig, run_batch, run_pipeline};

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap() + Duration::days(offset)
}

fn series(mids: &[f64]) -> Vec<SeriesPoint> {
    mids.iter()
        .enumerate()
        .map(|(i, &m)| SeriesPoint::new(day(i as i64), m))
        .collect()
}

fn override_on(date: NaiveDate, mid: f64) -> ManualAnnotation {
    ManualAnnotation {
        date,
        mid,
        is_official: false,
        is_manual_override: true,
        notes: Some("central bank intervention".to_string()),
        created_at: None,
        created_by: Some("ops".to_string()),
    }
}

#[test]
fn every_output_is_parallel_to_the_series() {
    let sample = generate_series(&SampleSpec {
        days: 90,
        ..SampleSpec::default()
    })
    .unwrap();
    let out = run_pipeline(&sample.series, &sample.annotations, &PipelineConfig::default());

    assert_eq!(out.analytics.len(), sample.series.len());
    assert_eq!(out.regimes.len(), sample.series.len());
    assert_eq!(out.confidence.len(), sample.series.len());
    assert_eq!(out.summaries().len(), sample.series.len());

    let covered: usize = out.segments.iter().map(|s| s.span()).sum();
    assert_eq!(covered, sample.series.len());
    for w in out.segments.windows(2) {
        assert_eq!(w[0].to_index + 1, w[1].from_index);
        assert_ne!(w[0].key, w[1].key);
    }
}

#[test]
fn fixture_deltas_match_hand_computation() {
    let out = compute_series_analytics(&series(&[100.0, 105.0, 100.0]), AnalyticsOptions::default());
    let deltas: Vec<Option<f64>> = out.iter().map(|a| a.delta).collect();
    assert_eq!(deltas, vec![None, Some(5.0), Some(-5.0)]);
    assert_eq!(out[0].pct_delta, None);
    assert!((out[2].pct_delta.unwrap() - (-4.761_904_761_904_762)).abs() < 1e-12);
}

#[test]
fn override_plus_shock_is_intervention_and_low_confidence() {
    let s = series(&[10.0, 10.01, 10.02, 11.5, 11.49]);
    let mut notes = HashMap::new();
    notes.insert(day(3), override_on(day(3), 11.4));

    let out = run_pipeline(&s, &notes, &PipelineConfig::default());
    assert!(out.analytics[3].is_jump);
    assert_eq!(out.regimes[3].key, RegimeKey::Intervention);
    assert_eq!(out.confidence[3].level, ConfidenceLevel::Low);
    assert_eq!(out.confidence[3].reasons, vec!["manual override recorded"]);
}

#[test]
fn every_override_scores_low() {
    let sample = generate_series(&SampleSpec {
        days: 200,
        override_prob: 0.1,
        ..SampleSpec::default()
    })
    .unwrap();
    let out = run_pipeline(&sample.series, &sample.annotations, &PipelineConfig::default());

    let mut overrides = 0;
    for (i, p) in sample.series.iter().enumerate() {
        if sample.annotations.get(&p.date).is_some_and(|a| a.is_manual_override) {
            overrides += 1;
            assert_eq!(out.regimes[i].key, RegimeKey::Intervention);
            assert_eq!(out.confidence[i].level, ConfidenceLevel::Low);
        }
    }
    assert!(overrides > 0);
}

#[test]
fn quiet_market_reaches_high_confidence() {
    // Tiny alternating moves: low volatility, no drift, no jumps.
    let mids: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 20.0 } else { 20.01 }).collect();
    let out = run_pipeline(&series(&mids), &HashMap::new(), &PipelineConfig::default());

    let last = out.latest_summary().unwrap();
    assert_eq!(last.vol_bucket, VolBucket::Low);
    assert_eq!(last.regime, RegimeKey::Stable);
    assert_eq!(last.confidence, ConfidenceLevel::High);
    assert_eq!(last.confidence_reasons, vec!["stable analytics profile"]);

    // Early points carry limited history.
    assert_eq!(out.confidence[3].level, ConfidenceLevel::Medium);
}

#[test]
fn steady_depreciation_classifies_as_drift() {
    let mut mids = vec![18.0];
    for _ in 0..29 {
        let next = mids[mids.len() - 1] * 1.001;
        mids.push(next);
    }
    let out = run_pipeline(&series(&mids), &HashMap::new(), &PipelineConfig::default());
    assert_eq!(out.regimes[29].key, RegimeKey::Drift);
    assert!(out.regimes[29].reason.contains("volatility low"));
}

#[test]
fn segments_of_mixed_keys() {
    use RegimeKey::{Shock, Stable};
    let segs = segments_from_keys([Stable, Stable, Shock, Shock, Shock, Stable]);
    let ranges: Vec<(usize, usize, RegimeKey)> = segs.iter().map(|s| (s.from_index, s.to_index, s.key)).collect();
    assert_eq!(ranges, vec![(0, 1, Stable), (2, 4, Shock), (5, 5, Stable)]);
}

#[test]
fn pipeline_is_deterministic() {
    let sample = generate_series(&SampleSpec::default()).unwrap();
    let config = PipelineConfig::default();
    let a = run_pipeline(&sample.series, &sample.annotations, &config);
    let b = run_pipeline(&sample.series, &sample.annotations, &config);
    assert_eq!(a.analytics, b.analytics);
    assert_eq!(a.regimes, b.regimes);
    assert_eq!(a.confidence, b.confidence);
    assert_eq!(a.segments, b.segments);
}

#[test]
fn out_of_range_config_is_clamped_not_rejected() {
    let mut config = PipelineConfig::default();
    config.analytics.vol_window = 0;
    config.regime.slope_window = 1_000;
    config.regime.drift_slope_abs_pct_per_day = -5.0;

    let s = series(&[1.0, 1.01, 1.02, 1.03]);
    let out = run_pipeline(&s, &HashMap::new(), &config);
    // Window clamped to 2: volatility appears once two returns exist.
    assert_eq!(out.analytics[1].vol_pct, None);
    assert!(out.analytics[2].vol_pct.is_some());
}

#[test]
fn batch_matches_individual_runs() {
    let specs = [("USD/BRL", 1u64), ("USD/CLP", 2), ("USD/COP", 3), ("USD/PEN", 4)];
    let inputs: Vec<PairInput> = specs
        .iter()
        .map(|(pair, seed)| {
            let sample = generate_series(&SampleSpec {
                pair: pair.to_string(),
                seed: *seed,
                ..SampleSpec::default()
            })
            .unwrap();
            PairInput {
                pair: sample.pair,
                series: sample.series,
                annotations: sample.annotations,
            }
        })
        .collect();

    let config = PipelineConfig::default();
    let results = run_batch(&inputs, &config);
    assert_eq!(results.len(), inputs.len());
    for (input, (pair, output)) in inputs.iter().zip(&results) {
        assert_eq!(&input.pair, pair);
        let single = run_pipeline(&input.series, &input.annotations, &config);
        assert_eq!(single.regimes, output.regimes);
        assert_eq!(single.confidence, output.confidence);
    }
}
