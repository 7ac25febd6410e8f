//! Synthetic fixing series for demos and smoke runs.
//!
//! The generator is a seeded random walk in percentage returns with optional
//! drift and occasional jumps, plus randomly placed operator annotations.
//! The same `SampleSpec` (seed included) always produces the same series.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{ManualAnnotation, SeriesPoint};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct SampleSpec {
    pub pair: String,
    pub start: NaiveDate,
    /// Number of business days to generate.
    pub days: usize,
    pub level: f64,
    /// Std dev of daily returns, in percentage points.
    pub daily_vol_pct: f64,
    /// Mean daily return, in percentage points.
    pub drift_pct_per_day: f64,
    pub jump_prob: f64,
    /// Jump magnitude in percentage points (sign is random).
    pub jump_size_pct: f64,
    /// Probability that a day carries a manual (non-override) fixing.
    pub manual_prob: f64,
    /// Probability that a day carries a manual override.
    pub override_prob: f64,
    pub seed: u64,
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            pair: "USD/MXN".to_string(),
            start: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap_or_default(),
            days: 120,
            level: 17.0,
            daily_vol_pct: 0.35,
            drift_pct_per_day: 0.0,
            jump_prob: 0.02,
            jump_size_pct: 6.0,
            manual_prob: 0.03,
            override_prob: 0.02,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleSeries {
    pub pair: String,
    pub series: Vec<SeriesPoint>,
    pub annotations: HashMap<NaiveDate, ManualAnnotation>,
}

pub fn generate_series(spec: &SampleSpec) -> Result<SampleSeries, AppError> {
    if !(spec.level.is_finite() && spec.level > 0.0) {
        return Err(AppError::new(2, "Sample level must be finite and > 0."));
    }
    if !(spec.daily_vol_pct.is_finite() && spec.daily_vol_pct >= 0.0) {
        return Err(AppError::new(2, "Sample volatility must be finite and >= 0."));
    }
    if !spec.drift_pct_per_day.is_finite() || !(spec.jump_size_pct.is_finite() && spec.jump_size_pct >= 0.0) {
        return Err(AppError::new(2, "Invalid drift or jump size settings."));
    }
    for (name, p) in [
        ("jump", spec.jump_prob),
        ("manual", spec.manual_prob),
        ("override", spec.override_prob),
    ] {
        if !(0.0..=1.0).contains(&p) {
            return Err(AppError::new(2, format!("Invalid {name} probability: {p} (expected 0..=1).")));
        }
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(spec.drift_pct_per_day, spec.daily_vol_pct)
        .map_err(|e| AppError::new(2, format!("Return distribution error: {e}")))?;

    let mut series = Vec::with_capacity(spec.days);
    let mut annotations = HashMap::new();
    let mut mid = spec.level;
    let mut date = next_business_day(spec.start);

    for i in 0..spec.days {
        if i > 0 {
            date = next_business_day(date + Duration::days(1));
            let ret = normal.sample(&mut rng) + sample_jump(&mut rng, spec.jump_prob, spec.jump_size_pct);
            // A return at or below -100% would make the rate non-positive.
            mid *= (1.0 + ret / 100.0).max(0.01);
        }
        series.push(SeriesPoint::new(date, mid));

        let roll: f64 = rng.r#gen();
        if roll < spec.override_prob {
            annotations.insert(date, synthetic_annotation(&mut rng, date, mid, true));
        } else if roll < spec.override_prob + spec.manual_prob {
            annotations.insert(date, synthetic_annotation(&mut rng, date, mid, false));
        }
    }

    log::debug!(
        "generated {} synthetic points for {} ({} annotations, seed {})",
        series.len(),
        spec.pair,
        annotations.len(),
        spec.seed
    );

    Ok(SampleSeries {
        pair: spec.pair.clone(),
        series,
        annotations,
    })
}

fn sample_jump(rng: &mut StdRng, prob: f64, size_pct: f64) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll >= prob {
        return 0.0;
    }
    if rng.r#gen::<bool>() { size_pct } else { -size_pct }
}

fn synthetic_annotation(rng: &mut StdRng, date: NaiveDate, mid: f64, is_override: bool) -> ManualAnnotation {
    // Operator fixings land within a few basis points of the official mid.
    let bump: f64 = rng.gen_range(-0.0005..=0.0005);
    ManualAnnotation {
        date,
        mid: mid * (1.0 + bump),
        is_official: !is_override,
        is_manual_override: is_override,
        notes: Some(if is_override { "synthetic override" } else { "synthetic manual fixing" }.to_string()),
        created_at: date.and_hms_opt(18, 0, 0).map(|dt| dt.and_utc()),
        created_by: Some("demo".to_string()),
    }
}

fn next_business_day(mut date: NaiveDate) -> NaiveDate {
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}
