//! Priority-ordered regime classification.
//!
//! Each point gets exactly one regime; the first matching rule wins:
//!
//! 1. `Intervention`: a manual override is recorded at this index
//! 2. `Shock`: `|pct_delta| >= shock_jump_threshold_pct`
//! 3. `Drift`: `|trailing slope| >= drift_slope_abs_pct_per_day`
//! 4. `Stable`: volatility bucket is `low`
//! 5. `Unknown`: everything else
//!
//! The trailing slope is the arithmetic mean of valid (finite) `pct_delta`
//! values over the last `slope_window` points ending at the index. It is
//! undefined unless at least `ceil(slope_window * 0.6)` valid values exist.
//! The window sum is recomputed from scratch at every index (O(n * window)).

use crate::domain::{PointAnalytics, RegimeKey, RegimeOptions, RegimePoint, VolBucket};

/// Classify every point.
///
/// `vol_bucket_at` and `has_override_at` are index lookups supplied by the
/// caller; they are only ever called with indices in `0..analytics.len()`.
pub fn classify_regimes<B, O>(
    analytics: &[PointAnalytics],
    vol_bucket_at: B,
    has_override_at: O,
    options: RegimeOptions,
) -> Vec<RegimePoint>
where
    B: Fn(usize) -> VolBucket,
    O: Fn(usize) -> bool,
{
    let opts = options.normalized();
    (0..analytics.len())
        .map(|i| classify_point(analytics, i, vol_bucket_at(i), has_override_at(i), &opts))
        .collect()
}

fn classify_point(
    analytics: &[PointAnalytics],
    index: usize,
    bucket: VolBucket,
    has_override: bool,
    opts: &RegimeOptions,
) -> RegimePoint {
    if has_override {
        return RegimePoint::new(
            RegimeKey::Intervention,
            "Manual override recorded for this date.",
        );
    }

    if let Some(pct) = analytics[index].pct_delta {
        if pct.abs() >= opts.shock_jump_threshold_pct {
            return RegimePoint::new(
                RegimeKey::Shock,
                format!(
                    "Day-over-day move of {pct:+.2}% meets the shock threshold ({:.2}%).",
                    opts.shock_jump_threshold_pct
                ),
            );
        }
    }

    let slope = trailing_slope(analytics, index, opts.slope_window, opts.min_slope_samples());
    if let Some(slope) = slope {
        if slope.abs() >= opts.drift_slope_abs_pct_per_day {
            let direction = if slope >= 0.0 { "upward" } else { "downward" };
            return RegimePoint::new(
                RegimeKey::Drift,
                format!(
                    "Persistent {direction} drift: {}-day mean move {slope:+.3}%/day (threshold {:.3}); {}.",
                    opts.slope_window,
                    opts.drift_slope_abs_pct_per_day,
                    drift_vol_note(bucket)
                ),
            );
        }
    }

    match bucket {
        VolBucket::Low => RegimePoint::new(
            RegimeKey::Stable,
            "Low volatility with no drift or shock signal.",
        ),
        VolBucket::Elevated => RegimePoint::new(
            RegimeKey::Unknown,
            "Elevated volatility without a clear drift or shock signal.",
        ),
        VolBucket::High => RegimePoint::new(
            RegimeKey::Unknown,
            "High volatility without a clear drift or shock signal.",
        ),
        VolBucket::Unknown => RegimePoint::new(
            RegimeKey::Unknown,
            "Insufficient data to classify the regime.",
        ),
    }
}

fn drift_vol_note(bucket: VolBucket) -> &'static str {
    match bucket {
        VolBucket::Low => "volatility low",
        VolBucket::Elevated => "volatility elevated",
        VolBucket::High => "volatility high",
        VolBucket::Unknown => "volatility not yet measurable",
    }
}

/// Mean of valid `pct_delta` values over the window ending at `index`.
///
/// Returns `None` when fewer than `min_samples` valid values are available.
pub fn trailing_slope(
    analytics: &[PointAnalytics],
    index: usize,
    window: usize,
    min_samples: usize,
) -> Option<f64> {
    if index >= analytics.len() || window == 0 {
        return None;
    }
    let start = (index + 1).saturating_sub(window);

    let mut sum = 0.0;
    let mut count = 0usize;
    for a in &analytics[start..=index] {
        if let Some(r) = a.pct_delta.filter(|r| r.is_finite()) {
            sum += r;
            count += 1;
        }
    }

    if count == 0 || count < min_samples {
        return None;
    }
    Some(sum / count as f64)
}
