//! Volatility helpers.
//!
//! - population standard deviation of a return window
//! - mapping rolling volatility into coarse buckets used by the classifier

use crate::domain::{PointAnalytics, VolBucket, VolBucketThresholds};

/// Population standard deviation (divides by `n`, not `n - 1`).
///
/// Returns `0.0` for an empty slice.
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Classify a rolling volatility reading.
///
/// Absent or non-finite readings map to `Unknown`.
pub fn classify_vol_bucket(vol_pct: Option<f64>, thresholds: VolBucketThresholds) -> VolBucket {
    let t = thresholds.normalized();
    match vol_pct {
        Some(v) if v.is_finite() => {
            if v < t.low_max_pct {
                VolBucket::Low
            } else if v < t.high_min_pct {
                VolBucket::Elevated
            } else {
                VolBucket::High
            }
        }
        _ => VolBucket::Unknown,
    }
}

/// Bucket every point of an analytics sequence.
pub fn vol_buckets(analytics: &[PointAnalytics], thresholds: VolBucketThresholds) -> Vec<VolBucket> {
    analytics
        .iter()
        .map(|a| classify_vol_bucket(a.vol_pct, thresholds))
        .collect()
}
