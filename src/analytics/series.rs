//! Per-point analytics over an ordered mid-rate series.
//!
//! Every output is positionally aligned with the input: one `PointAnalytics`
//! per `SeriesPoint`, same order, nothing filtered.
//!
//! Numeric conventions:
//! - percentage change is measured against the immediately preceding mid
//! - rolling volatility is the population std dev (divide by `n`)
//! - threshold comparisons are inclusive (`>=`)
//!
//! The input is assumed sorted ascending by date. We do not re-sort here:
//! a caller that passes an unsorted series gets positional (not chronological)
//! analytics.

use crate::analytics::volatility::population_std_dev;
use crate::domain::{AnalyticsOptions, PointAnalytics, SeriesPoint};

/// Compute analytics for every point of `series`.
///
/// Pure and total: non-finite mids propagate into non-finite or absent derived
/// values; they never panic. Non-finite returns are kept out of the volatility
/// history.
pub fn compute_series_analytics(series: &[SeriesPoint], options: AnalyticsOptions) -> Vec<PointAnalytics> {
    let opts = options.normalized();

    let mut out = Vec::with_capacity(series.len());
    let mut returns: Vec<f64> = Vec::with_capacity(series.len());
    let mut flat_run = 0usize;

    for (i, point) in series.iter().enumerate() {
        let prev_mid = i.checked_sub(1).map(|j| series[j].mid);
        let delta = prev_mid.map(|prev| point.mid - prev);

        let pct_delta = match (prev_mid, delta) {
            (Some(prev), Some(d)) if prev != 0.0 => Some((d / prev) * 100.0),
            _ => None,
        };

        flat_run = match delta {
            Some(d) if d.abs() <= opts.flat_epsilon => flat_run + 1,
            _ => 0,
        };

        if let Some(r) = pct_delta.filter(|r| r.is_finite()) {
            returns.push(r);
        }

        let vol_pct = if returns.len() >= opts.vol_window {
            Some(population_std_dev(&returns[returns.len() - opts.vol_window..]))
        } else {
            None
        };

        let is_jump = pct_delta.is_some_and(|r| r.abs() >= opts.jump_threshold_pct);

        out.push(PointAnalytics {
            prev_mid,
            delta,
            pct_delta,
            vol_pct,
            is_jump,
            flat_run,
        });
    }

    out
}

/// Whether the series dates are non-decreasing.
pub fn is_sorted_by_date(series: &[SeriesPoint]) -> bool {
    series.windows(2).all(|w| w[0].date <= w[1].date)
}
