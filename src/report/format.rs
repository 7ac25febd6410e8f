//! Plain-text formatting of pipeline runs.
//!
//! We keep formatting code in one place so:
//! - analytics and classification code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::{PipelineOutput, PointSummary};
use crate::config::PipelineConfig;

/// Format the run header, per-day table, and regime segments.
pub fn format_run_report(pair: &str, output: &PipelineOutput, config: &PipelineConfig) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== fxr - {pair} fixing regimes ===\n"));
    match (output.series.first(), output.series.last()) {
        (Some(first), Some(last)) => out.push_str(&format!(
            "Window: {} .. {} | points={}\n",
            first.date,
            last.date,
            output.len()
        )),
        _ => out.push_str("Window: (empty)\n"),
    }
    out.push_str(&format!(
        "Manual fixings: {} | overrides: {}\n",
        output.annotation_index.manual_count(),
        output.annotation_index.override_count()
    ));
    let config = config.normalized();
    out.push_str(&format!(
        "Settings: vol_window={} jump>={:.2}% slope_window={} drift>={:.3}%/d shock>={:.2}% vol buckets <{:.2}/<{:.2}\n\n",
        config.analytics.vol_window,
        config.analytics.jump_threshold_pct,
        config.regime.slope_window,
        config.regime.drift_slope_abs_pct_per_day,
        config.regime.shock_jump_threshold_pct,
        config.buckets.low_max_pct,
        config.buckets.high_min_pct,
    ));

    out.push_str(&format_table(&output.summaries()));
    out.push('\n');
    out.push_str(&format_segments(output));
    out
}

fn format_table(rows: &[PointSummary]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>12} {:>10} {:>8} {:>7} {:<8} {:<12} {:<6} {:<1}\n",
            "date", "mid", "delta", "pct", "vol", "bucket", "regime", "conf", "m"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<12} {:-<10} {:-<8} {:-<7} {:-<8} {:-<12} {:-<6} {:-<1}\n",
            "", "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        let marker = if r.has_manual_override {
            "O"
        } else if r.has_manual_fixing {
            "M"
        } else {
            ""
        };
        let line = format!(
            "{:<10} {:>12.4} {:>10} {:>8} {:>7} {:<8} {:<12} {:<6} {}",
            r.date,
            r.mid,
            fmt_opt(r.delta, 4),
            fmt_opt(r.pct_delta, 2),
            fmt_opt(r.vol_pct, 3),
            r.vol_bucket.as_str(),
            r.regime_label,
            r.confidence.as_str(),
            marker,
        );
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

fn format_segments(output: &PipelineOutput) -> String {
    let mut out = String::from("Regime segments:\n");
    if output.segments.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    for seg in &output.segments {
        let from = output.series[seg.from_index].date;
        let to = output.series[seg.to_index].date;
        out.push_str(&format!(
            "  {:<12} {} .. {} ({} pts)\n",
            seg.key.display_name(),
            from,
            to,
            seg.span()
        ));
    }
    out
}

/// Explain a single point (used for `--date`).
pub fn format_point_summary(summary: &PointSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} (index {})\n", summary.date, summary.index));
    out.push_str(&format!("- mid: {:.4}\n", summary.mid));
    out.push_str(&format!(
        "- change: {} ({}%)\n",
        fmt_opt(summary.delta, 4),
        fmt_opt(summary.pct_delta, 3)
    ));
    out.push_str(&format!(
        "- volatility: {}% ({})\n",
        fmt_opt(summary.vol_pct, 3),
        summary.vol_bucket.as_str()
    ));
    out.push_str(&format!("- regime: {} - {}\n", summary.regime_label, summary.regime_reason));
    out.push_str(&format!(
        "- confidence: {} - {}\n",
        summary.confidence_label,
        summary.confidence_reasons.join("; ")
    ));
    if summary.has_manual_fixing {
        out.push_str(&format!(
            "- manual {}: {}{}\n",
            if summary.has_manual_override { "override" } else { "fixing" },
            summary.manual_mid.map(|m| format!("{m:.4}")).unwrap_or_default(),
            summary
                .manual_notes
                .as_deref()
                .map(|n| format!(" ({n})"))
                .unwrap_or_default()
        ));
    }
    out
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:+.decimals$}"),
        Some(_) => "nan".to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::NaiveDate;

    use super::*;
    use crate::app::pipeline::run_pipeline;
    use crate::domain::SeriesPoint;

    #[test]
    fn report_lists_each_day_and_segment() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 5, day).unwrap();
        let series = vec![
            SeriesPoint::new(d(5), 4.0),
            SeriesPoint::new(d(6), 4.0),
            SeriesPoint::new(d(7), 4.4),
        ];
        let config = PipelineConfig::default();
        let output = run_pipeline(&series, &HashMap::new(), &config);
        let text = format_run_report("USD/PEN", &output, &config);

        assert!(text.contains("USD/PEN"));
        assert!(text.contains("2025-05-05 .. 2025-05-07"));
        assert!(text.contains("2025-05-07"));
        assert!(text.contains("Shock"));
        assert!(text.contains("Regime segments:"));
        assert!(!text.lines().any(|l| l.ends_with(' ')));
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(fmt_opt(None, 2), "-");
        assert_eq!(fmt_opt(Some(1.5), 2), "+1.50");
        assert_eq!(fmt_opt(Some(f64::NAN), 2), "nan");
    }
}
