//! Pipeline tunables: defaults, environment overrides, clamping.
//!
//! Precedence (lowest to highest): built-in defaults, `.env` / process
//! environment, command-line flags. Values that parse but fall outside their
//! valid range are clamped silently; values that do not parse are errors.

use crate::domain::{AnalyticsOptions, RegimeOptions, VolBucketThresholds};
use crate::error::AppError;

pub const ENV_VOL_WINDOW: &str = "FXR_VOL_WINDOW";
pub const ENV_JUMP_THRESHOLD_PCT: &str = "FXR_JUMP_THRESHOLD_PCT";
pub const ENV_FLAT_EPSILON: &str = "FXR_FLAT_EPSILON";
pub const ENV_SLOPE_WINDOW: &str = "FXR_SLOPE_WINDOW";
pub const ENV_DRIFT_SLOPE_PCT: &str = "FXR_DRIFT_SLOPE_PCT";
pub const ENV_SHOCK_THRESHOLD_PCT: &str = "FXR_SHOCK_THRESHOLD_PCT";
pub const ENV_VOL_LOW_PCT: &str = "FXR_VOL_LOW_PCT";
pub const ENV_VOL_HIGH_PCT: &str = "FXR_VOL_HIGH_PCT";

/// Every tunable of the analytics → regime → confidence pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct PipelineConfig {
    pub analytics: AnalyticsOptions,
    pub regime: RegimeOptions,
    pub buckets: VolBucketThresholds,
}

impl PipelineConfig {
    /// Load `.env` (if present) and apply `FXR_*` overrides on top of defaults.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(get: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = get(ENV_VOL_WINDOW) {
            config.analytics.vol_window = parse_window(ENV_VOL_WINDOW, &v)?;
        }
        if let Some(v) = get(ENV_JUMP_THRESHOLD_PCT) {
            config.analytics.jump_threshold_pct = parse_f64(ENV_JUMP_THRESHOLD_PCT, &v)?;
        }
        if let Some(v) = get(ENV_FLAT_EPSILON) {
            config.analytics.flat_epsilon = parse_f64(ENV_FLAT_EPSILON, &v)?;
        }
        if let Some(v) = get(ENV_SLOPE_WINDOW) {
            config.regime.slope_window = parse_window(ENV_SLOPE_WINDOW, &v)?;
        }
        if let Some(v) = get(ENV_DRIFT_SLOPE_PCT) {
            config.regime.drift_slope_abs_pct_per_day = parse_f64(ENV_DRIFT_SLOPE_PCT, &v)?;
        }
        if let Some(v) = get(ENV_SHOCK_THRESHOLD_PCT) {
            config.regime.shock_jump_threshold_pct = parse_f64(ENV_SHOCK_THRESHOLD_PCT, &v)?;
        }
        if let Some(v) = get(ENV_VOL_LOW_PCT) {
            config.buckets.low_max_pct = parse_f64(ENV_VOL_LOW_PCT, &v)?;
        }
        if let Some(v) = get(ENV_VOL_HIGH_PCT) {
            config.buckets.high_min_pct = parse_f64(ENV_VOL_HIGH_PCT, &v)?;
        }

        Ok(config.normalized())
    }

    pub fn normalized(self) -> Self {
        Self {
            analytics: self.analytics.normalized(),
            regime: self.regime.normalized(),
            buckets: self.buckets.normalized(),
        }
    }
}

/// Window sizes accept any integer; negatives become `0` and are clamped later.
fn parse_window(key: &str, raw: &str) -> Result<usize, AppError> {
    let v = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::new(2, format!("Invalid {key}='{raw}': expected an integer.")))?;
    Ok(usize::try_from(v.max(0)).unwrap_or(usize::MAX))
}

fn parse_f64(key: &str, raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::new(2, format!("Invalid {key}='{raw}': expected a number.")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = PipelineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.analytics.vol_window, 7);
        assert_eq!(config.regime.slope_window, 14);
    }

    #[test]
    fn overrides_are_clamped_not_rejected() {
        let config = PipelineConfig::from_lookup(lookup(&[
            (ENV_VOL_WINDOW, "-4"),
            (ENV_SLOPE_WINDOW, "120"),
            (ENV_JUMP_THRESHOLD_PCT, "-1"),
            (ENV_DRIFT_SLOPE_PCT, " 0.1 "),
        ]))
        .unwrap();
        assert_eq!(config.analytics.vol_window, 2);
        assert_eq!(config.regime.slope_window, 60);
        assert_eq!(config.analytics.jump_threshold_pct, 0.0);
        assert!((config.regime.drift_slope_abs_pct_per_day - 0.1).abs() < 1e-12);
    }

    #[test]
    fn unparsable_value_is_a_config_error() {
        let err = PipelineConfig::from_lookup(lookup(&[(ENV_SHOCK_THRESHOLD_PCT, "lots")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains(ENV_SHOCK_THRESHOLD_PCT));
    }
}
