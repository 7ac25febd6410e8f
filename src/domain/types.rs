//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - produced fresh per pipeline run
//! - exported to JSON for chart overlays
//! - embedded into commentary request payloads

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Default rolling volatility window (observations).
pub const DEFAULT_VOL_WINDOW: usize = 7;
/// Default jump threshold in percentage points.
pub const DEFAULT_JUMP_THRESHOLD_PCT: f64 = 5.0;
/// Default flat-run epsilon (absolute rate units).
pub const DEFAULT_FLAT_EPSILON: f64 = 0.0;

/// Default trailing slope window for drift detection (observations).
pub const DEFAULT_SLOPE_WINDOW: usize = 14;
/// Default absolute drift slope threshold in %/day.
pub const DEFAULT_DRIFT_SLOPE_ABS_PCT_PER_DAY: f64 = 0.06;
/// Default shock threshold in percentage points.
pub const DEFAULT_SHOCK_JUMP_THRESHOLD_PCT: f64 = 5.0;

/// Default upper bound (exclusive) of the `low` volatility bucket, in percentage points.
pub const DEFAULT_VOL_LOW_MAX_PCT: f64 = 0.5;
/// Default lower bound (inclusive) of the `high` volatility bucket, in percentage points.
pub const DEFAULT_VOL_HIGH_MIN_PCT: f64 = 1.0;

/// One observation of the fixing series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    /// Mid-rate. Expected finite and positive (ingest enforces this).
    pub mid: f64,
}

impl SeriesPoint {
    pub fn new(date: NaiveDate, mid: f64) -> Self {
        Self { date, mid }
    }
}

/// Derived per-point signals, positionally aligned with the input series.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointAnalytics {
    pub prev_mid: Option<f64>,
    pub delta: Option<f64>,
    /// Day-over-day change in percentage points (`1.25` = +1.25%).
    pub pct_delta: Option<f64>,
    /// Population std dev of recent `pct_delta` values, in percentage points.
    pub vol_pct: Option<f64>,
    pub is_jump: bool,
    /// Consecutive points within `flat_epsilon` of their predecessor.
    pub flat_run: usize,
}

/// An operator-entered fixing for one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualAnnotation {
    pub date: NaiveDate,
    pub mid: f64,
    pub is_official: bool,
    pub is_manual_override: bool,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: Option<String>,
}

/// Coarse classification of rolling volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolBucket {
    Low,
    Elevated,
    High,
    Unknown,
}

impl VolBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            VolBucket::Low => "low",
            VolBucket::Elevated => "elevated",
            VolBucket::High => "high",
            VolBucket::Unknown => "unknown",
        }
    }

    pub fn is_elevated_or_high(self) -> bool {
        matches!(self, VolBucket::Elevated | VolBucket::High)
    }
}

/// Discrete market regime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegimeKey {
    Stable,
    Drift,
    Shock,
    Intervention,
    Unknown,
}

impl RegimeKey {
    pub const ALL: [RegimeKey; 5] = [
        RegimeKey::Stable,
        RegimeKey::Drift,
        RegimeKey::Shock,
        RegimeKey::Intervention,
        RegimeKey::Unknown,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RegimeKey::Stable => "stable",
            RegimeKey::Drift => "drift",
            RegimeKey::Shock => "shock",
            RegimeKey::Intervention => "intervention",
            RegimeKey::Unknown => "unknown",
        }
    }

    /// Human-readable label for charts and reports.
    pub fn display_name(self) -> &'static str {
        match self {
            RegimeKey::Stable => "Stable",
            RegimeKey::Drift => "Drift",
            RegimeKey::Shock => "Shock",
            RegimeKey::Intervention => "Intervention",
            RegimeKey::Unknown => "Unclear",
        }
    }
}

/// Regime verdict for one point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimePoint {
    pub key: RegimeKey,
    pub label: String,
    pub reason: String,
}

impl RegimePoint {
    pub fn new(key: RegimeKey, reason: impl Into<String>) -> Self {
        Self {
            key,
            label: key.display_name().to_string(),
            reason: reason.into(),
        }
    }
}

/// A maximal run of identical regime keys, indices inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeSegment {
    pub key: RegimeKey,
    pub from_index: usize,
    pub to_index: usize,
}

impl RegimeSegment {
    /// Number of points covered (always at least one).
    pub fn span(&self) -> usize {
        self.to_index - self.from_index + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "High confidence",
            ConfidenceLevel::Medium => "Medium confidence",
            ConfidenceLevel::Low => "Low confidence",
        }
    }
}

/// Confidence verdict for one point.
///
/// `reasons` is diagnostic, ordered by the rule ladder, and not necessarily exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub level: ConfidenceLevel,
    pub label: String,
    pub reasons: Vec<String>,
}

impl ConfidenceResult {
    pub fn new(level: ConfidenceLevel, reasons: Vec<String>) -> Self {
        Self {
            level,
            label: level.display_name().to_string(),
            reasons,
        }
    }
}

/// Facts the confidence scorer needs about one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInput {
    pub index: usize,
    /// Series length. Not read by the rule ladder; carried for diagnostics.
    pub total: usize,
    pub has_manual_fixing: bool,
    pub has_manual_override: bool,
    pub is_jump: bool,
    pub vol_bucket: VolBucket,
    pub regime: RegimeKey,
    pub has_vol_history: bool,
}

/// Options for the series analytics engine.
///
/// Out-of-range values are clamped, never rejected; see [`AnalyticsOptions::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsOptions {
    pub vol_window: usize,
    pub jump_threshold_pct: f64,
    pub flat_epsilon: f64,
}

impl Default for AnalyticsOptions {
    fn default() -> Self {
        Self {
            vol_window: DEFAULT_VOL_WINDOW,
            jump_threshold_pct: DEFAULT_JUMP_THRESHOLD_PCT,
            flat_epsilon: DEFAULT_FLAT_EPSILON,
        }
    }
}

impl AnalyticsOptions {
    pub const VOL_WINDOW_MIN: usize = 2;
    pub const VOL_WINDOW_MAX: usize = 60;

    /// Clamp every field into its valid range.
    ///
    /// `vol_window` is clamped to `[2, 60]`; thresholds floor at `0`.
    /// Non-finite thresholds fall back to their defaults.
    pub fn normalized(self) -> Self {
        Self {
            vol_window: self.vol_window.clamp(Self::VOL_WINDOW_MIN, Self::VOL_WINDOW_MAX),
            jump_threshold_pct: floor_zero_or(self.jump_threshold_pct, DEFAULT_JUMP_THRESHOLD_PCT),
            flat_epsilon: floor_zero_or(self.flat_epsilon, DEFAULT_FLAT_EPSILON),
        }
    }
}

/// Options for the regime classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeOptions {
    pub slope_window: usize,
    pub drift_slope_abs_pct_per_day: f64,
    pub shock_jump_threshold_pct: f64,
}

impl Default for RegimeOptions {
    fn default() -> Self {
        Self {
            slope_window: DEFAULT_SLOPE_WINDOW,
            drift_slope_abs_pct_per_day: DEFAULT_DRIFT_SLOPE_ABS_PCT_PER_DAY,
            shock_jump_threshold_pct: DEFAULT_SHOCK_JUMP_THRESHOLD_PCT,
        }
    }
}

impl RegimeOptions {
    pub const SLOPE_WINDOW_MIN: usize = 7;
    pub const SLOPE_WINDOW_MAX: usize = 60;

    /// `slope_window` is clamped to `[7, 60]`; thresholds floor at `0`.
    pub fn normalized(self) -> Self {
        Self {
            slope_window: self
                .slope_window
                .clamp(Self::SLOPE_WINDOW_MIN, Self::SLOPE_WINDOW_MAX),
            drift_slope_abs_pct_per_day: floor_zero_or(
                self.drift_slope_abs_pct_per_day,
                DEFAULT_DRIFT_SLOPE_ABS_PCT_PER_DAY,
            ),
            shock_jump_threshold_pct: floor_zero_or(
                self.shock_jump_threshold_pct,
                DEFAULT_SHOCK_JUMP_THRESHOLD_PCT,
            ),
        }
    }

    /// Minimum number of valid returns needed inside the slope window.
    pub fn min_slope_samples(&self) -> usize {
        (self.slope_window as f64 * 0.6).ceil() as usize
    }
}

/// Bucket boundaries applied to `vol_pct`.
///
/// `low` is `vol < low_max_pct`, `high` is `vol >= high_min_pct`, `elevated` in between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolBucketThresholds {
    pub low_max_pct: f64,
    pub high_min_pct: f64,
}

impl Default for VolBucketThresholds {
    fn default() -> Self {
        Self {
            low_max_pct: DEFAULT_VOL_LOW_MAX_PCT,
            high_min_pct: DEFAULT_VOL_HIGH_MIN_PCT,
        }
    }
}

impl VolBucketThresholds {
    /// Both bounds floor at `0` and `high_min_pct >= low_max_pct`.
    pub fn normalized(self) -> Self {
        let low_max_pct = floor_zero_or(self.low_max_pct, DEFAULT_VOL_LOW_MAX_PCT);
        let high_min_pct = floor_zero_or(self.high_min_pct, DEFAULT_VOL_HIGH_MIN_PCT).max(low_max_pct);
        Self {
            low_max_pct,
            high_min_pct,
        }
    }
}

fn floor_zero_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { fallback }
}
