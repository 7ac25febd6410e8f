//! Rule-ladder confidence scorer.
//!
//! A fixed heuristic, evaluated top to bottom; the first qualifying branch returns:
//!
//! 1. manual override → `low`
//! 2. collect reasons (short history, manual fixing, jump, missing vol history,
//!    elevated/high vol, unclear regime)
//! 3. `low` if jump+high vol, manual fixing+high vol, or jump+unclear regime+elevated/high vol
//! 4. `medium` if any reason from step 2 applies
//! 5. otherwise `high`
//!
//! Rule order is part of the contract: reordering changes outcomes at rule boundaries.

use crate::domain::{
    ConfidenceInput, ConfidenceLevel, ConfidenceResult, PointAnalytics, RegimeKey, RegimePoint, VolBucket,
};

/// Points before this index have limited trailing history.
pub const MIN_TRAILING_POINTS: usize = 7;

pub fn score_confidence(input: &ConfidenceInput) -> ConfidenceResult {
    if input.has_manual_override {
        return ConfidenceResult::new(ConfidenceLevel::Low, vec!["manual override recorded".to_string()]);
    }

    let short_history = input.index < MIN_TRAILING_POINTS;
    let bucket = input.vol_bucket;
    let regime_unclear = input.regime == RegimeKey::Unknown;

    let mut reasons = Vec::new();
    if short_history {
        reasons.push("limited trailing history".to_string());
    }
    if input.has_manual_fixing {
        reasons.push("manual fixing recorded".to_string());
    }
    if input.is_jump {
        reasons.push("jump day".to_string());
    }
    if !input.has_vol_history {
        reasons.push("insufficient volatility history".to_string());
    }
    match bucket {
        VolBucket::Elevated => reasons.push("elevated volatility".to_string()),
        VolBucket::High => reasons.push("high volatility".to_string()),
        VolBucket::Low | VolBucket::Unknown => {}
    }
    if regime_unclear {
        reasons.push("regime unclear".to_string());
    }

    let high_vol = bucket == VolBucket::High;
    if (input.is_jump && high_vol)
        || (input.has_manual_fixing && high_vol)
        || (input.is_jump && regime_unclear && bucket.is_elevated_or_high())
    {
        return ConfidenceResult::new(ConfidenceLevel::Low, reasons);
    }

    if input.has_manual_fixing
        || bucket.is_elevated_or_high()
        || regime_unclear
        || input.is_jump
        || short_history
        || !input.has_vol_history
    {
        return ConfidenceResult::new(ConfidenceLevel::Medium, reasons);
    }

    ConfidenceResult::new(ConfidenceLevel::High, vec!["stable analytics profile".to_string()])
}

/// Score a whole series.
///
/// All slices must be positionally aligned; the output has `analytics.len()` entries.
pub fn score_series<M, O>(
    analytics: &[PointAnalytics],
    buckets: &[VolBucket],
    regimes: &[RegimePoint],
    has_manual_at: M,
    has_override_at: O,
) -> Vec<ConfidenceResult>
where
    M: Fn(usize) -> bool,
    O: Fn(usize) -> bool,
{
    let total = analytics.len();
    analytics
        .iter()
        .enumerate()
        .map(|(i, a)| {
            score_confidence(&ConfidenceInput {
                index: i,
                total,
                has_manual_fixing: has_manual_at(i),
                has_manual_override: has_override_at(i),
                is_jump: a.is_jump,
                vol_bucket: buckets.get(i).copied().unwrap_or(VolBucket::Unknown),
                regime: regimes.get(i).map(|r| r.key).unwrap_or(RegimeKey::Unknown),
                has_vol_history: a.vol_pct.is_some(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(index: usize) -> ConfidenceInput {
        ConfidenceInput {
            index,
            total: 30,
            has_manual_fixing: false,
            has_manual_override: false,
            is_jump: false,
            vol_bucket: VolBucket::Low,
            regime: RegimeKey::Stable,
            has_vol_history: true,
        }
    }

    #[test]
    fn clean_point_scores_high() {
        let r = score_confidence(&clean(10));
        assert_eq!(r.level, ConfidenceLevel::High);
        assert_eq!(r.label, "High confidence");
        assert_eq!(r.reasons, vec!["stable analytics profile"]);
    }

    #[test]
    fn override_is_always_low() {
        let buckets = [VolBucket::Low, VolBucket::Elevated, VolBucket::High, VolBucket::Unknown];
        for bucket in buckets {
            for regime in RegimeKey::ALL {
                for is_jump in [false, true] {
                    let input = ConfidenceInput {
                        has_manual_override: true,
                        vol_bucket: bucket,
                        regime,
                        is_jump,
                        ..clean(20)
                    };
                    let r = score_confidence(&input);
                    assert_eq!(r.level, ConfidenceLevel::Low);
                    assert_eq!(r.reasons, vec!["manual override recorded"]);
                }
            }
        }
    }

    #[test]
    fn jump_in_high_vol_is_low() {
        let input = ConfidenceInput {
            is_jump: true,
            vol_bucket: VolBucket::High,
            ..clean(20)
        };
        let r = score_confidence(&input);
        assert_eq!(r.level, ConfidenceLevel::Low);
        assert_eq!(r.reasons, vec!["jump day", "high volatility"]);
    }

    #[test]
    fn manual_fixing_in_high_vol_is_low() {
        let input = ConfidenceInput {
            has_manual_fixing: true,
            vol_bucket: VolBucket::High,
            ..clean(20)
        };
        assert_eq!(score_confidence(&input).level, ConfidenceLevel::Low);
    }

    #[test]
    fn jump_with_unclear_regime_needs_elevated_vol_for_low() {
        let elevated = ConfidenceInput {
            is_jump: true,
            regime: RegimeKey::Unknown,
            vol_bucket: VolBucket::Elevated,
            ..clean(20)
        };
        assert_eq!(score_confidence(&elevated).level, ConfidenceLevel::Low);

        let unknown_vol = ConfidenceInput {
            vol_bucket: VolBucket::Unknown,
            ..elevated
        };
        assert_eq!(score_confidence(&unknown_vol).level, ConfidenceLevel::Medium);
    }

    #[test]
    fn medium_triggers() {
        let cases = [
            ConfidenceInput {
                has_manual_fixing: true,
                ..clean(20)
            },
            ConfidenceInput {
                vol_bucket: VolBucket::Elevated,
                ..clean(20)
            },
            ConfidenceInput {
                regime: RegimeKey::Unknown,
                ..clean(20)
            },
            ConfidenceInput {
                is_jump: true,
                ..clean(20)
            },
            ConfidenceInput {
                has_vol_history: false,
                ..clean(20)
            },
            clean(6),
        ];
        for input in cases {
            let r = score_confidence(&input);
            assert_eq!(r.level, ConfidenceLevel::Medium, "{input:?}");
            assert!(!r.reasons.is_empty());
        }
        assert_eq!(score_confidence(&clean(7)).level, ConfidenceLevel::High);
    }

    #[test]
    fn reasons_follow_ladder_order() {
        let input = ConfidenceInput {
            index: 2,
            has_manual_fixing: true,
            is_jump: true,
            has_vol_history: false,
            vol_bucket: VolBucket::Unknown,
            regime: RegimeKey::Unknown,
            ..clean(0)
        };
        let r = score_confidence(&input);
        assert_eq!(r.level, ConfidenceLevel::Medium);
        assert_eq!(
            r.reasons,
            vec![
                "limited trailing history",
                "manual fixing recorded",
                "jump day",
                "insufficient volatility history",
                "regime unclear",
            ]
        );
    }

    #[test]
    fn score_series_aligns_with_input() {
        let analytics = vec![PointAnalytics::default(); 3];
        let buckets = vec![VolBucket::Unknown; 3];
        let regimes = vec![RegimePoint::new(RegimeKey::Unknown, "n/a"); 3];
        let out = score_series(&analytics, &buckets, &regimes, |_| false, |i| i == 1);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].level, ConfidenceLevel::Medium);
        assert_eq!(out[1].level, ConfidenceLevel::Low);
    }
}
