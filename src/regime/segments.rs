//! Collapse per-point regimes into contiguous segments.

use std::collections::BTreeMap;

use crate::domain::{RegimeKey, RegimePoint, RegimeSegment};

/// Maximal runs of identical regime keys, in order.
pub fn build_regime_segments(regimes: &[RegimePoint]) -> Vec<RegimeSegment> {
    segments_from_keys(regimes.iter().map(|r| r.key))
}

/// Same as [`build_regime_segments`] over bare keys.
pub fn segments_from_keys<I>(keys: I) -> Vec<RegimeSegment>
where
    I: IntoIterator<Item = RegimeKey>,
{
    let mut out: Vec<RegimeSegment> = Vec::new();
    for (i, key) in keys.into_iter().enumerate() {
        match out.last_mut() {
            Some(seg) if seg.key == key => seg.to_index = i,
            _ => out.push(RegimeSegment {
                key,
                from_index: i,
                to_index: i,
            }),
        }
    }
    out
}

/// Number of points per regime key (keys with zero points omitted).
pub fn regime_counts(regimes: &[RegimePoint]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for r in regimes {
        *counts.entry(r.key.as_str()).or_insert(0) += 1;
    }
    counts
}
