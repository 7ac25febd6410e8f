//! Per-index views of the sparse, date-keyed manual annotations.
//!
//! The classifier and scorer never see `ManualAnnotation` directly; they only
//! ask two questions per index: is there a manual fixing, and is it an override.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::{ManualAnnotation, SeriesPoint};

/// Annotations aligned to a series.
#[derive(Debug, Clone, Default)]
pub struct AnnotationIndex {
    manual: Vec<bool>,
    overrides: Vec<bool>,
    /// Annotations whose date is not present in the series.
    pub unmatched: usize,
}

impl AnnotationIndex {
    pub fn build(series: &[SeriesPoint], annotations: &HashMap<NaiveDate, ManualAnnotation>) -> Self {
        let mut manual = Vec::with_capacity(series.len());
        let mut overrides = Vec::with_capacity(series.len());
        let mut matched = 0usize;

        for point in series {
            match annotations.get(&point.date) {
                Some(a) => {
                    matched += 1;
                    manual.push(true);
                    overrides.push(a.is_manual_override);
                }
                None => {
                    manual.push(false);
                    overrides.push(false);
                }
            }
        }

        let dates: HashSet<NaiveDate> = series.iter().map(|p| p.date).collect();
        let unmatched = annotations.keys().filter(|d| !dates.contains(*d)).count();
        if unmatched > 0 {
            log::warn!("{unmatched} manual annotation(s) fall outside the series window");
        }
        log::debug!("annotations matched: {matched} of {} points", series.len());

        Self {
            manual,
            overrides,
            unmatched,
        }
    }

    pub fn has_manual(&self, index: usize) -> bool {
        self.manual.get(index).copied().unwrap_or(false)
    }

    pub fn has_override(&self, index: usize) -> bool {
        self.overrides.get(index).copied().unwrap_or(false)
    }

    pub fn manual_count(&self) -> usize {
        self.manual.iter().filter(|m| **m).count()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.iter().filter(|m| **m).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotation(date: NaiveDate, is_manual_override: bool) -> ManualAnnotation {
        ManualAnnotation {
            date,
            mid: 1.0,
            is_official: false,
            is_manual_override,
            notes: None,
            created_at: None,
            created_by: None,
        }
    }

    #[test]
    fn lookups_align_with_series_positions() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 6, day).unwrap();
        let series = vec![
            SeriesPoint::new(d(2), 1.1),
            SeriesPoint::new(d(3), 1.2),
            SeriesPoint::new(d(4), 1.3),
        ];
        let mut notes = HashMap::new();
        notes.insert(d(3), annotation(d(3), false));
        notes.insert(d(4), annotation(d(4), true));
        notes.insert(d(20), annotation(d(20), true));

        let idx = AnnotationIndex::build(&series, &notes);
        assert!(!idx.has_manual(0));
        assert!(idx.has_manual(1) && !idx.has_override(1));
        assert!(idx.has_manual(2) && idx.has_override(2));
        assert!(!idx.has_manual(99));
        assert_eq!(idx.unmatched, 1);
        assert_eq!(idx.manual_count(), 2);
        assert_eq!(idx.override_count(), 1);
    }
}
