//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input observations (`SeriesPoint`, `ManualAnnotation`)
//! - per-point outputs (`PointAnalytics`, `RegimePoint`, `ConfidenceResult`)
//! - closed label sets (`VolBucket`, `RegimeKey`, `ConfidenceLevel`)
//! - option bundles with their clamping rules

pub mod types;

pub use types::*;
