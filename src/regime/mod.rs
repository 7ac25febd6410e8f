//! Regime classification and segment building.
//!
//! - per-point classification with fixed rule precedence (`classifier`)
//! - contiguous labeled runs for chart overlays (`segments`)

pub mod classifier;
pub mod segments;

pub use classifier::*;
pub use segments::*;
