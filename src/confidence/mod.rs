//! Explainable confidence scoring.

pub mod scorer;

pub use scorer::*;
