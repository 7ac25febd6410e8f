//! Series analytics: per-point deltas, returns, rolling volatility, jump and flat-run flags.
//!
//! Responsibilities:
//!
//! - derive `PointAnalytics` from the raw mid-rate series (`series`)
//! - population std dev and volatility bucketing (`volatility`)

pub mod series;
pub mod volatility;

pub use series::*;
pub use volatility::*;
