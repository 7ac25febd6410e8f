//! Input/output helpers.
//!
//! - CSV ingest + validation for series and annotations (`ingest`)
//! - JSON exports of pipeline output and summary payloads (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
