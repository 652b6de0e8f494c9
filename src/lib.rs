//! # nhanes-dl
//!
//! Downloads NHANES survey datasets and converts them to CSV.
//!
//! Each configured survey cycle gets its own directory under the data
//! directory. For every dataset the SAS transport (`.XPT`) file is fetched
//! over HTTP, decoded, and written next to it as CSV. Files already on disk
//! are reused, so a second run does no network work.
//!
//! ## Quick Start
//!
//! ```no_run
//! use nhanes_dl::{Config, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = Pipeline::new(Config::default())?;
//!     let report = pipeline.run().await;
//!
//!     for (cycle, result) in &report.results {
//!         for (name, dataset) in &result.datasets {
//!             let (rows, columns) = dataset.table.shape();
//!             println!("{cycle}/{name}: {rows} x {columns}");
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Locations of raw and converted artifacts
pub mod cache;
/// Configuration types
pub mod config;
/// Transport file to CSV conversion
pub mod converter;
/// Error types
pub mod error;
/// HTTP downloads
pub mod fetcher;
/// Per-cycle processing and the run orchestrator
pub mod pipeline;
/// Core data types
pub mod types;
/// SAS transport file decoding
pub mod xpt;

// Re-export commonly used types
pub use config::{Config, CycleConfig, DatasetConfig, FetchConfig};
pub use error::{Error, Result, XptError};
pub use fetcher::Fetcher;
pub use pipeline::{Pipeline, RunReport};
pub use types::{
    Column, ColumnKind, CycleResult, CycleSummary, DatasetSummary, LoadedDataset, Origin,
    RunSummary, Table, Value,
};
