//! # salesagg-core
//!
//! Reads a CSV of sales records, validates each row against a declared
//! schema, aggregates total sales and mean age per city, and replaces a
//! summary table in a local SQLite database.
//!
//! ```no_run
//! use salesagg_core::{Pipeline, PipelineConfig};
//!
//! let summary = Pipeline::new(PipelineConfig::default()).run()?;
//! println!("{} cities", summary.results.len());
//! # Ok::<(), salesagg_core::PipelineError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod generate;
pub mod logging;
pub mod persistence;
pub mod pipeline;

pub use config::{ConfigOverrides, PipelineConfig, load_config};
pub use data::{AggregateRow, SalesRecord};
pub use error::{PipelineError, RowValidationError};
pub use pipeline::{Pipeline, PipelineStage, RunSummary};
