//! Pipeline stages: load, validate, aggregate, persist.

pub mod aggregate;
pub mod schema;
pub mod sink;
pub mod source;
pub mod validate;

pub use aggregate::{AggregateOptions, AggregateRow, aggregate_by_city};
pub use schema::{ColumnSchema, ColumnType, RecordSchema, SALES_SCHEMA, SUMMARY_SCHEMA, SalesRecord};
pub use sink::SqliteSink;
pub use source::{CsvSource, DataSource, DataSourceInfo, RawTable};
pub use validate::{ValidatedTable, ValidationReport, validate_table};
