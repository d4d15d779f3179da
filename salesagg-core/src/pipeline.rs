//! The load → validate → aggregate → write pipeline.
//!
//! Each stage consumes the previous stage's output and runs inside its own
//! tracing span. Any fatal error moves the pipeline to [`PipelineStage::Failed`]
//! and is returned to the caller; nothing is retried or resumed.

use crate::config::PipelineConfig;
use crate::data::aggregate::{AggregateRow, aggregate_by_city};
use crate::data::schema::SALES_SCHEMA;
use crate::data::sink::SqliteSink;
use crate::data::source::{CsvSource, DataSource, DataSourceInfo};
use crate::data::validate::{ValidationReport, validate_table};
use crate::error::PipelineError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// Pipeline progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Start,
    Loaded,
    Validated,
    Aggregated,
    Written,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input: DataSourceInfo,
    pub columns: Vec<String>,
    /// First rows of the raw input, as read.
    pub preview: Vec<Vec<String>>,
    pub rows_read: usize,
    pub validation: ValidationReport,
    pub results: Vec<AggregateRow>,
    pub read_back: Vec<AggregateRow>,
    pub db_path: PathBuf,
    pub table_name: String,
}

/// One pipeline run over a fixed configuration.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    stage: PipelineStage,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            stage: PipelineStage::Start,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Run against the configured CSV input.
    pub fn run(&mut self) -> Result<RunSummary, PipelineError> {
        let source = CsvSource::new(&self.config.input_path)
            .with_delimiter(self.config.delimiter_byte()?);
        self.run_with(&source)
    }

    /// Run against an arbitrary source.
    pub fn run_with(&mut self, source: &dyn DataSource) -> Result<RunSummary, PipelineError> {
        if self.stage != PipelineStage::Start {
            return Err(PipelineError::config(format!(
                "pipeline already ran (stage: {:?})",
                self.stage
            )));
        }
        match self.execute(source) {
            Ok(summary) => {
                self.advance(PipelineStage::Done);
                tracing::info!("Data processing complete.");
                Ok(summary)
            }
            Err(e) => {
                tracing::debug!(stage = ?self.stage, kind = e.kind(), "pipeline stopped");
                self.advance(PipelineStage::Failed);
                Err(e)
            }
        }
    }

    fn execute(&mut self, source: &dyn DataSource) -> Result<RunSummary, PipelineError> {
        let started_at = Utc::now();

        let raw = {
            let _span = tracing::info_span!("load", source = %source.location()).entered();
            source.load()?
        };
        self.advance(PipelineStage::Loaded);

        let input = raw.source.clone();
        let columns = raw.columns.clone();
        let preview = raw.head(self.config.preview_rows).to_vec();
        let rows_read = raw.row_count();

        let (validated, validation) = {
            let _span = tracing::info_span!("validate", rows = rows_read).entered();
            validate_table(raw, &SALES_SCHEMA)
        };
        self.advance(PipelineStage::Validated);

        let results = {
            let _span = tracing::info_span!("aggregate", rows = validated.len()).entered();
            aggregate_by_city(&validated, &self.config.aggregate_options())?
        };
        self.advance(PipelineStage::Aggregated);

        let sink = SqliteSink::new(&self.config.db_path, self.config.table_name.clone())
            .with_read_back_limit(self.config.read_back_limit);
        let read_back = {
            let _span = tracing::info_span!("write", table = %sink.table_name).entered();
            sink.write(&results)?
        };
        self.advance(PipelineStage::Written);

        Ok(RunSummary {
            started_at,
            finished_at: Utc::now(),
            input,
            columns,
            preview,
            rows_read,
            validation,
            results,
            read_back,
            db_path: sink.db_path,
            table_name: sink.table_name,
        })
    }

    fn advance(&mut self, next: PipelineStage) {
        tracing::debug!(from = ?self.stage, to = ?next, "stage transition");
        self.stage = next;
    }
}
