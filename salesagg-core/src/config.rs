//! Configuration for the salesagg pipeline.
//!
//! Uses `figment` for layered configuration: defaults -> user config -> workspace
//! config -> environment -> CLI overrides. The workspace file is `salesagg.toml`;
//! the user file is `<config dir>/salesagg/config.toml`.

use crate::data::aggregate::AggregateOptions;
use crate::error::PipelineError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the workspace-level config file.
pub const WORKSPACE_CONFIG_FILE: &str = "salesagg.toml";

/// Prefix for environment overrides, e.g. `SALESAGG_TABLE_NAME`.
pub const ENV_PREFIX: &str = "SALESAGG_";

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// CSV input file.
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    /// CSV field delimiter (single ASCII character).
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// SQLite database file; `.db` is appended when missing.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Destination table, replaced on every run.
    #[serde(default = "default_table_name")]
    pub table_name: String,
    /// Rows read back from the table after writing.
    #[serde(default = "default_read_back_limit")]
    pub read_back_limit: usize,
    /// Decimal places kept on aggregate values.
    #[serde(default = "default_precision")]
    pub precision: u32,
    /// Raw rows shown in the data preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
    /// Directory for JSON log files. File logging is off when unset.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            delimiter: default_delimiter(),
            db_path: default_db_path(),
            table_name: default_table_name(),
            read_back_limit: default_read_back_limit(),
            precision: default_precision(),
            preview_rows: default_preview_rows(),
            log_dir: None,
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("datasets/data.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_db_path() -> PathBuf {
    PathBuf::from("sales_data.db")
}

fn default_table_name() -> String {
    "sales_summary".to_string()
}

fn default_read_back_limit() -> usize {
    5
}

fn default_precision() -> u32 {
    2
}

fn default_preview_rows() -> usize {
    5
}

impl PipelineConfig {
    /// The delimiter as a byte, rejecting non-ASCII characters.
    pub fn delimiter_byte(&self) -> Result<u8, PipelineError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(PipelineError::config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            precision: self.precision,
        }
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), PipelineError> {
        self.delimiter_byte()?;
        if self.precision > 15 {
            return Err(PipelineError::config(format!(
                "precision must be at most 15, got {}",
                self.precision
            )));
        }
        if self.table_name.is_empty() {
            return Err(PipelineError::config("table_name must not be empty"));
        }
        Ok(())
    }
}

/// Values supplied on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_back_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Explicit overrides (passed as argument)
/// 2. Environment variables (prefixed with `SALESAGG_`)
/// 3. An explicit config file, or else the workspace `salesagg.toml`
/// 4. User config (`~/.config/salesagg/config.toml` on Linux)
/// 5. Built-in defaults
///
/// An explicit `config_file` that does not exist is an error; the implicit
/// files are skipped when absent.
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<PipelineConfig, PipelineError> {
    load_layers(
        user_config_path().as_deref(),
        Some(Env::prefixed(ENV_PREFIX)),
        workspace,
        config_file,
        overrides,
    )
}

fn load_layers(
    user_config: Option<&Path>,
    env: Option<Env>,
    workspace: Option<&Path>,
    config_file: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<PipelineConfig, PipelineError> {
    let mut figment = Figment::from(Serialized::defaults(PipelineConfig::default()));

    if let Some(user_config) = user_config {
        if user_config.exists() {
            figment = figment.merge(Toml::file(user_config));
        }
    }

    match config_file {
        Some(file) => {
            if !file.exists() {
                return Err(PipelineError::config(format!(
                    "config file not found: {}",
                    file.display()
                )));
            }
            figment = figment.merge(Toml::file(file));
        }
        None => {
            if let Some(ws) = workspace {
                let ws_config = ws.join(WORKSPACE_CONFIG_FILE);
                if ws_config.exists() {
                    figment = figment.merge(Toml::file(&ws_config));
                }
            }
        }
    }

    if let Some(env) = env {
        figment = figment.merge(env);
    }
    figment = figment.merge(Serialized::defaults(overrides));

    let config: PipelineConfig = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Path of the user-level config file, if a home directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "salesagg", "salesagg")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
