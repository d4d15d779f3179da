//! Data source abstraction for loading raw tables.

use crate::data::schema::SALES_SCHEMA;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Rows of untyped string fields under a header, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub source: DataSourceInfo,
}

impl RawTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// The first `n` rows, for previews.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }
}

/// Where a table came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub source_type: String,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
    pub sha256: String,
}

/// Trait for loading a raw table from a source.
pub trait DataSource {
    fn load(&self) -> Result<RawTable, PipelineError>;

    /// Human-readable location, used in log lines.
    fn location(&self) -> String;
}

// ---------------------------------------------------------------------------
// CsvSource
// ---------------------------------------------------------------------------

/// CSV file data source. The first line is the header.
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn read_bytes(&self) -> Result<Vec<u8>, PipelineError> {
        std::fs::read(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::NotFound(self.path.clone()),
            _ => PipelineError::read(format!("{}: {e}", self.path.display())),
        })
    }
}

impl DataSource for CsvSource {
    fn load(&self) -> Result<RawTable, PipelineError> {
        let bytes = self.read_bytes()?;
        let sha256 = hash_bytes(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(bytes.as_slice());

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(String::from)
            .collect();
        if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
            return Err(PipelineError::read("No columns to parse from file"));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(String::from).collect());
        }

        let missing = SALES_SCHEMA.missing_columns(&columns);
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing,
                "CSV header is missing expected columns"
            );
        }

        tracing::info!(
            path = %self.path.display(),
            rows = rows.len(),
            "Successfully read CSV file"
        );

        Ok(RawTable {
            columns,
            rows,
            source: DataSourceInfo {
                source_type: "csv".to_string(),
                location: self.location(),
                accessed_at: chrono::Utc::now(),
                sha256,
            },
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// Compute SHA-256 hash of a file's contents.
pub fn hash_file(path: &Path) -> Result<String, PipelineError> {
    let content = std::fs::read(path)?;
    Ok(hash_bytes(&content))
}

/// Compute SHA-256 hash of arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "data.csv",
            "name,age,city,sales\nAlice,30,Austin,100.5\nBob,41,Denver,200\n",
        );
        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.columns, vec!["name", "age", "city", "sales"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1], vec!["Bob", "41", "Denver", "200"]);
        assert_eq!(table.source.source_type, "csv");
        assert_eq!(table.source.sha256, hash_file(&path).unwrap());
    }

    #[test]
    fn test_load_quoted_fields() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "quoted.csv",
            "name,age,city,sales\n\"Smith, Jane\",52,\"San Jose\",10\n",
        );
        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.rows[0][0], "Smith, Jane");
        assert_eq!(table.rows[0][2], "San Jose");
    }

    #[test]
    fn test_load_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "semi.csv", "name;age;city;sales\nA;30;X;1\n");
        let table = CsvSource::new(&path).with_delimiter(b';').load().unwrap();
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.rows[0], vec!["A", "30", "X", "1"]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = CsvSource::new(dir.path().join("absent.csv"))
            .load()
            .unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }

    #[test]
    fn test_ragged_row_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "bad.csv", "name,age,city,sales\nA,30,X\n");
        let err = CsvSource::new(&path).load().unwrap_err();
        assert!(matches!(err, PipelineError::Read(_)));
    }

    #[test]
    fn test_empty_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "empty.csv", "");
        let err = CsvSource::new(&path).load().unwrap_err();
        assert!(matches!(err, PipelineError::Read(_)));
    }

    #[test]
    fn test_header_only_is_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "header.csv", "name,age,city,sales\n");
        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 4);
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin1.csv");
        let mut bytes = b"name,age,city,sales\n".to_vec();
        bytes.extend_from_slice(&[0xff, 0xfe, b',', b'3', b'0', b',', b'X', b',', b'1', b'\n']);
        std::fs::write(&path, bytes).unwrap();
        let err = CsvSource::new(&path).load().unwrap_err();
        assert!(matches!(err, PipelineError::Read(_)));
    }

    #[test]
    fn test_head_clamps() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "d.csv", "name,age,city,sales\nA,1,X,1\n");
        let table = CsvSource::new(&path).load().unwrap();
        assert_eq!(table.head(5).len(), 1);
        assert_eq!(table.head(0).len(), 0);
    }

    #[test]
    fn test_hash_bytes_known_value() {
        assert_eq!(
            hash_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
