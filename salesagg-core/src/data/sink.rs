//! SQLite sink: destructive replace of the summary table, then a read-back.

use crate::data::aggregate::AggregateRow;
use crate::data::schema::SUMMARY_SCHEMA;
use crate::error::PipelineError;
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};

/// Writes aggregate rows to a named table in a single-file SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    pub db_path: PathBuf,
    pub table_name: String,
    /// Rows read back and logged after the write.
    pub read_back_limit: usize,
}

impl SqliteSink {
    /// Create a sink. The database file name is forced to end with `.db`.
    pub fn new(db_path: impl AsRef<Path>, table_name: impl Into<String>) -> Self {
        Self {
            db_path: normalize_db_path(db_path.as_ref()),
            table_name: table_name.into(),
            read_back_limit: 5,
        }
    }

    pub fn with_read_back_limit(mut self, limit: usize) -> Self {
        self.read_back_limit = limit;
        self
    }

    /// Replace the target table with `rows` and return the read-back sample.
    pub fn write(&self, rows: &[AggregateRow]) -> Result<Vec<AggregateRow>, PipelineError> {
        if !is_valid_identifier(&self.table_name) {
            return Err(PipelineError::sink(format!(
                "invalid table name '{}'",
                self.table_name
            )));
        }

        let mut conn = Connection::open(&self.db_path)?;
        replace_table(&mut conn, &self.table_name, rows)?;
        tracing::info!(
            table = %self.table_name,
            db = %self.db_path.display(),
            rows = rows.len(),
            "Successfully wrote data to table '{}' in SQLite database '{}'.",
            self.table_name,
            self.db_path.display()
        );

        let sample = select_rows(&conn, &self.table_name, Some(self.read_back_limit))?;
        for row in &sample {
            tracing::info!(
                "Sample data from {}: ('{}', {}, {})",
                self.table_name,
                row.city,
                row.total_sales,
                row.average_age
            );
        }
        Ok(sample)
    }
}

fn replace_table(
    conn: &mut Connection,
    table: &str,
    rows: &[AggregateRow],
) -> Result<(), PipelineError> {
    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS \"{table}\""), [])?;
    tx.execute(
        &format!("CREATE TABLE \"{table}\" ({})", SUMMARY_SCHEMA.sql_columns()),
        [],
    )?;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO \"{table}\" ({}) VALUES (?1, ?2, ?3)",
            SUMMARY_SCHEMA.column_names().join(", ")
        ))?;
        for row in rows {
            stmt.execute(params![row.city, row.total_sales, row.average_age])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Read rows back from a summary table, in storage order.
pub fn read_table(
    db_path: &Path,
    table: &str,
    limit: Option<usize>,
) -> Result<Vec<AggregateRow>, PipelineError> {
    if !is_valid_identifier(table) {
        return Err(PipelineError::sink(format!("invalid table name '{table}'")));
    }
    let conn = Connection::open_with_flags(db_path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    select_rows(&conn, table, limit)
}

fn select_rows(
    conn: &Connection,
    table: &str,
    limit: Option<usize>,
) -> Result<Vec<AggregateRow>, PipelineError> {
    // SQLite treats a negative LIMIT as "no limit".
    let limit = limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{table}\" LIMIT ?1"))?;
    let rows = stmt
        .query_map([limit], |row| {
            Ok(AggregateRow {
                city: row.get(0)?,
                total_sales: row.get(1)?,
                average_age: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Append `.db` unless the file name already ends with it.
pub fn normalize_db_path(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".db") {
        path.to_path_buf()
    } else {
        let mut os = path.as_os_str().to_owned();
        os.push(".db");
        PathBuf::from(os)
    }
}

/// Plain SQL identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn row(city: &str, total_sales: f64, average_age: f64) -> AggregateRow {
        AggregateRow {
            city: city.into(),
            total_sales,
            average_age,
        }
    }

    #[test]
    fn test_normalize_db_path() {
        assert_eq!(normalize_db_path(Path::new("sales_data")), PathBuf::from("sales_data.db"));
        assert_eq!(normalize_db_path(Path::new("out/x.db")), PathBuf::from("out/x.db"));
        assert_eq!(normalize_db_path(Path::new("x.sqlite")), PathBuf::from("x.sqlite.db"));
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_valid_identifier("sales_summary"));
        assert!(is_valid_identifier("_t2"));
        assert!(!is_valid_identifier("2t"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("x; DROP TABLE y"));
        assert!(!is_valid_identifier("a\"b"));
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("sales"), "sales_summary");
        let rows = vec![row("Austin", 300.0, 35.0), row("Denver", 10.5, 22.33)];
        let sample = sink.write(&rows).unwrap();
        assert_eq!(sample, rows);
        assert!(dir.path().join("sales.db").exists());
        assert_eq!(read_table(&sink.db_path, "sales_summary", None).unwrap(), rows);
    }

    #[test]
    fn test_read_back_is_limited() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("s.db"), "t").with_read_back_limit(2);
        let rows: Vec<_> = (0..7).map(|i| row(&format!("c{i}"), i as f64, 20.0)).collect();
        let sample = sink.write(&rows).unwrap();
        assert_eq!(sample.len(), 2);
        assert_eq!(read_table(&sink.db_path, "t", None).unwrap().len(), 7);
    }

    #[test]
    fn test_write_replaces_existing_table() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("s.db"), "sales_summary");
        sink.write(&[row("Old", 1.0, 1.0), row("Older", 2.0, 2.0)]).unwrap();
        sink.write(&[row("New", 3.0, 3.0)]).unwrap();
        let stored = read_table(&sink.db_path, "sales_summary", None).unwrap();
        assert_eq!(stored, vec![row("New", 3.0, 3.0)]);
    }

    #[test]
    fn test_replaces_table_with_different_shape() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("s.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("CREATE TABLE sales_summary (x INTEGER); INSERT INTO sales_summary VALUES (1);")
                .unwrap();
        }
        let sink = SqliteSink::new(&path, "sales_summary");
        sink.write(&[row("A", 1.0, 2.0)]).unwrap();
        assert_eq!(read_table(&path, "sales_summary", None).unwrap(), vec![row("A", 1.0, 2.0)]);
    }

    #[test]
    fn test_empty_rows_create_empty_table() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("s.db"), "sales_summary");
        assert!(sink.write(&[]).unwrap().is_empty());
        assert!(read_table(&sink.db_path, "sales_summary", None).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_table_name_does_not_touch_db() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("s.db"), "bad name");
        let err = sink.write(&[row("A", 1.0, 1.0)]).unwrap_err();
        assert!(matches!(err, PipelineError::Sink(_)));
        assert!(!sink.db_path.exists());
    }

    #[test]
    fn test_unwritable_path_is_sink_error() {
        let dir = TempDir::new().unwrap();
        let sink = SqliteSink::new(dir.path().join("missing").join("s.db"), "t");
        let err = sink.write(&[row("A", 1.0, 1.0)]).unwrap_err();
        assert_eq!(err.kind(), "sink_error");
    }
}
