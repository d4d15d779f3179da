//! Row-level coercion and validation against a declared schema.
//!
//! Invalid rows are never fatal: each one is logged, recorded in the
//! [`ValidationReport`] and dropped from the output table.

use crate::data::schema::{AGE, CITY, ColumnType, NAME, RecordSchema, SALES, SalesRecord};
use crate::data::source::RawTable;
use crate::error::RowValidationError;
use serde::Serialize;

/// Validated rows plus the column set of the table they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedTable {
    pub columns: Vec<String>,
    pub records: Vec<SalesRecord>,
}

impl ValidatedTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Outcome counts for a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub errors: Vec<RowValidationError>,
}

/// A single coerced field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl FieldValue {
    fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }
}

/// Coerce a raw CSV field to `dtype`.
pub fn coerce(raw: &str, dtype: ColumnType) -> Result<FieldValue, String> {
    match dtype {
        ColumnType::String => {
            if raw.trim().is_empty() {
                Err("missing value".to_string())
            } else {
                Ok(FieldValue::String(raw.to_string()))
            }
        }
        ColumnType::Integer => {
            let s = raw.trim();
            if let Ok(n) = s.parse::<i64>() {
                return Ok(FieldValue::Integer(n));
            }
            // Integral floats such as "30.0" are accepted.
            match s.parse::<f64>() {
                Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                    Ok(FieldValue::Integer(f as i64))
                }
                Ok(f) => Err(format!("expected an integer, got {f}")),
                Err(_) => Err(format!("expected an integer, got '{raw}'")),
            }
        }
        ColumnType::Float => match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(FieldValue::Float(f)),
            Ok(_) => Err(format!("expected a finite number, got '{raw}'")),
            Err(_) => Err(format!("expected a number, got '{raw}'")),
        },
    }
}

/// Validate every row of `raw` against `schema`, keeping valid rows in order.
pub fn validate_table(raw: RawTable, schema: &RecordSchema) -> (ValidatedTable, ValidationReport) {
    let positions = schema.positions(&raw.columns);
    let mut report = ValidationReport {
        total_rows: raw.rows.len(),
        ..Default::default()
    };
    let mut records = Vec::with_capacity(raw.rows.len());

    for (row_index, row) in raw.rows.iter().enumerate() {
        match validate_row(row_index, row, &positions, schema) {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(
                    row = row_index,
                    column = %err.column,
                    data = ?row,
                    "Invalid data in row: {}",
                    err.reason
                );
                report.errors.push(err);
            }
        }
    }

    report.valid_rows = records.len();
    report.invalid_rows = report.errors.len();
    if report.invalid_rows > 0 {
        tracing::warn!("Dropped {} invalid rows.", report.invalid_rows);
    }
    tracing::info!(
        valid = report.valid_rows,
        invalid = report.invalid_rows,
        "Validation complete"
    );

    (
        ValidatedTable {
            columns: raw.columns,
            records,
        },
        report,
    )
}

fn validate_row(
    row_index: usize,
    row: &[String],
    positions: &[Option<usize>],
    schema: &RecordSchema,
) -> Result<SalesRecord, RowValidationError> {
    let reject = |column: &str, reason: String| RowValidationError {
        row_index,
        column: column.to_string(),
        reason,
    };

    let mut values = Vec::with_capacity(schema.columns.len());
    for (col, pos) in schema.columns.iter().zip(positions) {
        let raw = pos
            .and_then(|p| row.get(p))
            .ok_or_else(|| reject(col.name, "missing column".to_string()))?;
        let value = coerce(raw, col.dtype).map_err(|reason| reject(col.name, reason))?;
        values.push(value);
    }

    build_record(schema, &values)
        .ok_or_else(|| reject("*", "row does not match the sales record layout".to_string()))
}

fn build_record(schema: &RecordSchema, values: &[FieldValue]) -> Option<SalesRecord> {
    let get = |name: &str| schema.index_of(name).and_then(|i| values.get(i));
    Some(SalesRecord {
        name: get(NAME)?.as_str()?.to_string(),
        age: get(AGE)?.as_i64()?,
        city: get(CITY)?.as_str()?.to_string(),
        sales: get(SALES)?.as_f64()?,
    })
}
