//! Declared record schemas shared by the loader, validator, aggregator and sink.

use serde::{Deserialize, Serialize};

pub const NAME: &str = "name";
pub const AGE: &str = "age";
pub const CITY: &str = "city";
pub const SALES: &str = "sales";

pub const TOTAL_SALES: &str = "total_sales";
pub const AVERAGE_AGE: &str = "average_age";

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
}

impl ColumnType {
    /// SQLite storage type for this column type.
    pub fn sql_type(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::String => "TEXT",
        }
    }
}

/// Schema for a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnSchema {
    pub name: &'static str,
    pub dtype: ColumnType,
}

/// Ordered set of typed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordSchema {
    pub columns: &'static [ColumnSchema],
}

/// Input record layout: `name,age,city,sales`.
pub const SALES_SCHEMA: RecordSchema = RecordSchema {
    columns: &[
        ColumnSchema {
            name: NAME,
            dtype: ColumnType::String,
        },
        ColumnSchema {
            name: AGE,
            dtype: ColumnType::Integer,
        },
        ColumnSchema {
            name: CITY,
            dtype: ColumnType::String,
        },
        ColumnSchema {
            name: SALES,
            dtype: ColumnType::Float,
        },
    ],
};

/// Output layout of the per-city summary table.
pub const SUMMARY_SCHEMA: RecordSchema = RecordSchema {
    columns: &[
        ColumnSchema {
            name: CITY,
            dtype: ColumnType::String,
        },
        ColumnSchema {
            name: TOTAL_SALES,
            dtype: ColumnType::Float,
        },
        ColumnSchema {
            name: AVERAGE_AGE,
            dtype: ColumnType::Float,
        },
    ],
};

impl RecordSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Schema columns that do not appear in `header`. Matching is exact.
    pub fn missing_columns(&self, header: &[String]) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !header.iter().any(|h| h == c.name))
            .map(|c| c.name)
            .collect()
    }

    /// Position of each schema column within `header`, in schema order.
    pub fn positions(&self, header: &[String]) -> Vec<Option<usize>> {
        self.columns
            .iter()
            .map(|c| header.iter().position(|h| h == c.name))
            .collect()
    }

    /// Column list for a `CREATE TABLE` statement.
    pub fn sql_columns(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.dtype.sql_type()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One validated sales row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub name: String,
    pub age: i64,
    pub city: String,
    pub sales: f64,
}
