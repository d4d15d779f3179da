//! Group-by-city aggregation.

use crate::data::schema::SALES_SCHEMA;
use crate::data::validate::ValidatedTable;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One per-city summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub city: String,
    pub total_sales: f64,
    pub average_age: f64,
}

/// Aggregation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateOptions {
    /// Decimal places kept on `total_sales` and `average_age`.
    pub precision: u32,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

#[derive(Default)]
struct Accumulator {
    sales: f64,
    age_sum: i128,
    count: usize,
}

/// Group `table` by city and compute `sum(sales)` and `mean(age)` per group.
///
/// Rows are grouped on exact, case-sensitive city text. The result is
/// ordered by city. An empty table gives an empty result; a table whose
/// column set lacks any column of [`SALES_SCHEMA`] is a schema error.
pub fn aggregate_by_city(
    table: &ValidatedTable,
    options: &AggregateOptions,
) -> Result<Vec<AggregateRow>, PipelineError> {
    if let Some(key) = SALES_SCHEMA.missing_columns(&table.columns).first() {
        return Err(PipelineError::schema(format!(
            "Key not found during aggregation: '{key}'"
        )));
    }

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for record in &table.records {
        let acc = groups.entry(record.city.as_str()).or_default();
        acc.sales += record.sales;
        acc.age_sum += i128::from(record.age);
        acc.count += 1;
    }

    let rows: Vec<AggregateRow> = groups
        .into_iter()
        .map(|(city, acc)| AggregateRow {
            city: city.to_string(),
            total_sales: round_to(acc.sales, options.precision),
            average_age: round_to(acc.age_sum as f64 / acc.count as f64, options.precision),
        })
        .collect();

    tracing::info!(groups = rows.len(), "Successfully performed aggregations.");
    Ok(rows)
}

/// Above this magnitude every f64 is a whole number.
const MAX_FRACTIONAL: f64 = 4_503_599_627_370_496.0; // 2^52

/// Round half away from zero to `places` decimal places.
///
/// Values with no representable digits at `places` are returned unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(15) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_FRACTIONAL {
        return value;
    }
    scaled.round() / factor
}
