//! Synthetic sales data for manual testing of the pipeline.
//!
//! Independent of the pipeline at runtime; it only writes a CSV that the
//! loader can read.

use crate::data::schema::{SALES_SCHEMA, SalesRecord};
use crate::error::PipelineError;
use crate::persistence::atomic_write;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

pub const CITIES: [&str; 20] = [
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Phoenix",
    "Philadelphia",
    "San Antonio",
    "San Diego",
    "Dallas",
    "San Jose",
    "Austin",
    "Jacksonville",
    "Fort Worth",
    "Columbus",
    "Charlotte",
    "San Francisco",
    "Indianapolis",
    "Seattle",
    "Denver",
    "Washington",
];

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Carlos", "Aisha", "Wei", "Priya", "Mateo", "Yuki",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Nguyen", "Patel", "Kim", "Chen",
];

pub const DEFAULT_ROWS: usize = 10_000;
pub const MIN_AGE: i64 = 20;
pub const MAX_AGE: i64 = 60;
pub const MIN_SALES: i64 = 10_000;
pub const MAX_SALES: i64 = 50_000;

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.gen_range(0..items.len())]
}

/// Produce `rows` random records.
pub fn generate_records<R: Rng>(rng: &mut R, rows: usize) -> Vec<SalesRecord> {
    (0..rows)
        .map(|_| SalesRecord {
            name: format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
            age: rng.gen_range(MIN_AGE..=MAX_AGE),
            city: pick(rng, &CITIES).to_string(),
            sales: rng.gen_range(MIN_SALES..=MAX_SALES) as f64,
        })
        .collect()
}

/// Serialize records as CSV with the `name,age,city,sales` header.
pub fn to_csv(records: &[SalesRecord]) -> Result<Vec<u8>, PipelineError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SALES_SCHEMA.column_names())?;
    for r in records {
        writer.write_record([
            r.name.clone(),
            r.age.to_string(),
            r.city.clone(),
            // Whole-number sales are written without a fractional part.
            if r.sales.fract() == 0.0 {
                format!("{}", r.sales as i64)
            } else {
                r.sales.to_string()
            },
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| PipelineError::Io(e.into_error()))
}

/// Write `rows` random records to `path`. A `seed` makes the output reproducible.
pub fn write_fake_csv(path: &Path, rows: usize, seed: Option<u64>) -> Result<usize, PipelineError> {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };
    let records = generate_records(&mut rng, rows);
    atomic_write(path, &to_csv(&records)?)?;
    tracing::info!(rows, path = %path.display(), "Generated synthetic sales data");
    Ok(records.len())
}
