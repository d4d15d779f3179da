//! Plain-text tables for the data preview and aggregation results.

use salesagg_core::AggregateRow;
use salesagg_core::data::schema::SUMMARY_SCHEMA;

/// Render rows under a header with left-aligned, padded columns.
pub(crate) fn render_table<H: AsRef<str>>(headers: &[H], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.as_ref().chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let w = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(w),
                None => widths.push(w),
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{c:<width$}", width = widths[i]))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.iter().map(|h| h.as_ref()).collect()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

/// Aggregate rows as display cells with `precision` decimal places.
pub(crate) fn aggregate_cells(rows: &[AggregateRow], precision: u32) -> Vec<Vec<String>> {
    let p = precision as usize;
    rows.iter()
        .map(|r| {
            vec![
                r.city.clone(),
                format!("{:.p$}", r.total_sales),
                format!("{:.p$}", r.average_age),
            ]
        })
        .collect()
}

pub(crate) fn render_aggregates(rows: &[AggregateRow], precision: u32) -> String {
    if rows.is_empty() {
        return "(no rows)".to_string();
    }
    render_table(
        SUMMARY_SCHEMA.column_names().as_slice(),
        &aggregate_cells(rows, precision),
    )
}
