//! Tabular rendering of statement results.
//!
//! Prints a header, a rule, one line per record and a row count. Records
//! are pulled from the stream one at a time and written immediately.

use futures::StreamExt;

use crate::console::Console;
use crate::db::{Record, RecordStream, Value};
use crate::error::Result;

/// Separator between cells, in the header and in every row.
pub const SEPARATOR: &str = " | ";

/// Printed when a statement returns no columns at all.
pub const NO_TABULAR_OUTPUT: &str = "Statement executed, no tabular output to display.";

/// Printed when a statement returns columns but no rows.
pub const NO_RESULTS: &str = "(No results found)";

/// What the renderer printed for one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderedReport {
    /// The statement had no columns; no rows were pulled.
    NoColumns,
    /// Header printed, zero rows.
    Empty,
    /// Header printed followed by this many rows.
    Rows(usize),
}

impl RenderedReport {
    /// Number of body lines printed.
    pub fn row_count(&self) -> usize {
        match self {
            Self::NoColumns | Self::Empty => 0,
            Self::Rows(count) => *count,
        }
    }
}

/// Renders a result set to the console.
///
/// Formatting never fails. An error is returned only when the record
/// stream itself fails; rows already printed stay printed.
pub async fn render(
    columns: &[String],
    mut rows: RecordStream,
    console: &mut Console,
) -> Result<RenderedReport> {
    if columns.is_empty() {
        console.line(NO_TABULAR_OUTPUT);
        return Ok(RenderedReport::NoColumns);
    }

    let header = columns.join(SEPARATOR);
    console.line(&header);
    console.line("-".repeat(header.chars().count()));

    let mut count = 0usize;
    while let Some(record) = rows.next().await {
        console.line(format_row(columns, &record?));
        count += 1;
    }

    if count == 0 {
        console.line(NO_RESULTS);
        Ok(RenderedReport::Empty)
    } else {
        console.line(format!("({count} lines returned)"));
        Ok(RenderedReport::Rows(count))
    }
}

/// Formats one record in column order. Missing columns render as NULL.
pub fn format_row(columns: &[String], record: &Record) -> String {
    columns
        .iter()
        .map(|column| match record.get(column) {
            Some(value) => value.to_display_string(),
            None => Value::Null.to_display_string(),
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}
