//! Result rendering as JSON or a table.

use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table};

use crate::config::OutputFormat;
use crate::error::Result;

/// Renders `value` as pretty JSON, or through `table` in table mode.
pub fn render<T, F>(format: OutputFormat, value: &T, table: F) -> Result<String>
where
    T: Serialize,
    F: FnOnce(&T) -> Table,
{
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => Ok(table(value).to_string()),
    }
}

/// Two-column field/value table.
pub fn key_value_table<I, K>(pairs: I) -> Table
where
    I: IntoIterator<Item = (K, String)>,
    K: Into<String>,
{
    let mut builder = Builder::default();
    builder.push_record(["field".to_string(), "value".to_string()]);
    for (key, value) in pairs {
        builder.push_record([key.into(), value]);
    }
    styled(builder.build())
}

/// Table with a header row and one row per record.
pub fn column_table<H, R>(headers: H, rows: R) -> Table
where
    H: IntoIterator,
    H::Item: Into<String>,
    R: IntoIterator<Item = Vec<String>>,
{
    let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    styled(builder.build())
}

fn styled(mut table: Table) -> Table {
    table.with(Style::rounded());
    table
}

/// Fixed-precision float cell.
pub fn num(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}
