//! Conversion of transport files to CSV, and loading of converted files
//!
//! These functions do blocking file I/O; async callers run them on the
//! blocking thread pool.

use crate::error::{Error, Result};
use crate::types::{Column, ColumnKind, Table, Value};
use crate::xpt;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Decode `source` and write it to `output` as CSV, logging any failure
///
/// Returns the decoded table, or `None` if decoding or writing failed.
pub fn convert(source: &Path, output: &Path) -> Option<Table> {
    let name = source.file_name().unwrap_or_default().to_string_lossy();
    info!(file = %name, "converting to CSV");

    match try_convert(source, output) {
        Ok(table) => {
            let (rows, columns) = table.shape();
            info!(path = %output.display(), rows, columns, "converted");
            Some(table)
        }
        Err(e) => {
            error!(path = %source.display(), error = %e, "conversion failed");
            None
        }
    }
}

/// Decode `source` and write it to `output` as CSV
pub fn try_convert(source: &Path, output: &Path) -> Result<Table> {
    let table = xpt::read_file(source)?;
    write_csv(&table, output)?;
    Ok(table)
}

/// Write `table` to `path`: a header of column names, then one line per row
///
/// Missing cells are empty fields. No index column is added. The file is
/// written under a sibling `.part` name and renamed into place once
/// complete, so `path` never holds a partial CSV.
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let staging = staging_path(path);
    if let Err(e) = write_records(table, &staging) {
        let _ = std::fs::remove_file(&staging);
        return Err(e);
    }
    std::fs::rename(&staging, path)?;
    Ok(())
}

fn write_records(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;

    writer
        .write_record(table.columns.iter().map(|c| c.name.as_str()))
        .map_err(|e| Error::csv(path, e))?;

    let mut fields = Vec::with_capacity(table.column_count());
    for row in &table.rows {
        fields.clear();
        fields.extend(row.iter().map(Value::to_string));
        writer
            .write_record(&fields)
            .map_err(|e| Error::csv(path, e))?;
    }

    writer.flush()?;
    Ok(())
}

/// `DEMO_J.csv` is staged as `DEMO_J.csv.part`
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}

/// Load a previously converted CSV
///
/// Empty fields load as [`Value::Missing`], fields that parse as numbers as
/// [`Value::Number`], everything else as [`Value::Text`]. An empty file and a
/// record whose field count differs from the header are errors.
pub fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| Error::csv(path, e))?;

    let headers = reader.headers().map_err(|e| Error::csv(path, e))?.clone();
    if headers.is_empty() {
        return Err(Error::EmptyCsv {
            path: path.to_path_buf(),
        });
    }
    let mut columns: Vec<Column> = headers
        .iter()
        .map(|name| Column::new(name, ColumnKind::Numeric))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        let row: Vec<Value> = record.iter().map(parse_field).collect();
        for (column, value) in columns.iter_mut().zip(&row) {
            if value.as_str().is_some() {
                column.kind = ColumnKind::Text;
            }
        }
        rows.push(row);
    }

    Ok(Table {
        name: String::new(),
        label: String::new(),
        columns,
        rows,
    })
}

fn parse_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Missing;
    }
    match field.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::Text(field.to_string()),
    }
}
