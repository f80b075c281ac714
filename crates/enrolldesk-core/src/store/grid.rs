//! Conversion between 2-D string grids and records, plus CSV import/export.

use std::io::{Read, Write};

use serde_json::Value;

use super::{RawRecord, StoreError};

/// A sheet as rows of cells. Row 0 is the header.
pub type Grid = Vec<Vec<String>>;

/// Render a cell value the way a spreadsheet stores it
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Turn a grid into records keyed by the header row.
///
/// Blank header cells are skipped, short rows are padded with empty strings,
/// and fully blank rows are dropped.
pub fn records_from_grid(grid: &[Vec<String>]) -> Vec<RawRecord> {
    let Some((header, rows)) = grid.split_first() else {
        return Vec::new();
    };

    rows.iter()
        .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            let mut record = RawRecord::new();
            for (i, name) in header.iter().enumerate() {
                if name.trim().is_empty() {
                    continue;
                }
                let cell = row.get(i).cloned().unwrap_or_default();
                record
                    .entry(name.clone())
                    .or_insert(Value::String(cell));
            }
            record
        })
        .collect()
}

/// Turn records back into a grid.
///
/// The header is the union of all field names in first-appearance order.
pub fn grid_from_records(records: &[RawRecord]) -> Grid {
    let mut header: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !header.iter().any(|h| h == key) {
                header.push(key.clone());
            }
        }
    }

    let mut grid = Vec::with_capacity(records.len() + 1);
    for record in records {
        grid.push(
            header
                .iter()
                .map(|key| record.get(key).map(cell_text).unwrap_or_default())
                .collect(),
        );
    }
    grid.insert(0, header);
    grid
}

/// Read a CSV document into a grid (no header interpretation)
pub fn read_csv_grid<R: Read>(reader: R) -> Result<Grid, StoreError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut grid = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        grid.push(row.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

/// Write a grid as CSV
pub fn write_csv_grid<W: Write>(grid: &[Vec<String>], writer: W) -> Result<(), StoreError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(writer);
    for row in grid {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
