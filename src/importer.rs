use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Result, SpendError};
use crate::models::SOURCE_DATETIME_FORMAT;
use crate::table::{Cell, Table};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse an amount written with either `.` or `,` as the decimal separator.
/// Spaces (including the non-breaking kind banks use for thousands) are ignored.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Numeric value of a cell, or `None` when the row has to be dropped.
pub fn coerce_amount(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(*n),
        Cell::Text(s) => parse_amount(s),
        _ => None,
    }
}

pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), SOURCE_DATETIME_FORMAT).ok()
}

/// Timestamp of a cell: structured values pass through, text must match the
/// source layout exactly.
pub fn coerce_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Text(s) => parse_timestamp(s),
        _ => None,
    }
}

/// Copy of `table` with the amounts in `columns` stored as numbers.
/// Cells that do not parse are left as they are.
pub fn with_numeric_columns(table: &Table, columns: &[&str]) -> Table {
    let idx: Vec<usize> = columns.iter().filter_map(|c| table.column_index(c)).collect();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let mut row = row.clone();
            for &i in &idx {
                if let Some(n) = coerce_amount(&row[i]) {
                    row[i] = Cell::Number(n);
                }
            }
            row
        })
        .collect();
    table.with_rows(rows)
}

/// Parse a `YYYY-MM-DD` argument to midnight of that day.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| SpendError::DateFormat(raw.to_string()))
}

#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..2_958_466.0).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let seconds = (serial * 86_400.0).round() as i64;
    base.checked_add_signed(chrono::Duration::seconds(seconds))
}

// ---------------------------------------------------------------------------
// Source kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SourceKind {
    Xlsx,
    Csv,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(SpendError::UnsupportedFormat(path.display().to_string())),
        }
    }

    pub fn load(&self, path: &Path) -> Result<Table> {
        match self {
            Self::Xlsx => load_xlsx(path),
            Self::Csv => load_csv(path),
        }
    }
}

/// Load a transaction table from an `.xlsx` or `.csv` export.
pub fn load_table(path: &Path) -> Result<Table> {
    if !path.exists() {
        return Err(SpendError::NotFound(path.to_path_buf()));
    }
    let table = SourceKind::from_path(path)?.load(path)?;
    tracing::info!(rows = table.len(), path = %path.display(), "loaded transactions");
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path)?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(std::io::BufReader::new(file));

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let mut table = Table::new(headers);

    for result in rdr.records() {
        let record = result?;
        let row = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    Cell::Null
                } else {
                    Cell::text(field)
                }
            })
            .collect();
        table.push_row(row);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// XLSX (feature-gated)
// ---------------------------------------------------------------------------

#[cfg(feature = "xlsx")]
fn load_xlsx(path: &Path) -> Result<Table> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| SpendError::Xlsx(format!("Failed to open {}: {e}", path.display())))?;
    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SpendError::Xlsx(format!("{} has no sheets", path.display())))?;
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| SpendError::Xlsx(format!("Failed to read sheet '{first_sheet}': {e}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let mut table = Table::new(header.iter().map(|c| c.to_string().trim().to_string()));

    for row in rows {
        let cells = row
            .iter()
            .map(|cell| match cell {
                Data::Empty | Data::Error(_) => Cell::Null,
                Data::String(s) if s.trim().is_empty() => Cell::Null,
                Data::String(s) => Cell::text(s.as_str()),
                Data::Float(f) => Cell::Number(*f),
                Data::Int(i) => Cell::Number(*i as f64),
                Data::Bool(b) => Cell::text(if *b { "TRUE" } else { "FALSE" }),
                Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64()).into(),
                Data::DateTimeIso(s) => {
                    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
                        .map(Cell::DateTime)
                        .unwrap_or_else(|_| Cell::text(s.as_str()))
                }
                Data::DurationIso(s) => Cell::text(s.as_str()),
            })
            .collect();
        table.push_row(cells);
    }
    Ok(table)
}

#[cfg(not(feature = "xlsx"))]
fn load_xlsx(path: &Path) -> Result<Table> {
    Err(SpendError::UnsupportedFormat(format!(
        "{} (built without the `xlsx` feature)",
        path.display()
    )))
}
