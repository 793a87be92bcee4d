use std::path::Path;

use crate::error::{Result, SpendError};
use crate::importer::SourceKind;
use crate::models::SOURCE_DATETIME_FORMAT;
use crate::table::{Cell, Table};

fn cell_text(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => n.to_string(),
        Cell::DateTime(dt) => dt.format(SOURCE_DATETIME_FORMAT).to_string(),
    }
}

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(cell_text))?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(feature = "xlsx")]
pub fn write_xlsx(table: &Table, path: &Path) -> Result<()> {
    use rust_xlsxwriter::Workbook;

    let xlsx_err = |e: rust_xlsxwriter::XlsxError| SpendError::Xlsx(e.to_string());
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in table.columns().iter().enumerate() {
        sheet.write_string(0, col as u16, name).map_err(xlsx_err)?;
    }
    for (i, row) in table.rows().iter().enumerate() {
        let r = i as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Null => {}
                Cell::Number(n) => {
                    sheet.write_number(r, col, *n).map_err(xlsx_err)?;
                }
                other => {
                    sheet.write_string(r, col, cell_text(other)).map_err(xlsx_err)?;
                }
            }
        }
    }
    workbook.save(path).map_err(xlsx_err)?;
    Ok(())
}

#[cfg(not(feature = "xlsx"))]
pub fn write_xlsx(_table: &Table, path: &Path) -> Result<()> {
    Err(SpendError::UnsupportedFormat(format!(
        "{} (built without the `xlsx` feature)",
        path.display()
    )))
}

/// Write `table` in the format implied by the file extension.
pub fn export_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match SourceKind::from_path(path)? {
        SourceKind::Csv => write_csv(table, path)?,
        SourceKind::Xlsx => write_xlsx(table, path)?,
    }
    tracing::info!(rows = table.len(), path = %path.display(), "transactions exported");
    Ok(())
}
