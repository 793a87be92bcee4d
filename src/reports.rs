use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::fmt::pretty_json;
use crate::importer::{coerce_amount, coerce_timestamp, parse_reference_date};
use crate::models::{round2, CategorySpending, COL_CATEGORY, COL_DATE, COL_OPERATION_AMOUNT};
use crate::table::Table;
use crate::window::DateWindow;

// ---------------------------------------------------------------------------
// Report persistence
// ---------------------------------------------------------------------------

/// Where a computed report is written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTarget {
    pub dir: PathBuf,
    pub file_name: String,
}

impl ReportTarget {
    /// `<reports_dir>/report_<name>.json`
    pub fn named(reports_dir: &Path, name: &str) -> Self {
        Self {
            dir: reports_dir.to_path_buf(),
            file_name: format!("report_{name}.json"),
        }
    }

    pub fn with_file_name(mut self, file_name: Option<&str>) -> Self {
        if let Some(f) = file_name.filter(|f| !f.is_empty()) {
            self.file_name = f.to_string();
        }
        self
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Write `report` as pretty JSON, creating the target directory if needed.
pub fn save_report<T: Serialize + ?Sized>(report: &T, target: &ReportTarget) -> Result<PathBuf> {
    std::fs::create_dir_all(&target.dir)?;
    let path = target.path();
    std::fs::write(&path, format!("{}\n", pretty_json(report)?))?;
    tracing::info!(path = %path.display(), "report saved");
    Ok(path)
}

/// Run `compute`, persist its output to `target`, and hand the output back.
pub fn persist_report<T, F>(target: &ReportTarget, compute: F) -> Result<T>
where
    T: Serialize,
    F: FnOnce() -> Result<T>,
{
    let report = compute()?;
    save_report(&report, target)?;
    Ok(report)
}

// ---------------------------------------------------------------------------
// Spending by category
// ---------------------------------------------------------------------------

/// Spend in one category over the three months leading up to `date`
/// (`YYYY-MM-DD`, today when absent).
///
/// `total_spent` is the absolute value of the summed operation amounts, so a
/// ledger that records purchases as negatives still reports positive spend.
pub fn spending_by_category(
    table: &Table,
    category: &str,
    date: Option<&str>,
) -> Result<CategorySpending> {
    let reference = match date {
        Some(d) => parse_reference_date(d)?,
        None => chrono::Local::now().naive_local(),
    };
    let window = DateWindow::three_months_to_date(reference);
    let idx = table.require_columns(&[COL_DATE, COL_CATEGORY, COL_OPERATION_AMOUNT])?;
    let (date_idx, cat_idx, amount_idx) = (idx[0], idx[1], idx[2]);

    let total: f64 = table
        .rows()
        .iter()
        .filter(|row| row[cat_idx].as_text() == Some(category))
        .filter(|row| coerce_timestamp(&row[date_idx]).is_some_and(|ts| window.contains(ts)))
        .filter_map(|row| coerce_amount(&row[amount_idx]))
        .sum();

    tracing::info!(category, "category spending report built");
    Ok(CategorySpending {
        category: category.to_string(),
        total_spent: round2(total.abs()),
        from_date: window.start.format("%Y-%m-%d").to_string(),
        to_date: window.end.format("%Y-%m-%d").to_string(),
    })
}
