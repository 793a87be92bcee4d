//! Standalone analyses over the full, unfiltered ledger.
//!
//! Both entry points hand back a JSON string and never an `Err`: any failure
//! is reported as `{"error": "..."}` so callers can print or store the result
//! without branching.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use chrono::Datelike;
use regex::Regex;
use serde::Serialize;

use crate::error::Result;
use crate::fmt::{error_payload, pretty_json};
use crate::importer::{coerce_amount, coerce_timestamp, load_table, with_numeric_columns};
use crate::models::{
    round2, COL_CASHBACK, COL_CATEGORY, COL_DATE, COL_DESCRIPTION, COL_OPERATION_AMOUNT,
    COL_PAYMENT_AMOUNT, TRANSFER_CATEGORY,
};
use crate::table::{Cell, Table};

/// Share of spend credited back when the ledger has no cashback column.
pub const ESTIMATED_CASHBACK_RATE: f64 = 0.05;

fn into_payload<T: Serialize>(result: Result<T>, context: &str) -> String {
    match result.and_then(|value| pretty_json(&value)) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("{context}: {e}");
            error_payload(&e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Cashback by category
// ---------------------------------------------------------------------------

/// Cashback per category for one calendar month.
///
/// Uses the `Кэшбэк` column when present; otherwise estimates cashback as 5%
/// of the category's absolute spend. With a threshold, only categories whose
/// cashback is strictly above it are kept.
pub fn cashback_by_category(
    table: &Table,
    year: i32,
    month: u32,
    threshold: Option<f64>,
) -> Result<BTreeMap<String, f64>> {
    let (value_col, estimate) = if table.has_column(COL_CASHBACK) {
        (COL_CASHBACK, false)
    } else {
        (COL_OPERATION_AMOUNT, true)
    };
    let idx = table.require_columns(&[COL_DATE, COL_CATEGORY, value_col])?;
    let (date_idx, cat_idx, value_idx) = (idx[0], idx[1], idx[2]);

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in table.rows() {
        let Some(ts) = coerce_timestamp(&row[date_idx]) else {
            continue;
        };
        if ts.year() != year || ts.month() != month {
            continue;
        }
        let (Some(category), Some(value)) = (row[cat_idx].as_text(), coerce_amount(&row[value_idx]))
        else {
            continue;
        };
        *totals.entry(category.to_string()).or_default() += value;
    }

    if totals.is_empty() {
        tracing::info!(year, month, "no transactions for the requested month");
        return Ok(totals);
    }

    let result: BTreeMap<String, f64> = totals
        .into_iter()
        .map(|(category, total)| {
            let cashback = if estimate {
                round2(total.abs() * ESTIMATED_CASHBACK_RATE)
            } else {
                round2(total)
            };
            (category, cashback)
        })
        .filter(|(_, cashback)| threshold.map_or(true, |t| *cashback > t))
        .collect();
    tracing::info!(categories = result.len(), "cashback analysis finished");
    Ok(result)
}

/// JSON form of [`cashback_by_category`]; failures become `{"error": ...}`.
pub fn analyze_cashback_categories(
    table: &Table,
    year: i32,
    month: u32,
    threshold: Option<f64>,
) -> String {
    into_payload(
        cashback_by_category(table, year, month, threshold),
        "cashback analysis failed",
    )
}

// ---------------------------------------------------------------------------
// Transfers to individuals
// ---------------------------------------------------------------------------

fn person_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Surname followed by an initial: "Иванов И."
    RE.get_or_init(|| Regex::new(r"\p{Lu}\p{Ll}+ \p{Lu}\.").expect("valid name pattern"))
}

pub fn looks_like_person(description: &str) -> bool {
    person_name_re().is_match(description)
}

/// Rows filed under `Переводы` whose description names a person.
pub fn transfers_to_individuals(table: &Table) -> Result<Table> {
    let idx = table.require_columns(&[COL_CATEGORY, COL_DESCRIPTION])?;
    let (cat_idx, desc_idx) = (idx[0], idx[1]);

    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter(|row| row[cat_idx].as_text() == Some(TRANSFER_CATEGORY))
        .filter(|row| row[desc_idx].as_text().is_some_and(looks_like_person))
        .cloned()
        .collect();
    Ok(table.with_rows(rows))
}

fn transfers_in_file(path: &Path) -> Result<Vec<serde_json::Map<String, serde_json::Value>>> {
    let table = load_table(path)?;
    let transfers = transfers_to_individuals(&table)?;
    tracing::info!(found = transfers.len(), "transfers to individuals");
    let amounts = [COL_OPERATION_AMOUNT, COL_PAYMENT_AMOUNT, COL_CASHBACK];
    Ok(with_numeric_columns(&transfers, &amounts).to_records())
}

/// Load `path` and list transfers to individuals as a JSON array of rows.
pub fn find_transfers_to_individuals(path: &Path) -> String {
    into_payload(transfers_in_file(path), "transfer search failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> serde_json::Value {
        serde_json::from_str(json).unwrap()
    }

    fn cashback_table() -> Table {
        let mut t = Table::new([COL_DATE, COL_CATEGORY, COL_CASHBACK]);
        t.push_row(vec!["01.10.2023 12:00:00".into(), "РЖД".into(), 50.0.into()]);
        t.push_row(vec!["15.08.2023 14:00:00".into(), "РЖД".into(), 120.0.into()]);
        t.push_row(vec!["10.07.2023 18:00:00".into(), "Такси".into(), 30.0.into()]);
        t.push_row(vec!["20.10.2023 09:30:00".into(), "Такси".into(), Cell::text("12,5")]);
        t
    }

    #[test]
    fn test_analyze_cashback_categories() {
        let result = parse(&analyze_cashback_categories(&cashback_table(), 2023, 10, None));
        assert_eq!(result["РЖД"], 50.0);
        assert_eq!(result["Такси"], 12.5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let result = cashback_by_category(&cashback_table(), 2023, 10, Some(12.5)).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result["РЖД"], 50.0);

        let result = cashback_by_category(&cashback_table(), 2023, 10, Some(50.0)).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_analyze_cashback_categories_no_data() {
        let json = analyze_cashback_categories(&cashback_table(), 2023, 11, None);
        assert_eq!(parse(&json), serde_json::json!({}));
    }

    #[test]
    fn test_estimates_cashback_from_spend_without_cashback_column() {
        let mut t = Table::new([COL_DATE, COL_CATEGORY, COL_OPERATION_AMOUNT]);
        t.push_row(vec!["01.10.2023 12:00:00".into(), "Супермаркеты".into(), (-500.0).into()]);
        t.push_row(vec!["11.10.2023 12:00:00".into(), "Супермаркеты".into(), (-300.0).into()]);
        t.push_row(vec!["12.10.2023 12:00:00".into(), "Супермаркеты".into(), Cell::text("oops")]);
        t.push_row(vec!["not a date".into(), "Супермаркеты".into(), (-900.0).into()]);
        let result = cashback_by_category(&t, 2023, 10, None).unwrap();
        assert_eq!(result["Супермаркеты"], 40.0);
    }

    #[test]
    fn test_analyze_cashback_categories_invalid_columns() {
        let mut t = Table::new(["Дата", COL_CATEGORY, "Сумма"]);
        t.push_row(vec!["01.10.2023 12:00:00".into(), "РЖД".into(), 50.0.into()]);
        let result = parse(&analyze_cashback_categories(&t, 2023, 10, None));
        let message = result["error"].as_str().unwrap();
        assert!(message.contains(COL_DATE), "got: {message}");
        assert!(message.contains(COL_OPERATION_AMOUNT), "got: {message}");
    }

    #[test]
    fn test_looks_like_person() {
        assert!(looks_like_person("Иванов И."));
        assert!(looks_like_person("Перевод: Петров П."));
        assert!(looks_like_person("Smith J."));
        assert!(!looks_like_person("ООО Ромашка"));
        assert!(!looks_like_person("Магазин 'Пятерочка'"));
        assert!(!looks_like_person("иванов и."));
    }

    fn transfers_table() -> Table {
        let mut t = Table::new([COL_CATEGORY, COL_DESCRIPTION]);
        t.push_row(vec!["Переводы".into(), "Иванов И.".into()]);
        t.push_row(vec!["Переводы".into(), "Петров П.".into()]);
        t.push_row(vec!["Переводы".into(), "ООО Ромашка".into()]);
        t.push_row(vec!["Переводы".into(), Cell::Null]);
        t.push_row(vec!["Продукты".into(), "Сидоров С.".into()]);
        t
    }

    #[test]
    fn test_transfers_to_individuals() {
        let found = transfers_to_individuals(&transfers_table()).unwrap();
        assert_eq!(found.len(), 2);
        let descriptions: Vec<&str> = found.rows().iter().filter_map(|r| r[1].as_text()).collect();
        assert_eq!(descriptions, vec!["Иванов И.", "Петров П."]);
    }

    #[test]
    fn test_find_transfers_to_individuals_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operations.csv");
        std::fs::write(
            &path,
            "Категория,Описание,Сумма операции\n\
             Переводы,Иванов И.,\"-1 000,50\"\n\
             Переводы,Петров П.,-200\n\
             Продукты,Магазин 'Пятерочка',-300\n\
             Переводы,,-50\n",
        )
        .unwrap();
        let result = parse(&find_transfers_to_individuals(&path));
        let items = result.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i["Категория"] == "Переводы"));
        assert_eq!(items[0]["Сумма операции"], -1000.5);
        assert_eq!(items[1]["Сумма операции"], -200.0);
    }

    #[cfg(feature = "xlsx")]
    #[test]
    fn test_find_transfers_to_individuals_from_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("operations.xlsx");
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        let rows = [
            ("Категория", "Описание"),
            ("Переводы", "Иванов И."),
            ("Переводы", "Петров П."),
            ("Продукты", "Магазин 'Пятерочка'"),
        ];
        for (i, (cat, desc)) in rows.iter().enumerate() {
            sheet.write_string(i as u32, 0, *cat).unwrap();
            sheet.write_string(i as u32, 1, *desc).unwrap();
        }
        workbook.save(&path).unwrap();

        let result = parse(&find_transfers_to_individuals(&path));
        assert_eq!(result.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_find_transfers_to_individuals_no_file() {
        let result = parse(&find_transfers_to_individuals(Path::new("nonexistent_file.xlsx")));
        assert!(result["error"].as_str().unwrap().contains("not found"));
    }

    #[test]
    fn test_find_transfers_to_individuals_invalid_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid_operations.csv");
        std::fs::write(&path, "Категория,Сумма\nПереводы,1000\n").unwrap();
        let result = parse(&find_transfers_to_individuals(&path));
        assert!(result["error"].as_str().unwrap().contains(COL_DESCRIPTION));
    }
}
