use crate::error::Result;
use crate::importer::{coerce_amount, coerce_timestamp};
use crate::models::{COL_DATE, COL_PAYMENT_AMOUNT};
use crate::table::{Cell, Table};

pub const DEFAULT_TOP_N: usize = 5;

/// The `n` largest transactions by payment amount, largest first.
///
/// Ties keep their original order. Payment amounts given as text are written
/// back as numbers; rows where that fails are dropped. Text operation dates are
/// written back as timestamps when they parse and kept as-is otherwise.
pub fn top_transactions(table: &Table, n: usize) -> Result<Table> {
    let amount_idx = table.require_columns(&[COL_PAYMENT_AMOUNT])?[0];
    let date_idx = table.column_index(COL_DATE);

    let mut ranked: Vec<(f64, Vec<Cell>)> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let amount = coerce_amount(&row[amount_idx])?;
            let mut row = row.clone();
            row[amount_idx] = Cell::Number(amount);
            if let Some(i) = date_idx {
                if let Some(ts) = coerce_timestamp(&row[i]) {
                    row[i] = Cell::DateTime(ts);
                }
            }
            Some((amount, row))
        })
        .collect();

    // sort_by is stable, so equal amounts stay in table order
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    let rows = ranked.into_iter().take(n).map(|(_, row)| row).collect();
    Ok(table.with_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpendError;
    use crate::models::COL_OPERATION_AMOUNT;
    use chrono::NaiveDate;

    fn payments() -> Table {
        let mut t = Table::new([COL_PAYMENT_AMOUNT, COL_DATE]);
        for (i, amount) in ["1000.50", "500.20", "1500.00", "2000.99", "50.75"].iter().enumerate() {
            let date = NaiveDate::from_ymd_opt(2023, 1, 1 + i as u32 * 7)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            t.push_row(vec![Cell::from(*amount), date.into()]);
        }
        t
    }

    #[test]
    fn test_get_top_transactions() {
        let top = top_transactions(&payments(), 3).unwrap();
        assert_eq!(top.len(), 3);
        let amounts: Vec<&Cell> = top.rows().iter().map(|r| &r[0]).collect();
        assert_eq!(
            amounts,
            vec![&Cell::Number(2000.99), &Cell::Number(1500.0), &Cell::Number(1000.5)]
        );
        let records = top.to_records();
        assert_eq!(records[0][COL_PAYMENT_AMOUNT], 2000.99);
        assert_eq!(records[0][COL_DATE], "2023-01-22 00:00:00");
    }

    #[test]
    fn test_text_dates_are_formatted_in_records() {
        let mut t = Table::new([COL_DATE, COL_PAYMENT_AMOUNT]);
        t.push_row(vec!["01.10.2023 12:00:00".into(), (-100.0).into()]);
        t.push_row(vec!["not a date".into(), (-50.0).into()]);
        t.push_row(vec![Cell::Null, (-10.0).into()]);
        let top = top_transactions(&t, 5).unwrap();
        assert_eq!(top.len(), 3);
        let records = top.to_records();
        assert!(records[0][COL_DATE].is_null());
        assert_eq!(records[1][COL_DATE], "not a date");
        assert_eq!(records[2][COL_DATE], "2023-10-01 12:00:00");
    }

    #[test]
    fn test_get_top_transactions_invalid_sum() {
        let t = payments();
        let mut rows = t.rows().to_vec();
        rows[0][0] = Cell::text("invalid");
        let top = top_transactions(&t.with_rows(rows), 5).unwrap();
        assert_eq!(top.len(), 4);
    }

    #[test]
    fn test_top_n_bounds() {
        assert!(top_transactions(&payments(), 0).unwrap().is_empty());
        assert_eq!(top_transactions(&payments(), 50).unwrap().len(), 5);
    }

    #[test]
    fn test_top_n_is_stable_on_ties() {
        let mut t = Table::new([COL_PAYMENT_AMOUNT, "Описание"]);
        t.push_row(vec![100.0.into(), "first".into()]);
        t.push_row(vec![200.0.into(), "big".into()]);
        t.push_row(vec![Cell::text("100,0"), "second".into()]);
        t.push_row(vec![100.0.into(), "third".into()]);
        let top = top_transactions(&t, 3).unwrap();
        let names: Vec<&str> = top.rows().iter().filter_map(|r| r[1].as_text()).collect();
        assert_eq!(names, vec!["big", "first", "second"]);
    }

    #[test]
    fn test_top_n_excluded_rows_are_not_larger() {
        let t = payments();
        let top = top_transactions(&t, 2).unwrap();
        let kept: Vec<f64> = top.rows().iter().filter_map(|r| coerce_amount(&r[0])).collect();
        let min_kept = kept.iter().copied().fold(f64::MAX, f64::min);
        for amount in t.rows().iter().filter_map(|r| coerce_amount(&r[0])) {
            if !kept.contains(&amount) {
                assert!(amount <= min_kept);
            }
        }
    }

    #[test]
    fn test_get_top_transactions_missing_columns() {
        let mut t = Table::new([COL_OPERATION_AMOUNT]);
        t.push_row(vec![1000.0.into()]);
        assert!(matches!(top_transactions(&t, 5), Err(SpendError::Schema(_))));
    }
}
