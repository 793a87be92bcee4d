use chrono::{Datelike, Duration, NaiveDateTime};

use crate::error::Result;
use crate::importer::{coerce_timestamp, parse_reference_date};
use crate::models::COL_DATE;
use crate::table::{Cell, Table};

/// Inclusive `[start, end]` bounds on the operation timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// From the first day of the reference month up to the reference instant.
    pub fn month_to_date(reference: NaiveDateTime) -> Self {
        Self {
            start: first_of_month(reference),
            end: reference,
        }
    }

    /// From the first day of the month containing `first_of_month(reference) - 90 days`.
    pub fn three_months_to_date(reference: NaiveDateTime) -> Self {
        let back = first_of_month(reference) - Duration::days(90);
        Self {
            start: first_of_month(back),
            end: reference,
        }
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        ts >= self.start && ts <= self.end
    }
}

fn first_of_month(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date()
        .with_day(1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(ts)
}

/// Rows whose timestamp falls inside `window`, with the timestamp column
/// normalized to structured values. Unparseable timestamps are dropped.
pub fn filter_by_window(table: &Table, window: DateWindow) -> Result<Table> {
    let idx = table.require_columns(&[COL_DATE])?[0];
    let mut dropped = 0usize;
    let rows: Vec<Vec<Cell>> = table
        .rows()
        .iter()
        .filter_map(|row| {
            let Some(ts) = coerce_timestamp(&row[idx]) else {
                dropped += 1;
                return None;
            };
            if !window.contains(ts) {
                return None;
            }
            let mut row = row.clone();
            row[idx] = Cell::DateTime(ts);
            Some(row)
        })
        .collect();
    if dropped > 0 {
        tracing::debug!(dropped, "rows without a valid operation date");
    }
    Ok(table.with_rows(rows))
}

/// Restrict `table` to `[first day of the month, date]`, where `date` is `YYYY-MM-DD`.
pub fn filter_by_date(table: &Table, date: &str) -> Result<Table> {
    let reference = parse_reference_date(date)?;
    filter_by_window(table, DateWindow::month_to_date(reference))
}
