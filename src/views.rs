use serde::Serialize;
use serde_json::Value;

use crate::cards::card_expenses;
use crate::error::Result;
use crate::fmt::pretty_json;
use crate::importer::coerce_amount;
use crate::market::MarketData;
use crate::models::{
    CardSummary, CurrencyRate, StockPrice, TopTransaction, COL_CATEGORY, COL_DATE,
    COL_DESCRIPTION, COL_OPERATION_AMOUNT, COL_PAYMENT_AMOUNT,
};
use crate::ranking::{top_transactions, DEFAULT_TOP_N};
use crate::table::{Cell, Table};
use crate::window::filter_by_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Greeting {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Greeting {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Self::Morning,
            12..=17 => Self::Afternoon,
            18..=22 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            Self::Morning => "Доброе утро",
            Self::Afternoon => "Добрый день",
            Self::Evening => "Добрый вечер",
            Self::Night => "Доброй ночи",
        }
    }
}

impl std::fmt::Display for Greeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

#[derive(Debug, Serialize)]
pub struct SnapshotReport<'a> {
    pub greeting: &'a str,
    pub cards: &'a [CardSummary],
    pub top_transactions: Vec<TopTransaction>,
    pub currency_rates: &'a [CurrencyRate],
    pub stock_prices: &'a [StockPrice],
}

fn cell_at(table: &Table, row: &[Cell], column: &str) -> Value {
    table
        .column_index(column)
        .map(|i| row[i].to_json())
        .unwrap_or(Value::Null)
}

/// Signed amount as a JSON number; text that does not parse becomes null.
fn amount_at(table: &Table, row: &[Cell], column: &str) -> Value {
    table
        .column_index(column)
        .and_then(|i| coerce_amount(&row[i]))
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Reduce ranked rows to `{date, amount, category, description}`.
/// Structured dates print as `DD.MM.YYYY`; anything else passes through.
pub fn simplify_transactions(top: &Table) -> Vec<TopTransaction> {
    let amount_col = if top.has_column(COL_OPERATION_AMOUNT) {
        COL_OPERATION_AMOUNT
    } else {
        COL_PAYMENT_AMOUNT
    };
    top.rows()
        .iter()
        .map(|row| {
            let date = match top.column_index(COL_DATE).map(|i| &row[i]) {
                Some(Cell::DateTime(dt)) => Value::String(dt.format("%d.%m.%Y").to_string()),
                Some(other) => other.to_json(),
                None => Value::Null,
            };
            TopTransaction {
                date,
                amount: amount_at(top, row, amount_col),
                category: cell_at(top, row, COL_CATEGORY),
                description: cell_at(top, row, COL_DESCRIPTION),
            }
        })
        .collect()
}

pub fn prepare_json_response(
    cards: &[CardSummary],
    top: &Table,
    currency_rates: &[CurrencyRate],
    stock_prices: &[StockPrice],
    greeting: Greeting,
) -> Result<String> {
    let report = SnapshotReport {
        greeting: greeting.text(),
        cards,
        top_transactions: simplify_transactions(top),
        currency_rates,
        stock_prices,
    };
    pretty_json(&report)
}

/// Everything the snapshot pipeline produced for one run.
pub struct Snapshot {
    pub filtered: Table,
    pub cards: Vec<CardSummary>,
    pub top: Table,
    pub rates: Vec<CurrencyRate>,
    pub prices: Vec<StockPrice>,
    pub greeting: Greeting,
    pub json: String,
}

/// Month-to-date snapshot for `date`: card totals, top transactions and
/// market context, greeted according to `hour`.
pub fn process_data(
    table: &Table,
    date: &str,
    currencies: &[String],
    stocks: &[String],
    market: &dyn MarketData,
    hour: u32,
) -> Result<Snapshot> {
    let filtered = filter_by_date(table, date)?;
    let cards = card_expenses(&filtered)?;
    let top = top_transactions(&filtered, DEFAULT_TOP_N)?;
    let rates = market.rates(currencies);
    let prices = market.quotes(stocks);
    let greeting = Greeting::for_hour(hour);
    let json = prepare_json_response(&cards, &top, &rates, &prices, greeting)?;
    tracing::info!(
        rows = filtered.len(),
        cards = cards.len(),
        "snapshot prepared"
    );
    Ok(Snapshot {
        filtered,
        cards,
        top,
        rates,
        prices,
        greeting,
        json,
    })
}
