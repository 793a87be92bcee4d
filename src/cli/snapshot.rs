use std::path::PathBuf;
use std::time::Duration;

use chrono::Timelike;
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde_json::Value;

use crate::cli::{report_target, save_payload, today, SaveArgs};
use crate::error::Result;
use crate::export::export_table;
use crate::fmt::money;
use crate::importer::load_table;
use crate::market::{HttpMarketData, MarketData, OfflineMarketData};
use crate::settings::Settings;
use crate::views::{process_data, simplify_transactions, Snapshot};

pub const MISSING_SYMBOLS: &str = "Списки валют или акций не заданы в user_settings.json.";

pub struct SnapshotOptions {
    pub file: PathBuf,
    pub date: Option<String>,
    pub offline: bool,
    pub table: bool,
    pub timeout: u64,
    pub export: Option<PathBuf>,
    pub save: SaveArgs,
}

pub fn run(settings: &Settings, opts: SnapshotOptions) -> Result<()> {
    if !settings.has_market_symbols() {
        println!("{MISSING_SYMBOLS}");
        return Ok(());
    }

    let data = load_table(&opts.file)?;
    let date = opts.date.unwrap_or_else(today);
    let market: Box<dyn MarketData> = if opts.offline {
        Box::new(OfflineMarketData)
    } else {
        Box::new(HttpMarketData::from_env(Duration::from_secs(opts.timeout))?)
    };
    let snapshot = process_data(
        &data,
        &date,
        &settings.user_currencies,
        &settings.user_stocks,
        market.as_ref(),
        chrono::Local::now().hour(),
    )?;

    if let Some(path) = &opts.export {
        export_table(&snapshot.filtered, path)?;
        eprintln!("Exported {} transactions to {}", snapshot.filtered.len(), path.display());
    }
    if opts.save.save {
        let target = report_target(
            settings,
            "snapshot",
            opts.save.output_dir.as_deref(),
            opts.save.file_name.as_deref(),
        );
        let path = save_payload(&snapshot.json, &target)?;
        eprintln!("Report saved to {}", path.display());
    }

    if opts.table {
        print_tables(&snapshot);
    } else {
        println!("JSON-ответ:");
        println!("{}", snapshot.json);
    }
    Ok(())
}

fn show(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(money).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn show_opt(value: Option<f64>) -> Cell {
    match value {
        Some(v) => Cell::new(money(v)),
        None => Cell::new("n/a".dimmed()),
    }
}

fn print_tables(snapshot: &Snapshot) {
    println!("{}\n", snapshot.greeting.text().bold());

    let mut cards = Table::new();
    cards.set_header(vec!["Карта", "Расходы", "Кэшбэк"]);
    for card in &snapshot.cards {
        cards.add_row(vec![
            Cell::new(format!("*{}", card.last_digits)),
            Cell::new(money(card.total_spent)),
            Cell::new(money(card.cashback).green()),
        ]);
    }
    println!("Карты\n{cards}");

    let mut top = Table::new();
    top.set_header(vec!["Дата", "Сумма", "Категория", "Описание"]);
    for tx in simplify_transactions(&snapshot.top) {
        top.add_row(vec![
            Cell::new(show(&tx.date)),
            Cell::new(show(&tx.amount)),
            Cell::new(show(&tx.category)),
            Cell::new(show(&tx.description)),
        ]);
    }
    println!("Топ-{} транзакций\n{top}", snapshot.top.len());

    let mut market = Table::new();
    market.set_header(vec!["Инструмент", "Цена"]);
    for rate in &snapshot.rates {
        market.add_row(vec![Cell::new(&rate.currency), show_opt(rate.rate)]);
    }
    for price in &snapshot.prices {
        market.add_row(vec![Cell::new(price.stock.as_str().cyan()), show_opt(price.price)]);
    }
    println!("Курсы и котировки\n{market}");
}
