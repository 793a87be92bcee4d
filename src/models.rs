use serde::{Deserialize, Serialize};

// Column labels as they appear in the bank's operations export.
pub const COL_DATE: &str = "Дата операции";
pub const COL_PAYMENT_AMOUNT: &str = "Сумма платежа";
pub const COL_OPERATION_AMOUNT: &str = "Сумма операции";
pub const COL_CARD: &str = "Номер карты";
pub const COL_CATEGORY: &str = "Категория";
pub const COL_DESCRIPTION: &str = "Описание";
pub const COL_CASHBACK: &str = "Кэшбэк";

/// Timestamp layout used by the source file.
pub const SOURCE_DATETIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

pub const TRANSFER_CATEGORY: &str = "Переводы";

/// Spend and cashback rolled up per masked card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardSummary {
    pub last_digits: String,
    pub total_spent: f64,
    pub cashback: f64,
}

/// Display shape of a top transaction inside the snapshot report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTransaction {
    pub date: serde_json::Value,
    pub amount: serde_json::Value,
    pub category: serde_json::Value,
    pub description: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub currency: String,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPrice {
    pub stock: String,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpending {
    pub category: String,
    pub total_spent: f64,
    pub from_date: String,
    pub to_date: String,
}

pub fn round2(val: f64) -> f64 {
    (val * 100.0).round() / 100.0
}
