//! Currency rates and stock quotes for the snapshot report.
//!
//! Every lookup answers with one entry per requested symbol, in request
//! order. Network, API and parse failures are logged and turned into `null`
//! entries; nothing here returns an error to the pipeline.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::{CurrencyRate, StockPrice};

pub const RATES_URL: &str = "https://api.apilayer.com/exchangerates_data/latest";
pub const QUOTE_URL: &str = "https://finnhub.io/api/v1/quote";
pub const BASE_CURRENCY: &str = "USD";
pub const QUOTE_CURRENCY: &str = "RUB";

pub const RATES_KEY_ENV: &str = "API_KEY";
pub const STOCKS_KEY_ENV: &str = "FINNHUB_API_KEY";

pub trait MarketData {
    fn rates(&self, currencies: &[String]) -> Vec<CurrencyRate>;
    fn quotes(&self, stocks: &[String]) -> Vec<StockPrice>;
}

fn null_rates(currencies: &[String]) -> Vec<CurrencyRate> {
    currencies
        .iter()
        .map(|c| CurrencyRate { currency: c.clone(), rate: None })
        .collect()
}

/// Price of one unit of each currency in rubles, from a USD-based rate table:
/// `(1 / rates[X]) * rates[RUB]`.
pub fn rates_from_response(data: &Value, currencies: &[String]) -> Vec<CurrencyRate> {
    if !data.get("success").and_then(Value::as_bool).unwrap_or(false) {
        let info = data
            .pointer("/error/info")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        tracing::warn!("exchange rate API error: {info}");
        return null_rates(currencies);
    }
    let rate_of = |code: &str| {
        data.get("rates")
            .and_then(|r| r.get(code))
            .and_then(Value::as_f64)
            .filter(|r| *r > 0.0)
    };
    let rub = rate_of(QUOTE_CURRENCY);
    currencies
        .iter()
        .map(|c| CurrencyRate {
            currency: c.clone(),
            rate: rate_of(c)
                .zip(rub)
                .map(|(rate, rub)| (rub / rate * 100.0).round() / 100.0),
        })
        .collect()
}

/// Current price (`c`) from a Finnhub quote. Unknown symbols come back as 0.
pub fn price_from_quote(data: &Value) -> Option<f64> {
    data.get("c").and_then(Value::as_f64).filter(|p| *p > 0.0)
}

/// Live market data over HTTP: one request for the whole rate table and one
/// request per stock symbol.
pub struct HttpMarketData {
    client: Client,
    rates_key: Option<String>,
    stocks_key: Option<String>,
}

impl HttpMarketData {
    pub fn new(timeout: Duration, rates_key: Option<String>, stocks_key: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rates_key,
            stocks_key,
        })
    }

    /// API keys from `API_KEY` and `FINNHUB_API_KEY`.
    pub fn from_env(timeout: Duration) -> Result<Self> {
        let key = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self::new(timeout, key(RATES_KEY_ENV), key(STOCKS_KEY_ENV))
    }

    fn fetch_rate_table(&self, key: &str) -> Result<Value> {
        let resp = self
            .client
            .get(RATES_URL)
            .query(&[("base", BASE_CURRENCY)])
            .header("apikey", key)
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }

    fn fetch_quote(&self, symbol: &str, key: &str) -> Result<Value> {
        let resp = self
            .client
            .get(QUOTE_URL)
            .query(&[("symbol", symbol), ("token", key)])
            .send()?
            .error_for_status()?;
        Ok(resp.json()?)
    }
}

impl MarketData for HttpMarketData {
    fn rates(&self, currencies: &[String]) -> Vec<CurrencyRate> {
        if currencies.is_empty() {
            return Vec::new();
        }
        let Some(key) = self.rates_key.as_deref() else {
            tracing::warn!("{RATES_KEY_ENV} is not set; currency rates unavailable");
            return null_rates(currencies);
        };
        match self.fetch_rate_table(key) {
            Ok(data) => rates_from_response(&data, currencies),
            Err(e) => {
                tracing::warn!("exchange rate request failed: {e}");
                null_rates(currencies)
            }
        }
    }

    fn quotes(&self, stocks: &[String]) -> Vec<StockPrice> {
        let Some(key) = self.stocks_key.as_deref() else {
            if !stocks.is_empty() {
                tracing::warn!("{STOCKS_KEY_ENV} is not set; stock prices unavailable");
            }
            return OfflineMarketData.quotes(stocks);
        };
        stocks
            .iter()
            .map(|stock| {
                let price = match self.fetch_quote(stock, key) {
                    Ok(data) => price_from_quote(&data),
                    Err(e) => {
                        tracing::warn!("quote request for {stock} failed: {e}");
                        None
                    }
                };
                StockPrice { stock: stock.clone(), price }
            })
            .collect()
    }
}

/// Answers every lookup with `null`; used for `--offline` runs.
pub struct OfflineMarketData;

impl MarketData for OfflineMarketData {
    fn rates(&self, currencies: &[String]) -> Vec<CurrencyRate> {
        null_rates(currencies)
    }

    fn quotes(&self, stocks: &[String]) -> Vec<StockPrice> {
        stocks
            .iter()
            .map(|s| StockPrice { stock: s.clone(), price: None })
            .collect()
    }
}
