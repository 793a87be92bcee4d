use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::Result;
use crate::importer::coerce_amount;
use crate::models::{round2, CardSummary, COL_CARD, COL_OPERATION_AMOUNT};
use crate::table::Table;

fn card_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(\d{4})\b").expect("valid card suffix pattern"))
}

/// Last four digits of a masked card number such as `*7197` or `****1234`.
pub fn card_suffix(card: &str) -> Option<&str> {
    card_suffix_re()
        .captures_iter(card)
        .last()
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// One percent of spend, rounded to kopecks.
pub fn cashback_for(total_spent: f64) -> f64 {
    round2(total_spent / 100.0)
}

/// Total spend and cashback per card, ordered by card suffix.
///
/// Rows without a card, without a recognizable `*NNNN` suffix, or with an
/// amount that does not parse are left out rather than counted as zero.
pub fn card_expenses(table: &Table) -> Result<Vec<CardSummary>> {
    let idx = table.require_columns(&[COL_CARD, COL_OPERATION_AMOUNT])?;
    let (card_idx, amount_idx) = (idx[0], idx[1]);

    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    let mut skipped = 0usize;
    for row in table.rows() {
        let suffix = row[card_idx].as_text().and_then(card_suffix);
        let amount = coerce_amount(&row[amount_idx]);
        match (suffix, amount) {
            (Some(suffix), Some(amount)) => {
                *totals.entry(suffix.to_string()).or_default() += amount;
            }
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        tracing::debug!(skipped, "rows left out of card totals");
    }

    Ok(totals
        .into_iter()
        .map(|(last_digits, total)| {
            let total_spent = round2(total);
            CardSummary {
                last_digits,
                total_spent,
                cashback: cashback_for(total_spent),
            }
        })
        .collect())
}
