use serde::Serialize;

use crate::error::Result;

/// Format a float as a ruble amount with thin grouping: 1 234,56 ₽
pub fn money(val: f64) -> String {
    let negative = val < 0.0;
    let abs = val.abs();
    let cents = format!("{:.2}", abs);
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-{grouped},{dec_part} ₽")
    } else {
        format!("{grouped},{dec_part} ₽")
    }
}

/// Pretty JSON with four-space indentation. Non-ASCII text is written as-is.
pub fn pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// `{"error": message}` rendered the same way as a successful payload.
pub fn error_payload(message: &str) -> String {
    let value = serde_json::json!({ "error": message });
    pretty_json(&value).unwrap_or_else(|_| value.to_string())
}
