use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::LazyLock;

use super::{ExtractError, InputKind};
use crate::models::{Category, ReceiptRecord};

static CODE_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").ok());

/// Turn the model's reply into a typed record, or explain why it can't be.
///
/// Malformed JSON and "valid JSON with nothing useful in it" are reported as
/// different errors so the user can tell a confused model from an unreadable
/// receipt.
pub(crate) fn normalize(
    text: &str,
    kind: InputKind,
    today: NaiveDate,
) -> Result<ReceiptRecord, ExtractError> {
    let body = strip_code_fence(text.trim());
    let map = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::warn!(%kind, got = json_kind(&other), "AI reply is not a JSON object");
            return Err(ExtractError::InvalidFormat { kind });
        }
        Err(e) => {
            tracing::warn!(%kind, error = %e, reply = %body, "AI reply is not valid JSON");
            return Err(ExtractError::InvalidFormat { kind });
        }
    };

    let transaction_date = string_field(&map, "transaction_date").or_else(|| match kind {
        InputKind::Voice => Some(today.format("%Y-%m-%d").to_string()),
        InputKind::Image => None,
    });

    let record = ReceiptRecord {
        transaction_name: string_field(&map, "transaction_name"),
        total_amount: amount_field(&map, "total_amount"),
        transaction_date,
        category: string_field(&map, "category")
            .and_then(|s| Category::parse_exact(&s))
            .unwrap_or_default(),
        client_or_prospect: string_field(&map, "client_or_prospect"),
        purpose: string_field(&map, "purpose"),
    };

    let nothing_found = match kind {
        InputKind::Image => {
            record.transaction_name.is_none()
                && record.total_amount.is_none()
                && record.transaction_date.is_none()
        }
        // A voice reply always has a date, so judge it by name and amount.
        InputKind::Voice => record.transaction_name.is_none() && record.total_amount.is_none(),
    };
    if nothing_found {
        tracing::info!(%kind, "AI reply had no usable receipt fields");
        return Err(ExtractError::NothingFound { kind });
    }

    Ok(record)
}

fn strip_code_fence(text: &str) -> &str {
    CODE_FENCE
        .as_ref()
        .and_then(|re| re.captures(text))
        .and_then(|caps| caps.get(1))
        .map_or(text, |m| m.as_str())
}

/// Non-empty string values only; numbers, bools and blanks are dropped.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// JSON numbers only. `"12.50"` as a string is dropped.
fn amount_field(map: &Map<String, Value>, key: &str) -> Option<Decimal> {
    match map.get(key) {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
#[path = "normalize_tests.rs"]
mod tests;
