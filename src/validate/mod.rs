use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::models::{Field, ReceiptRecord};

/// Field-level findings for a draft receipt. Errors block saving; warnings
/// are advisory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ValidationReport {
    pub(crate) errors: BTreeMap<Field, String>,
    pub(crate) warnings: BTreeMap<Field, String>,
}

impl ValidationReport {
    pub(crate) fn can_save(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub(crate) fn warning(&self, field: Field) -> Option<&str> {
        self.warnings.get(&field).map(String::as_str)
    }
}

/// Validate against the local calendar date.
pub(crate) fn validate_now(record: &ReceiptRecord) -> ValidationReport {
    validate(record, Local::now().date_naive())
}

/// Every rule runs on every call; nothing short-circuits.
pub(crate) fn validate(record: &ReceiptRecord, today: NaiveDate) -> ValidationReport {
    let mut report = ValidationReport::default();

    if is_blank(record.transaction_name.as_deref()) {
        report
            .errors
            .insert(Field::TransactionName, "Transaction name is required.".into());
    }

    if !record.total_amount.is_some_and(|a| a > Decimal::ZERO) {
        report
            .errors
            .insert(Field::TotalAmount, "A positive amount is required.".into());
    }

    if let Some(msg) = check_date(record.transaction_date.as_deref(), today) {
        report.errors.insert(Field::TransactionDate, msg);
    }

    if record.category.requires_client() && is_blank(record.client_or_prospect.as_deref()) {
        report.errors.insert(
            Field::ClientOrProspect,
            "Client/Prospect is required for this category.".into(),
        );
    }

    if let (Some(amount), Some(limit)) = (record.total_amount, record.category.threshold()) {
        if amount > limit {
            report.warnings.insert(
                Field::TotalAmount,
                format!(
                    "This amount is high for {}. Please double-check.",
                    record.category
                ),
            );
        }
    }

    if is_blank(record.purpose.as_deref()) {
        report.warnings.insert(
            Field::Purpose,
            "A clear purpose helps with faster expense approval.".into(),
        );
    }

    report
}

/// The date is a calendar date in the user's zone, compared against `today`
/// directly so no UTC conversion can shift it by a day.
fn check_date(date: Option<&str>, today: NaiveDate) -> Option<String> {
    let raw = match date.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Some("Transaction date is required.".into()),
    };
    let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") else {
        return Some("Transaction date must be a valid YYYY-MM-DD date.".into());
    };

    // The year rule takes precedence when both apply.
    if date.year() != today.year() {
        return Some(format!(
            "Only transactions from {} are allowed.",
            today.year()
        ));
    }
    if date > today {
        return Some("Date cannot be in the future.".into());
    }
    None
}

fn is_blank(s: Option<&str>) -> bool {
    s.map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests;
