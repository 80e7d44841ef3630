#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::models::Category;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn valid_record() -> ReceiptRecord {
    ReceiptRecord {
        transaction_name: Some("Parking".into()),
        total_amount: Some(dec!(5)),
        transaction_date: Some("2026-10-19".into()),
        category: Category::VehicleExpenses,
        client_or_prospect: None,
        purpose: Some("Parking".into()),
    }
}

// ── Scenarios ─────────────────────────────────────────────────

#[test]
fn test_parking_preset_is_clean() {
    let report = validate(&valid_record(), today());
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert!(report.can_save());
}

#[test]
fn test_blank_record_reports_everything() {
    let record = ReceiptRecord {
        transaction_name: Some(String::new()),
        total_amount: Some(dec!(-3)),
        transaction_date: None,
        category: Category::Meals,
        client_or_prospect: None,
        purpose: None,
    };
    let report = validate(&record, today());
    assert_eq!(
        report.errors.keys().copied().collect::<Vec<_>>(),
        vec![Field::TransactionName, Field::TotalAmount, Field::TransactionDate]
    );
    assert_eq!(
        report.warnings.keys().copied().collect::<Vec<_>>(),
        vec![Field::Purpose]
    );
    assert!(!report.can_save());
}

#[test]
fn test_meals_over_threshold_warns() {
    let record = ReceiptRecord {
        transaction_name: Some("Dinner".into()),
        total_amount: Some(dec!(350)),
        category: Category::Meals,
        purpose: Some("Team dinner".into()),
        ..valid_record()
    };
    let report = validate(&record, today());
    assert!(report.errors.is_empty());
    let warning = report.warning(Field::TotalAmount).unwrap();
    assert!(warning.contains("Meals"), "{warning}");
    assert!(report.can_save());
}

// ── Required fields ───────────────────────────────────────────

#[test]
fn test_name_whitespace_is_blank() {
    let record = ReceiptRecord {
        transaction_name: Some("   ".into()),
        ..valid_record()
    };
    let report = validate(&record, today());
    assert_eq!(
        report.error(Field::TransactionName),
        Some("Transaction name is required.")
    );
}

#[test]
fn test_amount_must_be_positive() {
    for amount in [None, Some(dec!(0)), Some(dec!(-0.01)), Some(dec!(-100))] {
        let record = ReceiptRecord {
            total_amount: amount,
            ..valid_record()
        };
        let report = validate(&record, today());
        assert_eq!(
            report.error(Field::TotalAmount),
            Some("A positive amount is required."),
            "amount {amount:?}"
        );
        assert!(!report.can_save());
    }
}

#[test]
fn test_smallest_positive_amount_passes() {
    let record = ReceiptRecord {
        total_amount: Some(dec!(0.01)),
        ..valid_record()
    };
    assert!(validate(&record, today()).error(Field::TotalAmount).is_none());
}

// ── Dates ─────────────────────────────────────────────────────

#[test]
fn test_today_is_allowed() {
    let report = validate(&valid_record(), today());
    assert!(report.error(Field::TransactionDate).is_none());
}

#[test]
fn test_tomorrow_is_future() {
    let record = ReceiptRecord {
        transaction_date: Some("2026-10-20".into()),
        ..valid_record()
    };
    assert_eq!(
        validate(&record, today()).error(Field::TransactionDate),
        Some("Date cannot be in the future.")
    );
}

#[test]
fn test_previous_year_rejected() {
    let record = ReceiptRecord {
        transaction_date: Some("2025-12-31".into()),
        ..valid_record()
    };
    assert_eq!(
        validate(&record, today()).error(Field::TransactionDate),
        Some("Only transactions from 2026 are allowed.")
    );
}

#[test]
fn test_next_year_reports_year_rule() {
    let record = ReceiptRecord {
        transaction_date: Some("2027-01-02".into()),
        ..valid_record()
    };
    assert_eq!(
        validate(&record, today()).error(Field::TransactionDate),
        Some("Only transactions from 2026 are allowed.")
    );
}

#[test]
fn test_first_of_year_allowed() {
    let record = ReceiptRecord {
        transaction_date: Some("2026-01-01".into()),
        ..valid_record()
    };
    assert!(validate(&record, today()).error(Field::TransactionDate).is_none());
}

#[test]
fn test_new_years_day_boundary() {
    // On Jan 1 the only valid date is Jan 1 itself.
    let jan1 = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
    let record = ReceiptRecord {
        transaction_date: Some("2027-01-01".into()),
        ..valid_record()
    };
    assert!(validate(&record, jan1).error(Field::TransactionDate).is_none());
    let record = ReceiptRecord {
        transaction_date: Some("2026-12-31".into()),
        ..valid_record()
    };
    assert!(validate(&record, jan1).error(Field::TransactionDate).is_some());
}

#[test]
fn test_malformed_dates() {
    for raw in ["19/10/2026", "2026-13-01", "yesterday", "2026-02-30"] {
        let record = ReceiptRecord {
            transaction_date: Some(raw.into()),
            ..valid_record()
        };
        assert_eq!(
            validate(&record, today()).error(Field::TransactionDate),
            Some("Transaction date must be a valid YYYY-MM-DD date."),
            "date {raw}"
        );
    }
}

#[test]
fn test_blank_date_is_required() {
    let record = ReceiptRecord {
        transaction_date: Some("  ".into()),
        ..valid_record()
    };
    assert_eq!(
        validate(&record, today()).error(Field::TransactionDate),
        Some("Transaction date is required.")
    );
}

// ── Category rules ────────────────────────────────────────────

#[test]
fn test_client_entertainment_requires_client() {
    let record = ReceiptRecord {
        category: Category::ClientEntertainment,
        client_or_prospect: Some(" ".into()),
        ..valid_record()
    };
    assert_eq!(
        validate(&record, today()).error(Field::ClientOrProspect),
        Some("Client/Prospect is required for this category.")
    );

    let record = ReceiptRecord {
        client_or_prospect: Some("Acme Corp".into()),
        ..record
    };
    assert!(validate(&record, today()).error(Field::ClientOrProspect).is_none());
}

#[test]
fn test_other_categories_do_not_require_client() {
    for category in Category::all()
        .iter()
        .copied()
        .filter(|c| *c != Category::ClientEntertainment)
    {
        let record = ReceiptRecord {
            category,
            client_or_prospect: None,
            ..valid_record()
        };
        assert!(
            validate(&record, today()).error(Field::ClientOrProspect).is_none(),
            "{category}"
        );
    }
}

// ── Warnings ──────────────────────────────────────────────────

#[test]
fn test_threshold_is_exclusive() {
    let at_limit = ReceiptRecord {
        total_amount: Some(dec!(500)),
        ..valid_record()
    };
    assert!(validate(&at_limit, today()).warning(Field::TotalAmount).is_none());

    let over = ReceiptRecord {
        total_amount: Some(dec!(500.01)),
        ..valid_record()
    };
    assert_eq!(
        validate(&over, today()).warning(Field::TotalAmount),
        Some("This amount is high for Vehicle Expenses. Please double-check.")
    );
}

#[test]
fn test_other_has_no_threshold() {
    let record = ReceiptRecord {
        total_amount: Some(dec!(1000000)),
        category: Category::Other,
        ..valid_record()
    };
    assert!(validate(&record, today()).warnings.is_empty());
}

#[test]
fn test_blank_purpose_warns_but_saves() {
    let record = ReceiptRecord {
        purpose: Some("".into()),
        ..valid_record()
    };
    let report = validate(&record, today());
    assert_eq!(
        report.warning(Field::Purpose),
        Some("A clear purpose helps with faster expense approval.")
    );
    assert!(report.can_save());
}

#[test]
fn test_errors_and_warnings_coexist() {
    let record = ReceiptRecord {
        transaction_name: None,
        total_amount: Some(dec!(250)),
        category: Category::Communications,
        purpose: None,
        ..valid_record()
    };
    let report = validate(&record, today());
    assert!(report.error(Field::TransactionName).is_some());
    assert!(report.warning(Field::TotalAmount).is_some());
    assert!(report.warning(Field::Purpose).is_some());
}
