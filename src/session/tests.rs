#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::ai::MockReceiptAi;
use crate::db::Database;
use crate::models::{Category, Field};

fn session(limit: u32) -> Session {
    Session::new(Box::new(Database::open_in_memory().unwrap()), QuotaTracker::new(limit))
}

fn parking() -> ReceiptRecord {
    ReceiptRecord {
        transaction_name: Some("Parking".into()),
        total_amount: Some(dec!(5)),
        transaction_date: Some("2026-10-19".into()),
        category: Category::VehicleExpenses,
        client_or_prospect: None,
        purpose: Some("Parking".into()),
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn photo() -> Attachment {
    Attachment {
        mime_type: "image/jpeg".into(),
        data: vec![0xff, 0xd8],
    }
}

// ── Admission / settlement ────────────────────────────────────

#[test]
fn test_success_consumes_one_credit() {
    let mut s = session(15);
    let ticket = s.begin_extraction(InputKind::Image).unwrap();
    assert!(s.is_busy());
    assert_eq!(s.quota().count, 0);

    let outcome = s.finish_extraction(ticket, Ok(parking()));
    assert_eq!(outcome, Outcome::Ready(parking()));
    assert!(!s.is_busy());
    assert_eq!(s.quota().count, 1);
}

#[test]
fn test_failure_is_free() {
    let mut s = session(15);
    let ticket = s.begin_extraction(InputKind::Voice).unwrap();
    let err = ExtractError::NothingFound { kind: InputKind::Voice };
    let outcome = s.finish_extraction(ticket, Err(err.clone()));
    assert_eq!(outcome, Outcome::Failed(err));
    assert_eq!(s.quota().count, 0);
}

#[test]
fn test_refused_at_limit() {
    let mut s = session(1);
    let ticket = s.begin_extraction(InputKind::Image).unwrap();
    s.finish_extraction(ticket, Ok(parking()));

    let err = s.begin_extraction(InputKind::Image).unwrap_err();
    assert_eq!(err, ExtractError::QuotaExceeded { limit: 1 });
    assert!(!s.is_busy());
}

#[test]
fn test_abandoned_result_ignored_and_free() {
    let mut s = session(15);
    let ticket = s.begin_extraction(InputKind::Image).unwrap();
    assert!(s.abandon());
    assert!(!s.abandon());

    assert_eq!(s.finish_extraction(ticket, Ok(parking())), Outcome::Ignored);
    assert_eq!(s.quota().count, 0);
}

#[test]
fn test_superseded_request_ignored() {
    let mut s = session(15);
    let first = s.begin_extraction(InputKind::Image).unwrap();
    let second = s.begin_extraction(InputKind::Voice).unwrap();
    assert_eq!(s.pending_kind(), Some(InputKind::Voice));

    assert_eq!(s.finish_extraction(first, Ok(parking())), Outcome::Ignored);
    assert!(s.is_busy());
    assert!(matches!(s.finish_extraction(second, Ok(parking())), Outcome::Ready(_)));
    assert_eq!(s.quota().count, 1);
}

#[test]
fn test_duplicate_result_ignored() {
    let mut s = session(15);
    let ticket = s.begin_extraction(InputKind::Image).unwrap();
    s.finish_extraction(ticket, Ok(parking()));
    assert_eq!(s.finish_extraction(ticket, Ok(parking())), Outcome::Ignored);
    assert_eq!(s.quota().count, 1);
}

// ── Analysis ──────────────────────────────────────────────────

#[test]
fn test_analysis_refused_at_limit() {
    let mut s = session(1);
    let ticket = s.begin_extraction(InputKind::Image).unwrap();
    s.finish_extraction(ticket, Ok(parking()));

    assert_eq!(s.begin_analysis(), Err(ExtractError::QuotaExceeded { limit: 1 }));
}

#[test]
fn test_analysis_answer_uses_one_credit() {
    let mut s = session(15);
    s.begin_analysis().unwrap();
    assert_eq!(s.finish_analysis(Ok("All good".into())).unwrap(), "All good");
    assert_eq!(s.quota().count, 1);
}

#[test]
fn test_failed_analysis_is_free() {
    let mut s = session(15);
    let err = s.finish_analysis(Err(ExtractError::transport("down"))).unwrap_err();
    assert_eq!(err, ExtractError::transport("down"));
    assert_eq!(s.quota().count, 0);
}

#[tokio::test]
async fn test_analyze_with_mock_ai() {
    let mut ai = MockReceiptAi::new();
    ai.expect_analyze()
        .withf(|receipts, query| receipts.is_empty() && query == "totals?")
        .times(1)
        .returning(|_, _| Ok("Nothing spent yet.".into()));
    let mut s = session(15);

    assert_eq!(s.analyze(&ai, "totals?").await.unwrap(), "Nothing spent yet.");
    assert_eq!(s.quota().count, 1);
}

#[tokio::test]
async fn test_analyze_refused_without_calling_ai() {
    let mut ai = MockReceiptAi::new();
    ai.expect_analyze().never();
    let mut s = session(0);

    let err = s.analyze(&ai, "totals?").await.unwrap_err();
    assert_eq!(err, ExtractError::QuotaExceeded { limit: 0 });
}

// ── Async extract ─────────────────────────────────────────────

#[tokio::test]
async fn test_extract_with_mock_ai() {
    let mut ai = MockReceiptAi::new();
    ai.expect_extract()
        .withf(|kind, attachment| *kind == InputKind::Image && attachment.mime_type == "image/jpeg")
        .times(1)
        .returning(|_, _| Ok(parking()));

    let mut s = session(15);
    let record = s.extract(&ai, InputKind::Image, &photo()).await.unwrap();
    assert_eq!(record, parking());
    assert_eq!(s.quota().count, 1);
}

#[tokio::test]
async fn test_extract_refused_without_calling_ai() {
    let mut ai = MockReceiptAi::new();
    ai.expect_extract().never();

    let mut s = session(0);
    let err = s.extract(&ai, InputKind::Image, &photo()).await.unwrap_err();
    assert_eq!(err, ExtractError::QuotaExceeded { limit: 0 });
}

#[tokio::test]
async fn test_extract_error_passes_through() {
    let mut ai = MockReceiptAi::new();
    ai.expect_extract()
        .returning(|kind, _| Err(ExtractError::InvalidFormat { kind }));

    let mut s = session(15);
    let err = s.extract(&ai, InputKind::Voice, &photo()).await.unwrap_err();
    assert_eq!(err, ExtractError::InvalidFormat { kind: InputKind::Voice });
    assert_eq!(s.quota().count, 0);
}

// ── Drafts ────────────────────────────────────────────────────

#[test]
fn test_save_valid_draft() {
    let mut s = session(15);
    let id = s.save_draft_on(&Draft::new(parking()), today()).unwrap();
    assert_eq!(s.ledger().get(id).unwrap().record, parking());
}

#[test]
fn test_save_blocked_by_errors() {
    let mut s = session(15);
    let report = s
        .save_draft_on(&Draft::new(ReceiptRecord::default()), today())
        .unwrap_err();
    assert!(report.error(Field::TransactionName).is_some());
    assert!(s.ledger().is_empty());
}

#[test]
fn test_warnings_do_not_block() {
    let mut s = session(15);
    let record = ReceiptRecord {
        purpose: None,
        ..parking()
    };
    assert!(s.save_draft_on(&Draft::new(record), today()).is_ok());
}

#[test]
fn test_edit_updates_in_place() {
    let mut s = session(15);
    let id = s.save_draft_on(&Draft::new(parking()), today()).unwrap();

    let mut draft = Draft::editing(s.ledger().get(id).unwrap());
    draft.record.set_field(Field::TotalAmount, "7.50");
    let saved_id = s.save_draft_on(&draft, today()).unwrap();

    assert_eq!(saved_id, id);
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(s.ledger().get(id).unwrap().record.total_amount, Some(dec!(7.50)));
}

#[test]
fn test_edit_of_deleted_receipt_saves_new() {
    let mut s = session(15);
    let id = s.save_draft_on(&Draft::new(parking()), today()).unwrap();
    let draft = Draft::editing(s.ledger().get(id).unwrap());
    assert!(s.delete(id));

    let new_id = s.save_draft_on(&draft, today()).unwrap();
    assert_eq!(s.ledger().len(), 1);
    assert_eq!(s.ledger().get(new_id).unwrap().record, parking());
}

#[test]
fn test_saving_does_not_touch_quota() {
    let mut s = session(15);
    s.save_draft_on(&Draft::new(parking()), today()).unwrap();
    assert_eq!(s.quota().count, 0);
}
