#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;
use crate::db::memory::MemoryStore;
use crate::db::Database;

fn receipt(name: &str, amount: rust_decimal::Decimal, date: Option<&str>, category: Category) -> ReceiptRecord {
    ReceiptRecord {
        transaction_name: Some(name.into()),
        total_amount: Some(amount),
        transaction_date: date.map(String::from),
        category,
        client_or_prospect: None,
        purpose: Some("Client visit".into()),
    }
}

// ── Save / reload ─────────────────────────────────────────────

#[test]
fn test_save_then_reload_roundtrip() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = Ledger::load(&db);
    let record = ReceiptRecord {
        client_or_prospect: Some("Acme".into()),
        ..receipt("Lunch", dec!(42.75), Some("2026-10-01"), Category::ClientEntertainment)
    };
    let id = ledger.save_new(&db, record.clone());

    let reloaded = Ledger::load(&db);
    assert_eq!(reloaded.len(), 1);
    let saved = reloaded.get(id).unwrap();
    assert_eq!(saved.record, record);
}

#[test]
fn test_empty_store_loads_empty() {
    let ledger = Ledger::load(&MemoryStore::default());
    assert!(ledger.is_empty());
    assert_eq!(ledger.total(), dec!(0));
}

#[test]
fn test_corrupt_store_loads_empty() {
    let store = MemoryStore::with(crate::db::RECEIPTS_KEY, "[{\"id\": \"nope\"");
    let ledger = Ledger::load(&store);
    assert!(ledger.is_empty());
}

#[test]
fn test_write_failure_keeps_memory_copy() {
    let store = MemoryStore::default();
    store.fail_writes.set(true);
    let mut ledger = Ledger::load(&store);
    let id = ledger.save_new(&store, receipt("Taxi", dec!(20), Some("2026-10-02"), Category::Travel));
    assert!(ledger.get(id).is_some());
    assert!(store.raw(crate::db::RECEIPTS_KEY).is_none());
}

// ── Ids ───────────────────────────────────────────────────────

#[test]
fn test_ids_are_unique_within_same_millisecond() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    let a = ledger.save_new_at(&store, receipt("A", dec!(1), Some("2026-10-01"), Category::Other), 1000);
    let b = ledger.save_new_at(&store, receipt("B", dec!(1), Some("2026-10-01"), Category::Other), 1000);
    let c = ledger.save_new_at(&store, receipt("C", dec!(1), Some("2026-10-01"), Category::Other), 999);
    assert_eq!(a, 1000);
    assert_eq!(b, 1001);
    assert_eq!(c, 1002);
}

#[test]
fn test_deleted_id_is_not_reissued() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    ledger.save_new_at(&store, receipt("A", dec!(1), Some("2026-10-01"), Category::Other), 1000);
    let b = ledger.save_new_at(&store, receipt("B", dec!(1), Some("2026-10-01"), Category::Other), 1000);
    assert!(ledger.delete(&store, b));

    let c = ledger.save_new_at(&store, receipt("C", dec!(1), Some("2026-10-01"), Category::Other), 1000);
    assert_ne!(c, b);
    assert_eq!(c, 1002);
}

#[test]
fn test_last_id_survives_reload_after_delete() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = Ledger::load(&db);
    let a = ledger.save_new_at(&db, receipt("A", dec!(1), None, Category::Other), 5000);
    assert!(ledger.delete(&db, a));

    let mut reloaded = Ledger::load(&db);
    assert!(reloaded.is_empty());
    let b = reloaded.save_new_at(&db, receipt("B", dec!(1), None, Category::Other), 4000);
    assert_eq!(b, 5001);
}

#[test]
fn test_id_uses_timestamp_when_newer() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    ledger.save_new_at(&store, receipt("A", dec!(1), None, Category::Other), 10);
    let id = ledger.save_new_at(&store, receipt("B", dec!(1), None, Category::Other), 5000);
    assert_eq!(id, 5000);
}

// ── Ordering ──────────────────────────────────────────────────

#[test]
fn test_sorted_by_date_descending() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    ledger.save_new_at(&store, receipt("Mid", dec!(1), Some("2026-05-01"), Category::Other), 1);
    ledger.save_new_at(&store, receipt("Old", dec!(1), Some("2026-01-01"), Category::Other), 2);
    ledger.save_new_at(&store, receipt("Undated", dec!(1), None, Category::Other), 3);
    ledger.save_new_at(&store, receipt("New", dec!(1), Some("2026-09-01"), Category::Other), 4);

    let names: Vec<_> = ledger
        .all()
        .iter()
        .map(|r| r.record.transaction_name.clone().unwrap())
        .collect();
    assert_eq!(names, vec!["New", "Mid", "Old", "Undated"]);
}

#[test]
fn test_same_date_newest_save_first() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    let first = ledger.save_new_at(&store, receipt("First", dec!(1), Some("2026-05-01"), Category::Other), 1);
    let second = ledger.save_new_at(&store, receipt("Second", dec!(1), Some("2026-05-01"), Category::Other), 2);
    assert_eq!(ledger.all()[0].id, second);
    assert_eq!(ledger.all()[1].id, first);
}

#[test]
fn test_update_resorts() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    let a = ledger.save_new_at(&store, receipt("A", dec!(1), Some("2026-01-01"), Category::Other), 1);
    ledger.save_new_at(&store, receipt("B", dec!(1), Some("2026-06-01"), Category::Other), 2);
    assert_eq!(ledger.position(a), Some(1));

    assert!(ledger.update(&store, a, receipt("A2", dec!(3), Some("2026-07-01"), Category::Meals)));
    assert_eq!(ledger.position(a), Some(0));
    assert_eq!(ledger.get(a).unwrap().record.transaction_name.as_deref(), Some("A2"));
}

// ── Update / delete ───────────────────────────────────────────

#[test]
fn test_update_unknown_id() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    assert!(!ledger.update(&store, 42, ReceiptRecord::default()));
    assert_eq!(store.writes.get(), 0);
}

#[test]
fn test_delete() {
    let db = Database::open_in_memory().unwrap();
    let mut ledger = Ledger::load(&db);
    let id = ledger.save_new(&db, receipt("Gas", dec!(40), Some("2026-10-10"), Category::VehicleExpenses));
    assert!(ledger.delete(&db, id));
    assert!(!ledger.delete(&db, id));
    assert!(Ledger::load(&db).is_empty());
}

// ── Totals / export ───────────────────────────────────────────

#[test]
fn test_totals_by_category() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    ledger.save_new_at(&store, receipt("Lunch", dec!(12.50), Some("2026-10-01"), Category::Meals), 1);
    ledger.save_new_at(&store, receipt("Dinner", dec!(30), Some("2026-10-02"), Category::Meals), 2);
    ledger.save_new_at(&store, receipt("Toll", dec!(8), Some("2026-10-03"), Category::VehicleExpenses), 3);

    let totals = ledger.totals_by_category();
    assert_eq!(
        totals,
        vec![
            (Category::Meals, dec!(42.50)),
            (Category::VehicleExpenses, dec!(8)),
        ]
    );
    assert_eq!(ledger.total(), dec!(50.50));
}

#[test]
fn test_export_to_csv() {
    let store = MemoryStore::default();
    let mut ledger = Ledger::default();
    ledger.save_new_at(&store, receipt("Parking, Lot B", dec!(5), Some("2026-10-01"), Category::VehicleExpenses), 7);

    let file = tempfile::NamedTempFile::new().unwrap();
    let count = ledger.export_to_csv(file.path()).unwrap();
    assert_eq!(count, 1);

    let content = std::fs::read_to_string(file.path()).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next().unwrap(),
        "ID,Date,Transaction,Amount,Category,Client/Prospect,Purpose"
    );
    assert_eq!(
        lines.next().unwrap(),
        "7,2026-10-01,\"Parking, Lot B\",5.00,Vehicle Expenses,,Client visit"
    );
}
