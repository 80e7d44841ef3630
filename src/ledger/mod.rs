use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;

use crate::db::{self, KvStore, LAST_ID_KEY, RECEIPTS_KEY};
use crate::models::{Category, ReceiptRecord, SavedReceipt};

/// Saved receipts, newest transaction date first, mirrored to the store on
/// every mutation.
#[derive(Debug, Default)]
pub(crate) struct Ledger {
    receipts: Vec<SavedReceipt>,
    /// Highest id ever issued, including deleted receipts.
    last_id: i64,
}

impl Ledger {
    pub(crate) fn load(store: &dyn KvStore) -> Self {
        let mut receipts: Vec<SavedReceipt> = db::load_json(store, RECEIPTS_KEY).unwrap_or_default();
        sort_by_date(&mut receipts);
        let stored: i64 = db::load_json(store, LAST_ID_KEY).unwrap_or(0);
        let last_id = receipts.iter().map(|r| r.id).fold(stored, i64::max);
        tracing::debug!(count = receipts.len(), last_id, "receipts loaded");
        Self { receipts, last_id }
    }

    pub(crate) fn all(&self) -> &[SavedReceipt] {
        &self.receipts
    }

    pub(crate) fn len(&self) -> usize {
        self.receipts.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }

    pub(crate) fn get(&self, id: i64) -> Option<&SavedReceipt> {
        self.receipts.iter().find(|r| r.id == id)
    }

    pub(crate) fn position(&self, id: i64) -> Option<usize> {
        self.receipts.iter().position(|r| r.id == id)
    }

    /// Store a new receipt and return its id.
    pub(crate) fn save_new(&mut self, store: &dyn KvStore, record: ReceiptRecord) -> i64 {
        self.save_new_at(store, record, chrono::Utc::now().timestamp_millis())
    }

    pub(crate) fn save_new_at(&mut self, store: &dyn KvStore, record: ReceiptRecord, now_millis: i64) -> i64 {
        let id = next_id(self.last_id, now_millis);
        self.last_id = id;
        db::save_json(store, LAST_ID_KEY, &id);
        self.receipts.insert(0, SavedReceipt { id, record });
        sort_by_date(&mut self.receipts);
        self.persist(store);
        tracing::info!(id, "receipt saved");
        id
    }

    /// Replace the fields of an existing receipt. Returns false if `id` is unknown.
    pub(crate) fn update(&mut self, store: &dyn KvStore, id: i64, record: ReceiptRecord) -> bool {
        let Some(existing) = self.receipts.iter_mut().find(|r| r.id == id) else {
            tracing::warn!(id, "update for unknown receipt");
            return false;
        };
        existing.record = record;
        sort_by_date(&mut self.receipts);
        self.persist(store);
        tracing::info!(id, "receipt updated");
        true
    }

    pub(crate) fn delete(&mut self, store: &dyn KvStore, id: i64) -> bool {
        let before = self.receipts.len();
        self.receipts.retain(|r| r.id != id);
        if self.receipts.len() == before {
            return false;
        }
        self.persist(store);
        tracing::info!(id, "receipt deleted");
        true
    }

    /// Sum of amounts per category, in category order, skipping empty ones.
    pub(crate) fn totals_by_category(&self) -> Vec<(Category, Decimal)> {
        Category::all()
            .iter()
            .filter_map(|c| {
                let total: Decimal = self
                    .receipts
                    .iter()
                    .filter(|r| r.record.category == *c)
                    .filter_map(|r| r.record.total_amount)
                    .sum();
                (total != Decimal::ZERO).then_some((*c, total))
            })
            .collect()
    }

    pub(crate) fn total(&self) -> Decimal {
        self.receipts
            .iter()
            .filter_map(|r| r.record.total_amount)
            .sum()
    }

    /// Write every receipt to a CSV file. Returns the number of rows written.
    pub(crate) fn export_to_csv(&self, path: &Path) -> Result<usize> {
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record([
            "ID",
            "Date",
            "Transaction",
            "Amount",
            "Category",
            "Client/Prospect",
            "Purpose",
        ])?;
        for r in &self.receipts {
            let rec = &r.record;
            wtr.write_record([
                r.id.to_string(),
                rec.transaction_date.clone().unwrap_or_default(),
                rec.transaction_name.clone().unwrap_or_default(),
                rec.total_amount
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_default(),
                rec.category.to_string(),
                rec.client_or_prospect.clone().unwrap_or_default(),
                rec.purpose.clone().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
        Ok(self.receipts.len())
    }

    fn persist(&self, store: &dyn KvStore) {
        db::save_json(store, RECEIPTS_KEY, &self.receipts);
    }
}

/// Millisecond timestamp, bumped past every id ever issued so ids are never
/// reused, even after a delete or a clock step backwards.
fn next_id(last_id: i64, now_millis: i64) -> i64 {
    now_millis.max(last_id + 1)
}

/// Newest date first; undated receipts sink to the bottom. Stable, so among
/// equal dates the most recently saved stays on top.
fn sort_by_date(receipts: &mut [SavedReceipt]) {
    receipts.sort_by(|a, b| {
        match (&a.record.transaction_date, &b.record.transaction_date) {
            (Some(left), Some(right)) => right.cmp(left),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

#[cfg(test)]
mod tests;
