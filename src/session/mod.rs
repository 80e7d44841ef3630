use anyhow::Result;
use chrono::NaiveDate;
use std::path::Path;

use crate::ai::{Attachment, ExtractError, InputKind, ReceiptAi};
use crate::db::KvStore;
use crate::ledger::Ledger;
use crate::models::{ReceiptRecord, SavedReceipt, UsageQuota};
use crate::quota::QuotaTracker;
use crate::validate::{self, ValidationReport};

/// Identifies one extraction request. Only the newest ticket is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Ticket(u64);

#[derive(Debug, Clone, Copy)]
struct Pending {
    ticket: Ticket,
    kind: InputKind,
}

/// What to do with a finished extraction.
#[derive(Debug, PartialEq)]
pub(crate) enum Outcome {
    /// Show the record for review. One credit has been consumed.
    Ready(ReceiptRecord),
    Failed(ExtractError),
    /// The request was abandoned or superseded; drop the result silently.
    Ignored,
}

/// A record being reviewed before save. `id` is set when editing an existing
/// receipt.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Draft {
    pub(crate) record: ReceiptRecord,
    pub(crate) id: Option<i64>,
}

impl Draft {
    pub(crate) fn new(record: ReceiptRecord) -> Self {
        Self { record, id: None }
    }

    pub(crate) fn editing(saved: &SavedReceipt) -> Self {
        Self {
            record: saved.record.clone(),
            id: Some(saved.id),
        }
    }
}

/// Everything one user works with: the store, their quota, their receipts,
/// and at most one live extraction request.
pub(crate) struct Session {
    store: Box<dyn KvStore>,
    quota: QuotaTracker,
    ledger: Ledger,
    next_ticket: u64,
    pending: Option<Pending>,
}

impl Session {
    pub(crate) fn new(store: Box<dyn KvStore>, quota: QuotaTracker) -> Self {
        let ledger = Ledger::load(store.as_ref());
        Self {
            store,
            quota,
            ledger,
            next_ticket: 0,
            pending: None,
        }
    }

    pub(crate) fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub(crate) fn quota(&self) -> UsageQuota {
        self.quota.state(self.store.as_ref())
    }

    pub(crate) fn quota_limit(&self) -> u32 {
        self.quota.limit()
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn pending_kind(&self) -> Option<InputKind> {
        self.pending.map(|p| p.kind)
    }

    // ── Extraction ────────────────────────────────────────────

    /// Admit a new extraction if the quota allows it. Any request still in
    /// flight is superseded.
    pub(crate) fn begin_extraction(&mut self, kind: InputKind) -> Result<Ticket, ExtractError> {
        if self.quota.is_limit_reached(self.store.as_ref()) {
            tracing::info!(%kind, limit = self.quota.limit(), "extraction refused, quota exhausted");
            return Err(ExtractError::QuotaExceeded {
                limit: self.quota.limit(),
            });
        }
        if let Some(old) = self.pending {
            tracing::info!(ticket = old.ticket.0, "superseding pending extraction");
        }
        self.next_ticket += 1;
        let ticket = Ticket(self.next_ticket);
        self.pending = Some(Pending { ticket, kind });
        tracing::debug!(ticket = ticket.0, %kind, "extraction started");
        Ok(ticket)
    }

    /// Settle a finished request. Credits are only consumed by a successful
    /// result for the live ticket.
    pub(crate) fn finish_extraction(
        &mut self,
        ticket: Ticket,
        result: Result<ReceiptRecord, ExtractError>,
    ) -> Outcome {
        match self.pending {
            Some(p) if p.ticket == ticket => self.pending = None,
            _ => {
                tracing::debug!(ticket = ticket.0, "dropping result for stale ticket");
                return Outcome::Ignored;
            }
        }
        match result {
            Ok(record) => {
                let state = self.quota.increment(self.store.as_ref());
                tracing::info!(ticket = ticket.0, used = state.count, "extraction succeeded");
                Outcome::Ready(record)
            }
            Err(e) => {
                tracing::warn!(ticket = ticket.0, error = ?e, "extraction failed");
                Outcome::Failed(e)
            }
        }
    }

    /// Forget the pending request, if any. Its result will be ignored.
    pub(crate) fn abandon(&mut self) -> bool {
        match self.pending.take() {
            Some(p) => {
                tracing::info!(ticket = p.ticket.0, "extraction abandoned");
                true
            }
            None => false,
        }
    }

    /// Admission, remote call and settlement in one step, for callers that
    /// can simply wait.
    pub(crate) async fn extract(
        &mut self,
        ai: &dyn ReceiptAi,
        kind: InputKind,
        attachment: &Attachment,
    ) -> Result<ReceiptRecord, ExtractError> {
        let ticket = self.begin_extraction(kind)?;
        let result = ai.extract(kind, attachment).await;
        match self.finish_extraction(ticket, result) {
            Outcome::Ready(record) => Ok(record),
            Outcome::Failed(e) => Err(e),
            Outcome::Ignored => Err(ExtractError::transport("request superseded")),
        }
    }

    // ── Analysis ──────────────────────────────────────────────

    /// Quota gate for a spending question. Nothing is consumed yet.
    pub(crate) fn begin_analysis(&self) -> Result<(), ExtractError> {
        if self.quota.is_limit_reached(self.store.as_ref()) {
            tracing::info!(limit = self.quota.limit(), "analysis refused, quota exhausted");
            return Err(ExtractError::QuotaExceeded {
                limit: self.quota.limit(),
            });
        }
        Ok(())
    }

    /// Settle a finished analysis. An answer costs one credit; a failure is free.
    pub(crate) fn finish_analysis(
        &mut self,
        result: Result<String, ExtractError>,
    ) -> Result<String, ExtractError> {
        match result {
            Ok(text) => {
                let state = self.quota.increment(self.store.as_ref());
                tracing::info!(used = state.count, "analysis succeeded");
                Ok(text)
            }
            Err(e) => {
                tracing::warn!(error = ?e, "analysis failed");
                Err(e)
            }
        }
    }

    pub(crate) async fn analyze(&mut self, ai: &dyn ReceiptAi, query: &str) -> Result<String, ExtractError> {
        self.begin_analysis()?;
        let result = ai.analyze(self.ledger.all(), query).await;
        self.finish_analysis(result)
    }

    // ── Receipts ──────────────────────────────────────────────

    pub(crate) fn validate(&self, draft: &Draft) -> ValidationReport {
        validate::validate_now(&draft.record)
    }

    /// Save a draft if it passes validation, returning the receipt id.
    pub(crate) fn save_draft(&mut self, draft: &Draft) -> Result<i64, ValidationReport> {
        self.save_draft_on(draft, chrono::Local::now().date_naive())
    }

    pub(crate) fn save_draft_on(&mut self, draft: &Draft, today: NaiveDate) -> Result<i64, ValidationReport> {
        let report = validate::validate(&draft.record, today);
        if !report.can_save() {
            tracing::debug!(errors = report.errors.len(), "draft rejected");
            return Err(report);
        }
        let store = self.store.as_ref();
        let id = match draft.id {
            Some(id) if self.ledger.update(store, id, draft.record.clone()) => id,
            // The receipt was deleted while being edited; keep the user's work.
            _ => self.ledger.save_new(store, draft.record.clone()),
        };
        Ok(id)
    }

    pub(crate) fn delete(&mut self, id: i64) -> bool {
        self.ledger.delete(self.store.as_ref(), id)
    }

    pub(crate) fn export(&self, path: &Path) -> Result<usize> {
        self.ledger.export_to_csv(path)
    }
}

#[cfg(test)]
mod tests;
