use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::ai::{Attachment, ExtractError, InputKind, ReceiptAi};
use crate::models::{ReceiptRecord, SavedReceipt};
use crate::session::Ticket;

/// A finished AI call, delivered back to the event loop.
#[derive(Debug)]
pub(crate) enum AiEvent {
    Extracted {
        ticket: Ticket,
        result: Result<ReceiptRecord, ExtractError>,
    },
    Analyzed {
        ticket: u64,
        result: Result<String, ExtractError>,
    },
}

/// Runs AI calls on the tokio runtime so the UI never blocks on the network.
pub(crate) struct Worker {
    ai: Arc<dyn ReceiptAi>,
    runtime: Handle,
    tx: Sender<AiEvent>,
    rx: Receiver<AiEvent>,
}

impl Worker {
    pub(crate) fn new(ai: Arc<dyn ReceiptAi>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { ai, runtime, tx, rx }
    }

    pub(crate) fn extract(&self, ticket: Ticket, kind: InputKind, attachment: Attachment) {
        let ai = Arc::clone(&self.ai);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = ai.extract(kind, &attachment).await;
            if tx.send(AiEvent::Extracted { ticket, result }).is_err() {
                tracing::debug!("UI gone before extraction finished");
            }
        });
    }

    pub(crate) fn analyze(&self, ticket: u64, receipts: Vec<SavedReceipt>, query: String) {
        let ai = Arc::clone(&self.ai);
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = ai.analyze(&receipts, &query).await;
            if tx.send(AiEvent::Analyzed { ticket, result }).is_err() {
                tracing::debug!("UI gone before analysis finished");
            }
        });
    }

    pub(crate) fn try_recv(&self) -> Option<AiEvent> {
        self.rx.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn recv_timeout(&self, timeout: std::time::Duration) -> Option<AiEvent> {
        self.rx.recv_timeout(timeout).ok()
    }
}
