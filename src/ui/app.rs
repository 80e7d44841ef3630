use chrono::Local;

use super::worker::AiEvent;
use crate::models::{Field, ReceiptRecord};
use crate::session::{Draft, Outcome, Session};
use crate::validate::ValidationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Receipts,
    Review,
    Analysis,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[Self::Receipts, Self::Review, Self::Analysis]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Receipts => write!(f, "Receipts"),
            Self::Review => write!(f, "Review"),
            Self::Analysis => write!(f, "Analysis"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// What the edit line is currently writing to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EditTarget {
    Field(Field),
    Query,
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone)]
pub(crate) enum PendingAction {
    DeleteReceipt { id: i64, name: String },
    DiscardDraft,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) tick: u64,

    // Receipts
    pub(crate) receipt_index: usize,
    pub(crate) receipt_scroll: usize,

    // Review
    pub(crate) draft: Option<Draft>,
    pub(crate) report: ValidationReport,
    pub(crate) field_index: usize,
    pub(crate) edit_target: Option<EditTarget>,

    // Analysis
    pub(crate) analysis_query: String,
    pub(crate) analysis_answer: Option<String>,
    pub(crate) analysis_pending: Option<u64>,
    next_analysis_ticket: u64,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            screen: Screen::Receipts,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            show_help: false,
            tick: 0,

            receipt_index: 0,
            receipt_scroll: 0,

            draft: None,
            report: ValidationReport::default(),
            field_index: 0,
            edit_target: None,

            analysis_query: String::new(),
            analysis_answer: None,
            analysis_pending: None,
            next_analysis_ticket: 0,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    pub(crate) fn today() -> String {
        Local::now().format("%Y-%m-%d").to_string()
    }

    // ── Draft ─────────────────────────────────────────────────

    /// Put a record up for review and validate it right away.
    pub(crate) fn open_draft(&mut self, draft: Draft, session: &Session) {
        self.report = session.validate(&draft);
        self.draft = Some(draft);
        self.field_index = 0;
        self.screen = Screen::Review;
    }

    pub(crate) fn close_draft(&mut self) {
        self.draft = None;
        self.report = ValidationReport::default();
        self.field_index = 0;
        self.edit_target = None;
    }

    pub(crate) fn selected_field(&self) -> Field {
        let fields = Field::all();
        fields[self.field_index.min(fields.len() - 1)]
    }

    pub(crate) fn apply_field(&mut self, field: Field, input: &str, session: &Session) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        draft.record.set_field(field, input);
        self.report = session.validate(draft);
    }

    pub(crate) fn cycle_category(&mut self, delta: i32, session: &Session) {
        let Some(draft) = self.draft.as_mut() else {
            return;
        };
        draft.record.category = draft.record.category.cycle(delta);
        self.report = session.validate(draft);
    }

    // ── Receipts ──────────────────────────────────────────────

    /// Keep the cursor on a real row after the list shrinks.
    pub(crate) fn clamp_receipt_cursor(&mut self, len: usize) {
        if self.receipt_index >= len {
            self.receipt_index = len.saturating_sub(1);
        }
        if self.receipt_scroll > self.receipt_index {
            self.receipt_scroll = self.receipt_index;
        }
    }

    pub(crate) fn select_receipt(&mut self, id: i64, session: &Session) {
        if let Some(pos) = session.ledger().position(id) {
            self.receipt_index = pos;
            let page = self.visible_rows.max(1);
            if pos < self.receipt_scroll || pos >= self.receipt_scroll + page {
                self.receipt_scroll = pos.saturating_sub(page / 2);
            }
        }
    }

    // ── Analysis ──────────────────────────────────────────────

    pub(crate) fn begin_analysis(&mut self, query: &str) -> u64 {
        self.next_analysis_ticket += 1;
        self.analysis_query = query.to_string();
        self.analysis_answer = None;
        self.analysis_pending = Some(self.next_analysis_ticket);
        self.next_analysis_ticket
    }

    // ── AI results ────────────────────────────────────────────

    pub(crate) fn apply_ai_event(&mut self, event: AiEvent, session: &mut Session) {
        match event {
            AiEvent::Extracted { ticket, result } => match session.finish_extraction(ticket, result) {
                Outcome::Ready(record) => self.review_extracted(record, session),
                Outcome::Failed(e) => self.set_status(e.to_string()),
                Outcome::Ignored => {}
            },
            AiEvent::Analyzed { ticket, result } => {
                if self.analysis_pending != Some(ticket) {
                    tracing::debug!(ticket, "dropping stale analysis");
                    return;
                }
                self.analysis_pending = None;
                match session.finish_analysis(result) {
                    Ok(text) => {
                        self.analysis_answer = Some(text);
                        let remaining = session.quota().remaining(session.quota_limit());
                        self.set_status(format!(
                            "Analysis ready. {remaining} AI credits left this month"
                        ));
                    }
                    Err(e) => self.set_status(e.to_string()),
                }
            }
        }
    }

    fn review_extracted(&mut self, record: ReceiptRecord, session: &Session) {
        self.open_draft(Draft::new(record), session);
        let quota = session.quota();
        let remaining = quota.remaining(session.quota_limit());
        self.set_status(format!(
            "Review the details and :save. {remaining} AI credits left this month"
        ));
    }
}
