use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use super::worker::Worker;
use crate::ai::{Attachment, InputKind};
use crate::models::{Preset, ReceiptRecord, PRESETS};
use crate::session::{Draft, Session};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Session, &Worker) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SnapLedger", cmd_quit, r);
    register_command!("quit", "Quit SnapLedger", cmd_quit, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "scan",
        "Extract a receipt photo (e.g. :scan ~/receipt.jpg)",
        cmd_scan,
        r
    );
    register_command!(
        "voice",
        "Extract a spoken expense (e.g. :voice ~/memo.m4a)",
        cmd_voice,
        r
    );
    register_command!("new", "Enter a receipt by hand", cmd_new, r);
    register_command!(
        "preset",
        "Quick add (e.g. :preset parking | toll | coffee)",
        cmd_preset,
        r
    );
    register_command!("edit", "Edit the selected receipt", cmd_edit, r);
    register_command!("delete", "Delete the selected receipt", cmd_delete, r);
    register_command!("save", "Save the receipt under review", cmd_save, r);
    register_command!(
        "discard",
        "Drop the draft and cancel a pending scan",
        cmd_discard,
        r
    );
    register_command!(
        "ask",
        "Ask about your spending (e.g. :ask what is missing a purpose?)",
        cmd_ask,
        r
    );
    register_command!(
        "export",
        "Export receipts to CSV (e.g. :export ~/expenses.csv)",
        cmd_export,
        r
    );
    register_command!("receipts", "Go to Receipts", cmd_receipts, r);
    register_command!("review", "Go to Review", cmd_review, r);
    register_command!("analysis", "Go to Analysis", cmd_analysis, r);

    r
});

pub(crate) fn handle_command(
    input: &str,
    app: &mut App,
    session: &mut Session,
    worker: &Worker,
) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, session, worker)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_scan(args: &str, app: &mut App, session: &mut Session, worker: &Worker) -> anyhow::Result<()> {
    start_extraction(args, InputKind::Image, app, session, worker);
    Ok(())
}

fn cmd_voice(args: &str, app: &mut App, session: &mut Session, worker: &Worker) -> anyhow::Result<()> {
    start_extraction(args, InputKind::Voice, app, session, worker);
    Ok(())
}

fn start_extraction(args: &str, kind: InputKind, app: &mut App, session: &mut Session, worker: &Worker) {
    if args.is_empty() {
        let usage = match kind {
            InputKind::Image => "Usage: :scan <image file>",
            InputKind::Voice => "Usage: :voice <audio file>",
        };
        app.set_status(usage);
        return;
    }

    let path = crate::run::shellexpand(args);
    let attachment = match Attachment::from_path(Path::new(&path), kind) {
        Ok(a) => a,
        Err(e) => {
            app.set_status(format!("{e:#}"));
            return;
        }
    };

    let superseding = session.is_busy();
    match session.begin_extraction(kind) {
        Ok(ticket) => {
            worker.extract(ticket, kind, attachment);
            if superseding {
                app.set_status(format!("Previous scan dropped. Reading {kind}... (Esc to cancel)"));
            } else {
                app.set_status(format!("Reading {kind}... (Esc to cancel)"));
            }
        }
        Err(e) => app.set_status(e.to_string()),
    }
}

fn cmd_new(_args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    session.abandon();
    app.open_draft(Draft::new(ReceiptRecord::dated(&App::today())), session);
    app.set_status("New receipt. Enter edits a field, :save when done");
    Ok(())
}

fn cmd_preset(args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let Some(preset) = Preset::find(args) else {
        let keys: Vec<&str> = PRESETS.iter().map(|p| p.key).collect();
        app.set_status(format!("Usage: :preset <{}>", keys.join(" | ")));
        return Ok(());
    };
    session.abandon();
    app.open_draft(Draft::new(preset.draft(&App::today())), session);
    app.set_status(format!("{} ready. :save to keep it", preset.label));
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let Some(saved) = target_receipt(args, app, session) else {
        return Ok(());
    };
    let draft = Draft::editing(saved);
    session.abandon();
    app.open_draft(draft, session);
    app.set_status("Editing saved receipt. :save to update it");
    Ok(())
}

fn cmd_delete(args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let Some(saved) = target_receipt(args, app, session) else {
        return Ok(());
    };
    let name = saved
        .record
        .transaction_name
        .clone()
        .unwrap_or_else(|| "(unnamed)".into());
    app.confirm_message = format!("Delete '{name}'?");
    app.pending_action = Some(PendingAction::DeleteReceipt { id: saved.id, name });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

/// The receipt named by `args` (an id), or the one under the cursor.
fn target_receipt<'a>(
    args: &str,
    app: &mut App,
    session: &'a Session,
) -> Option<&'a crate::models::SavedReceipt> {
    let found = if args.is_empty() {
        session.ledger().all().get(app.receipt_index)
    } else {
        match args.parse::<i64>() {
            Ok(id) => session.ledger().get(id),
            Err(_) => {
                app.set_status(format!("Invalid receipt id: {args}"));
                return None;
            }
        }
    };
    if found.is_none() {
        app.set_status("No receipt selected");
    }
    found
}

fn cmd_save(_args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let Some(draft) = app.draft.clone() else {
        app.set_status("Nothing to save. Use :scan, :voice, :new or :preset first");
        return Ok(());
    };
    match session.save_draft(&draft) {
        Ok(id) => {
            let name = draft.record.transaction_name.unwrap_or_default();
            app.close_draft();
            app.screen = Screen::Receipts;
            app.select_receipt(id, session);
            app.set_status(format!("Saved: {name}"));
        }
        Err(report) => {
            let count = report.errors.len();
            app.report = report;
            app.screen = Screen::Review;
            app.set_status(format!(
                "Fix {count} error{} before saving",
                if count == 1 { "" } else { "s" }
            ));
        }
    }
    Ok(())
}

fn cmd_discard(_args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let cancelled = session.abandon();
    let had_draft = app.draft.is_some();
    app.close_draft();
    app.screen = Screen::Receipts;
    app.set_status(match (cancelled, had_draft) {
        (true, _) => "Scan cancelled",
        (false, true) => "Draft discarded",
        (false, false) => "Nothing to discard",
    });
    Ok(())
}

fn cmd_ask(args: &str, app: &mut App, session: &mut Session, worker: &Worker) -> anyhow::Result<()> {
    app.screen = Screen::Analysis;
    if args.is_empty() {
        app.set_status("Usage: :ask <question about your spending>");
        return Ok(());
    }
    if let Err(e) = session.begin_analysis() {
        app.set_status(e.to_string());
        return Ok(());
    }
    let ticket = app.begin_analysis(args);
    worker.analyze(ticket, session.ledger().all().to_vec(), args.to_string());
    app.set_status("Analyzing your receipts...");
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/snapledger-export.csv")
    } else {
        crate::run::shellexpand(args)
    };

    if session.ledger().is_empty() {
        app.set_status("No receipts to export");
        return Ok(());
    }
    match session.export(Path::new(&path)) {
        Ok(count) => app.set_status(format!("Exported {count} receipts to {path}")),
        Err(e) => app.set_status(format!("Export failed: {e:#}")),
    }
    Ok(())
}

fn cmd_receipts(_args: &str, app: &mut App, session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    app.screen = Screen::Receipts;
    app.clamp_receipt_cursor(session.ledger().len());
    Ok(())
}

fn cmd_review(_args: &str, app: &mut App, _session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    if app.draft.is_none() {
        app.set_status("No receipt under review");
    }
    app.screen = Screen::Review;
    Ok(())
}

fn cmd_analysis(_args: &str, app: &mut App, _session: &mut Session, _worker: &Worker) -> anyhow::Result<()> {
    app.screen = Screen::Analysis;
    Ok(())
}
