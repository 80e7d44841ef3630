use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use crate::models::Field;
use crate::session::Session;
use crate::ui::app::{App, EditTarget, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{scroll_down, scroll_to_bottom, scroll_up};
use crate::ui::worker::Worker;

/// How long to wait for a key before checking on AI work again.
const TICK: Duration = Duration::from_millis(100);

pub(crate) fn as_tui(session: &mut Session, worker: &Worker) -> Result<()> {
    let mut app = App::new();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, session, worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "TUI exited with error");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
    worker: &Worker,
) -> Result<()> {
    while app.running {
        while let Some(ai_event) = worker.try_recv() {
            app.apply_ai_event(ai_event, session);
        }

        terminal.draw(|f| {
            // tab + status + command bars, table borders + header, totals block
            let content_height = f.area().height.saturating_sub(10) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app, session);
        })?;

        if !event::poll(TICK)? {
            app.tick = app.tick.wrapping_add(1);
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, session, worker)?,
                InputMode::Command => handle_command_input(key, app, session, worker)?,
                InputMode::Editing => handle_editing_input(key, app, session, worker)?,
                InputMode::Confirm => handle_confirm_input(key, app, session),
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(
    key: event::KeyEvent,
    app: &mut App,
    session: &mut Session,
    worker: &Worker,
) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.running = false;
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app, session),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app, session),
        KeyCode::Char('1') => app.screen = Screen::Receipts,
        KeyCode::Char('2') => app.screen = Screen::Review,
        KeyCode::Char('3') => app.screen = Screen::Analysis,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            app.screen = screens[(idx + 1) % screens.len()];
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            app.screen = screens[(idx + screens.len() - 1) % screens.len()];
        }
        KeyCode::Enter => handle_enter(app, session, worker)?,
        KeyCode::Esc => handle_escape(app, session),
        KeyCode::Char('+') | KeyCode::Char('=') if app.screen == Screen::Review => {
            app.cycle_category(1, session);
        }
        KeyCode::Char('-') if app.screen == Screen::Review => {
            app.cycle_category(-1, session);
        }
        KeyCode::Char('s') if app.screen == Screen::Review => {
            commands::handle_command("save", app, session, worker)?;
        }
        KeyCode::Char('e') if app.screen == Screen::Receipts => {
            commands::handle_command("edit", app, session, worker)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Receipts => {
            commands::handle_command("delete", app, session, worker)?;
        }
        KeyCode::Char('n') if app.screen == Screen::Receipts => {
            commands::handle_command("new", app, session, worker)?;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app, session);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(
    key: event::KeyEvent,
    app: &mut App,
    session: &mut Session,
    worker: &Worker,
) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, session, worker)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_editing_input(
    key: event::KeyEvent,
    app: &mut App,
    session: &mut Session,
    worker: &Worker,
) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            match app.edit_target.take() {
                Some(EditTarget::Field(field)) => {
                    app.apply_field(field, &input, session);
                    match app.report.error(field) {
                        Some(msg) => {
                            let msg = msg.to_string();
                            app.set_status(msg);
                        }
                        None => app.set_status(format!("{} updated", field.label())),
                    }
                }
                Some(EditTarget::Query) => {
                    commands::handle_command(&format!("ask {input}"), app, session, worker)?;
                }
                None => {}
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.edit_target = None;
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, session: &mut Session) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            match app.pending_action.take() {
                Some(PendingAction::DeleteReceipt { id, name }) => {
                    if session.delete(id) {
                        app.clamp_receipt_cursor(session.ledger().len());
                        app.set_status(format!("Deleted: {name}"));
                    } else {
                        app.set_status(format!("Receipt {id} no longer exists"));
                    }
                }
                Some(PendingAction::DiscardDraft) => {
                    app.close_draft();
                    app.screen = Screen::Receipts;
                    app.set_status("Draft discarded");
                }
                None => {}
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn handle_move_down(app: &mut App, session: &Session) {
    match app.screen {
        Screen::Receipts => scroll_down(
            &mut app.receipt_index,
            &mut app.receipt_scroll,
            session.ledger().len(),
            app.visible_rows.max(1),
        ),
        Screen::Review => {
            if app.field_index + 1 < Field::all().len() {
                app.field_index += 1;
            }
        }
        Screen::Analysis => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Receipts => scroll_up(&mut app.receipt_index, &mut app.receipt_scroll),
        Screen::Review => app.field_index = app.field_index.saturating_sub(1),
        Screen::Analysis => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Receipts => {
            app.receipt_index = 0;
            app.receipt_scroll = 0;
        }
        Screen::Review => app.field_index = 0,
        Screen::Analysis => {}
    }
}

fn handle_goto_bottom(app: &mut App, session: &Session) {
    match app.screen {
        Screen::Receipts => scroll_to_bottom(
            &mut app.receipt_index,
            &mut app.receipt_scroll,
            session.ledger().len(),
            app.visible_rows.max(1),
        ),
        Screen::Review => app.field_index = Field::all().len() - 1,
        Screen::Analysis => {}
    }
}

fn handle_enter(app: &mut App, session: &mut Session, worker: &Worker) -> Result<()> {
    match app.screen {
        Screen::Receipts => commands::handle_command("edit", app, session, worker)?,
        Screen::Review => {
            let Some(draft) = app.draft.as_ref() else {
                app.set_status("No receipt under review. Use :scan, :voice, :new or :preset");
                return Ok(());
            };
            let field = app.selected_field();
            app.command_input = draft.record.field_text(field);
            app.edit_target = Some(EditTarget::Field(field));
            app.input_mode = InputMode::Editing;
        }
        Screen::Analysis => {
            app.command_input = app.analysis_query.clone();
            app.edit_target = Some(EditTarget::Query);
            app.input_mode = InputMode::Editing;
        }
    }
    Ok(())
}

fn handle_escape(app: &mut App, session: &mut Session) {
    if session.abandon() {
        app.set_status("Scan cancelled");
        return;
    }
    if app.screen == Screen::Review && app.draft.is_some() {
        app.confirm_message = "Discard this receipt?".into();
        app.pending_action = Some(PendingAction::DiscardDraft);
        app.input_mode = InputMode::Confirm;
        return;
    }
    app.status_message.clear();
}
