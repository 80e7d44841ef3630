use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, EditTarget, InputMode, Screen};
use super::commands;
use super::theme;
use super::util;
use crate::session::Session;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub(crate) fn render(f: &mut Frame, app: &App, session: &Session) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    render_screen(f, chunks[1], app, session);
    render_status_bar(f, chunks[2], app, session);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let num = format!("{}", i + 1);
            if *s == app.screen {
                Line::from(vec![
                    Span::styled(format!("{num}:"), Style::default().fg(theme::TEXT_DIM)),
                    Span::styled(
                        format!("{s}"),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                Line::from(Span::styled(
                    format!("{num}:{s}"),
                    Style::default().fg(theme::TEXT_DIM),
                ))
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn render_screen(f: &mut Frame, area: Rect, app: &App, session: &Session) {
    match app.screen {
        Screen::Receipts => super::screens::receipts::render(f, area, app, session),
        Screen::Review => super::screens::review::render(f, area, app),
        Screen::Analysis => super::screens::analysis::render(f, area, app),
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App, session: &Session) {
    let mode_label = format!(" {} ", app.input_mode);
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD),
        InputMode::Command | InputMode::Editing => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::GREEN)
            .add_modifier(Modifier::BOLD),
        InputMode::Confirm => Style::default()
            .fg(theme::HEADER_BG)
            .bg(theme::RED)
            .add_modifier(Modifier::BOLD),
    };

    let quota = session.quota();
    let limit = session.quota_limit();
    let frame = SPINNER[(app.tick as usize / 2) % SPINNER.len()];
    let busy = match session.pending_kind() {
        Some(kind) => format!(" {frame} reading {kind}"),
        None if app.analysis_pending.is_some() => format!(" {frame} analyzing"),
        None => String::new(),
    };
    let info = format!(
        " {} | {} receipts | {}{busy}",
        app.screen,
        session.ledger().len(),
        util::credits_label(quota.count, limit)
    );
    let credits_style = theme::credits_style(quota.count, limit);

    let right = match app.screen {
        Screen::Receipts => " e edit | D delete | n new | ? help ",
        Screen::Review => " j/k field | Enter edit | +/- category | :save ",
        Screen::Analysis => " Enter ask | ? help ",
    };

    let available = area.width as usize;
    let used = mode_label.len() + info.len() + right.len();
    let pad = available.saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style),
        Span::styled(&info, credits_style),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Editing => {
            let prompt = match app.edit_target {
                Some(EditTarget::Field(field)) => format!("{}> ", field.label()),
                Some(EditTarget::Query) | None => "ask> ".to_string(),
            };
            let offset = (prompt.chars().count() + app.command_input.chars().count()) as u16;
            (
                Line::from(vec![
                    Span::styled(prompt, Style::default().fg(theme::GREEN)),
                    Span::styled(&app.command_input, theme::command_bar_style()),
                ]),
                Some(offset),
            )
        }
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal => (
            if app.status_message.is_empty() {
                Line::from(Span::styled(
                    " Press : for commands, ? for help",
                    theme::dim_style(),
                ))
            } else {
                Line::from(Span::styled(
                    &app.status_message,
                    theme::command_bar_style(),
                ))
            },
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let section = |title: &'static str| {
        Line::from(Span::styled(
            title,
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        ))
    };

    let mut help_text = vec![
        Line::from(Span::styled(
            " SnapLedger Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section(" Navigation"),
        Line::from(Span::styled(
            "  j/k or Up/Down   Move cursor           1-3        Switch tabs",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  Tab/Shift-Tab    Cycle tabs            g/G        Top/Bottom",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  Esc              Cancel scan / back    Ctrl-q     Quit",
            theme::normal_style(),
        )),
        Line::from(""),
        section(" Actions"),
        Line::from(Span::styled(
            "  n (Receipts)     New receipt           e / D      Edit / Delete",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  Enter (Review)   Edit field            +/-        Cycle category",
            theme::normal_style(),
        )),
        Line::from(Span::styled(
            "  Enter (Analysis) Ask a question        :          Command mode",
            theme::normal_style(),
        )),
        Line::from(""),
        section(" Commands"),
    ];

    let mut seen = std::collections::HashSet::new();
    let mut cmd_lines: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        if name.len() <= 1 {
            continue;
        }
        if seen.insert(cmd.description) {
            cmd_lines.push((name, cmd.description));
        }
    }
    cmd_lines.sort_by_key(|(name, _)| *name);
    for (name, desc) in &cmd_lines {
        help_text.push(Line::from(Span::styled(
            format!("  :{name:<10} {desc}"),
            theme::normal_style(),
        )));
    }

    help_text.push(Line::from(""));
    help_text.push(Line::from(Span::styled(
        " Press any key to close ",
        Style::default().fg(theme::TEXT_DIM),
    )));

    // Center the popup, clamped to terminal height
    let popup_height = (help_text.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 76.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(help_text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
