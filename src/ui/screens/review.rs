use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Field;
use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(draft) = &app.draft else {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("Nothing to review", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Extracted receipts land here before they are saved",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Review ", theme::block_title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let selected = app.selected_field();
    let mut lines: Vec<Line> = Vec::new();
    for field in Field::all() {
        let value = draft.record.field_text(*field);
        let is_cursor = *field == selected;
        let label_style = if is_cursor {
            theme::selected_style()
        } else {
            theme::dim_style()
        };
        let shown = if value.is_empty() {
            Span::styled("(empty)", theme::dim_style())
        } else {
            Span::styled(value, theme::normal_style().add_modifier(Modifier::BOLD))
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<17}", field.label()), label_style),
            Span::raw(" "),
            shown,
        ]));

        if let Some(err) = app.report.error(*field) {
            lines.push(Line::from(Span::styled(format!("   ✗ {err}"), theme::error_style())));
        } else if let Some(warn) = app.report.warning(*field) {
            lines.push(Line::from(Span::styled(format!("   ! {warn}"), theme::warning_style())));
        }
    }

    let title = match draft.id {
        Some(id) => format!(" Review: editing #{id} "),
        None => " Review: new receipt ".to_string(),
    };
    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(title, theme::block_title_style())),
    );
    f.render_widget(form, chunks[0]);

    let footer = if app.report.can_save() {
        Line::from(Span::styled(
            " Ready to save. :save keeps it, :discard drops it",
            Style::default().fg(theme::GREEN),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                " Save disabled: {} field{} need attention",
                app.report.errors.len(),
                if app.report.errors.len() == 1 { "" } else { "s" }
            ),
            theme::error_style(),
        ))
    };
    f.render_widget(
        Paragraph::new(footer)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(theme::OVERLAY))),
        chunks[1],
    );
}
