use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let query = if app.analysis_query.is_empty() {
        Span::styled(
            "Press Enter or :ask to question your expenses",
            theme::dim_style(),
        )
    } else {
        Span::styled(app.analysis_query.as_str(), theme::normal_style())
    };
    f.render_widget(
        Paragraph::new(Line::from(query)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::OVERLAY))
                .title(Span::styled(" Question ", theme::block_title_style())),
        ),
        chunks[0],
    );

    let body: Vec<Line> = if app.analysis_pending.is_some() {
        vec![Line::from(Span::styled("Analyzing your receipts...", theme::dim_style()))]
    } else if let Some(answer) = &app.analysis_answer {
        answer
            .lines()
            .map(|l| Line::from(Span::styled(l.to_string(), theme::normal_style())))
            .collect()
    } else {
        vec![Line::from(Span::styled(
            "Answers point out claims a manager is likely to reject. Each answer uses 1 AI credit.",
            theme::dim_style(),
        ))]
    };
    f.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT))
                .title(Span::styled(" Analysis ", theme::block_title_style())),
        ),
        chunks[1],
    );
}
