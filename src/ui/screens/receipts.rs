use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::session::Session;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App, session: &Session) {
    let ledger = session.ledger();
    if ledger.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No receipts yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Snap one with :scan <photo>, say one with :voice <recording>,",
                theme::dim_style(),
            )),
            Line::from(Span::styled(
                "or add one with :new or :preset parking",
                theme::dim_style(),
            )),
        ];
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Receipts (0) ", theme::block_title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(4)])
        .split(area);

    render_table(f, chunks[0], app, session);
    render_totals(f, chunks[1], session);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, session: &Session) {
    let ledger = session.ledger();
    let header_cells = ["Date", "Transaction", "Category", "Client/Prospect", "Amount"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = ledger
        .all()
        .iter()
        .enumerate()
        .skip(app.receipt_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, saved)| {
            let rec = &saved.record;
            let style = if i == app.receipt_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let amount = rec.total_amount.map(format_amount).unwrap_or_else(|| "—".into());

            Row::new(vec![
                Cell::from(rec.transaction_date.clone().unwrap_or_else(|| "—".into())),
                Cell::from(truncate(rec.transaction_name.as_deref().unwrap_or("—"), 32)),
                Cell::from(Span::styled(rec.category.as_str(), theme::category_style(rec.category))),
                Cell::from(truncate(rec.client_or_prospect.as_deref().unwrap_or(""), 20)),
                Cell::from(Span::styled(amount, theme::amount_style())),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(21),
        Constraint::Length(20),
        Constraint::Length(12),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                format!(" Receipts ({}) ", ledger.len()),
                theme::block_title_style(),
            )),
    );

    f.render_widget(table, area);
}

fn render_totals(f: &mut Frame, area: Rect, session: &Session) {
    let ledger = session.ledger();
    let mut spans: Vec<Span> = Vec::new();
    for (category, total) in ledger.totals_by_category() {
        if !spans.is_empty() {
            spans.push(Span::styled("  ·  ", theme::dim_style()));
        }
        spans.push(Span::styled(format!("{category} "), theme::category_style(category)));
        spans.push(Span::styled(format_amount(total), theme::amount_style()));
    }

    let lines = vec![
        Line::from(spans),
        Line::from(vec![
            Span::styled("Total ", theme::dim_style()),
            Span::styled(format_amount(ledger.total()), theme::amount_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" By category ", theme::block_title_style()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
