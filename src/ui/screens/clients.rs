use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let clients = app.visible_clients();
    let filter_note = match app.tier_filter {
        Some(tier) => format!("[{}] ", tier.label(app.locale)),
        None => String::new(),
    };
    let search_note = if app.search_input.is_empty() {
        String::new()
    } else {
        format!("search: '{}'", app.search_input)
    };
    let title = format!(" Clients ({}) {filter_note}{search_note} ", clients.len());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(title, theme::title_style()));

    if clients.is_empty() {
        let hint = if !app.search_input.is_empty() || app.tier_filter.is_some() {
            "Nothing matches. Esc clears the search, :filter all clears the status filter"
        } else {
            "No clients yet. Add one with :add-client or :import a sheet"
        };
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(hint, theme::dim_style())),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = [
        "Name", "Phone", "Total", "Monthly", "Paid", "Remaining", "Start", "End", "Status",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = clients
        .iter()
        .enumerate()
        .skip(app.client_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, s)| {
            let style = if i == app.client_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let status = if i == app.client_index {
                Span::raw(s.tier.label(app.locale))
            } else {
                Span::styled(s.tier.label(app.locale), theme::tier_style(s.tier))
            };

            Row::new(vec![
                Cell::from(truncate(&s.client.name, 28)),
                Cell::from(s.client.phone.clone()),
                Cell::from(format_amount(s.client.total)),
                Cell::from(format_amount(s.client.monthly_installment())),
                Cell::from(format_amount(s.paid)),
                Cell::from(format_amount(s.remaining)),
                Cell::from(s.client.start_date.clone()),
                Cell::from(s.end_date.to_string()),
                Cell::from(status),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(13),
        Constraint::Length(11),
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(8),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
