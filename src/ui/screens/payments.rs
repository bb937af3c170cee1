use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::schedule::ClientStanding;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, format_money};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(standing) = app.payments_client.as_ref() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Payments ", theme::title_style()));
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Select a client on the Clients screen and press Enter",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(5)])
        .split(area);

    render_plan_header(f, chunks[0], app, standing);
    render_history(f, chunks[1], app);
}

fn render_plan_header(f: &mut Frame, area: Rect, app: &App, s: &ClientStanding) {
    let money = |v| format_money(v, &app.currency);
    let label = |text: &str| Span::styled(format!("{text:<12}"), theme::dim_style());
    let expected = s
        .expected
        .map(money)
        .unwrap_or_else(|| "not started".to_string());

    let lines = vec![
        Line::from(vec![
            label("Phone"),
            Span::styled(s.client.phone.clone(), theme::normal_style()),
            Span::raw("    "),
            label("Status"),
            Span::styled(s.tier.label(app.locale), theme::tier_style(s.tier)),
        ]),
        Line::from(vec![
            label("Plan"),
            Span::styled(
                format!(
                    "{} over {} months ({} / month), {} to {}",
                    money(s.client.total),
                    s.client.months,
                    money(s.client.monthly_installment()),
                    s.client.start_date,
                    s.end_date
                ),
                theme::normal_style(),
            ),
        ]),
        Line::from(vec![
            label("Paid"),
            Span::styled(money(s.paid), Style::default().fg(theme::GREEN)),
            Span::raw("    "),
            label("Remaining"),
            Span::styled(money(s.remaining), theme::normal_style()),
        ]),
        Line::from(vec![
            label("Due so far"),
            Span::styled(expected, theme::normal_style()),
            Span::raw("    "),
            label("Overdue"),
            Span::styled(money(s.arrears()), theme::tier_style(s.tier)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" {} ", s.client.name),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_history(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" History ({}) ", app.payments.len()),
            theme::title_style(),
        ));

    if app.payments.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No payments yet. Press P or use :pay <amount>",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header = Row::new(
        ["Date", "Amount", "Recorded"]
            .iter()
            .map(|h| Cell::from(*h).style(theme::header_style())),
    )
    .height(1);

    let rows: Vec<Row> = app
        .payments
        .iter()
        .enumerate()
        .skip(app.payment_scroll)
        .take(area.height.saturating_sub(3) as usize)
        .map(|(i, p)| {
            let style = if i == app.payment_index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let recorded = p.created_at.get(..10).unwrap_or(&p.created_at).to_string();
            Row::new(vec![
                Cell::from(p.date.clone()),
                Cell::from(format_amount(p.amount)),
                Cell::from(recorded),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Length(16),
        Constraint::Min(12),
    ];
    f.render_widget(Table::new(rows, widths).header(header).block(block), area);
}
