use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::report::late_reminder_targets;
use crate::schedule::Tier;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_money, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Summary cards
            Constraint::Min(8),    // Tier breakdown + late list
            Constraint::Length(3), // Collection gauge
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);
    render_tier_chart(f, middle[0], app);
    render_late_list(f, middle[1], app);

    render_collection_gauge(f, chunks[2], app);
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()))
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let s = &app.summary;
    render_card(
        f,
        cards[0],
        "Receivables",
        format_money(s.receivables, &app.currency),
        theme::ACCENT,
        format!("{} plans", s.client_count),
    );
    render_card(
        f,
        cards[1],
        "Collected",
        format_money(s.collected, &app.currency),
        theme::GREEN,
        format!("{}% of receivables", s.collected_percent()),
    );
    render_card(
        f,
        cards[2],
        "Outstanding",
        format_money(s.outstanding, &app.currency),
        if s.outstanding > Decimal::ZERO {
            theme::YELLOW
        } else {
            theme::GREEN
        },
        format!("{} overdue", format_money(s.arrears, &app.currency)),
    );
    render_card(
        f,
        cards[3],
        "Clients",
        s.client_count.to_string(),
        theme::TEXT,
        format!("{} late", s.late_count),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: String,
    color: ratatui::style::Color,
    subtitle: String,
) {
    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(titled_block(title));

    f.render_widget(text, area);
}

fn render_tier_chart(f: &mut Frame, area: Rect, app: &App) {
    if app.summary.client_count == 0 {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No clients yet. Add one with :add-client or :import a sheet",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(titled_block("Status"));
        f.render_widget(msg, area);
        return;
    }

    let bars: Vec<Bar> = Tier::all()
        .iter()
        .map(|tier| {
            let style = theme::tier_style(*tier);
            Bar::default()
                .value(app.summary.count(*tier) as u64)
                .label(Line::from(tier.label(app.locale)))
                .style(style)
                .value_style(style.fg(theme::HEADER_BG).bg(theme::status_color(tier.color())))
        })
        .collect();

    let chart = BarChart::default()
        .block(titled_block("Status"))
        .data(BarGroup::default().bars(&bars))
        .bar_width(9)
        .bar_gap(2);

    f.render_widget(chart, area);
}

fn render_late_list(f: &mut Frame, area: Rect, app: &App) {
    let targets = late_reminder_targets(&app.portfolio);
    let title = format!("Late ({})", targets.len());

    let mut lines: Vec<Line> = Vec::new();
    if targets.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Nobody is behind schedule",
            theme::dim_style(),
        )));
    }

    let mut ranked = targets;
    ranked.sort_by(|a, b| b.arrears().cmp(&a.arrears()));
    let name_width = area.width.saturating_sub(24).max(8) as usize;
    for s in ranked.iter().take(area.height.saturating_sub(2) as usize) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", truncate(&s.client.name, name_width), width = name_width),
                theme::normal_style(),
            ),
            Span::styled(
                format!(" {:>20}", format_money(s.arrears(), &app.currency)),
                theme::tier_style(Tier::Late),
            ),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(titled_block(&title)), area);
}

fn render_collection_gauge(f: &mut Frame, area: Rect, app: &App) {
    let pct = app
        .summary
        .collected_percent()
        .to_u16()
        .unwrap_or(0)
        .min(100);
    let gauge = Gauge::default()
        .block(titled_block("Collection progress"))
        .gauge_style(Style::default().fg(theme::GREEN).bg(theme::SURFACE))
        .percent(pct)
        .label(Span::styled(format!("{pct}%"), theme::normal_style()));
    f.render_widget(gauge, area);
}
