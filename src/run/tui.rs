use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::config::Config;
use crate::db::Database;
use crate::schedule::Tier;
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::{format_amount, scroll_down, scroll_to_bottom, scroll_to_top, scroll_up};

pub(crate) fn as_tui(config: &Config, db: &mut Database) -> Result<()> {
    let mut app = App::new(config);
    app.refresh_all(db)?;
    tracing::info!("starting terminal UI");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!(error = ?e, "terminal UI stopped");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            if app.popup.is_some() {
                handle_popup_input(key, app);
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Search => handle_search_input(key, app, db)?,
                InputMode::Editing => handle_editing_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char('1') => switch_screen(app, db, Screen::Dashboard)?,
        KeyCode::Char('2') => switch_screen(app, db, Screen::Clients)?,
        KeyCode::Char('3') => switch_screen(app, db, Screen::Payments)?,
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, db, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, db, screens[prev])?;
        }
        KeyCode::Enter if app.screen == Screen::Clients => app.open_payments(db)?,
        KeyCode::Esc => handle_escape(app, db)?,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('f') if app.screen == Screen::Clients => cycle_tier_filter(app),
        KeyCode::Char('P') if app.screen != Screen::Dashboard => start_payment(app),
        KeyCode::Char('r') if app.screen != Screen::Dashboard => {
            commands::handle_command("remind", app, db)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Clients => {
            commands::handle_command("delete-client", app, db)?;
        }
        KeyCode::Char('D') if app.screen == Screen::Payments => {
            commands::handle_command("delete-payment", app, db)?;
        }
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
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

fn handle_search_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_all(db)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            live_search(app, db)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            live_search(app, db)?;
        }
        _ => {}
    }
    Ok(())
}

fn live_search(app: &mut App, db: &mut Database) -> Result<()> {
    app.screen = Screen::Clients;
    app.client_index = 0;
    app.client_scroll = 0;
    app.refresh_all(db)
}

fn handle_editing_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            if !input.trim().is_empty() {
                commands::record_payment(&input, app, db)?;
            }
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Payment cancelled");
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

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(action) = app.pending_action.take() {
                match action {
                    PendingAction::DeleteClient { id, name } => {
                        db.delete_client(id)?;
                        if app.screen == Screen::Payments {
                            app.screen = Screen::Clients;
                        }
                        app.refresh_all(db)?;
                        app.set_status(format!("Deleted client: {name}"));
                    }
                    PendingAction::DeletePayment { id, description } => {
                        db.delete_installment(id)?;
                        app.refresh_all(db)?;
                        app.set_status(format!("Deleted payment: {description}"));
                    }
                    PendingAction::ImportCommit => {
                        let clients = std::mem::take(&mut app.import_preview);
                        match db.insert_clients_batch(&clients) {
                            Ok(count) => {
                                app.screen = Screen::Clients;
                                app.refresh_all(db)?;
                                app.set_status(format!("Imported {count} clients"));
                            }
                            Err(e) => {
                                tracing::warn!(error = %e, "import rolled back");
                                app.set_status(format!("Import failed, nothing saved: {e}"));
                            }
                        }
                    }
                }
            }
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
        }
        _ => {
            // Any other key = cancel
            app.pending_action = None;
            app.import_preview.clear();
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
    Ok(())
}

fn handle_popup_input(key: event::KeyEvent, app: &mut App) {
    let page = app.visible_rows.max(1);
    let Some(popup) = app.popup.as_mut() else {
        return;
    };
    let max_scroll = popup.lines.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => popup.scroll = (popup.scroll + 1).min(max_scroll),
        KeyCode::Char('k') | KeyCode::Up => popup.scroll = popup.scroll.saturating_sub(1),
        KeyCode::PageDown => popup.scroll = (popup.scroll + page).min(max_scroll),
        KeyCode::PageUp => popup.scroll = popup.scroll.saturating_sub(page),
        _ => app.popup = None,
    }
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, db: &mut Database, screen: Screen) -> Result<()> {
    if screen == Screen::Payments && app.payments_client.is_none() {
        return app.open_payments(db);
    }
    app.screen = screen;
    app.refresh_all(db)
}

/// Open the payment prompt prefilled with the monthly installment.
fn start_payment(app: &mut App) {
    let Some(target) = app.focused_client() else {
        app.set_status("Select a client first");
        return;
    };
    if target.tier == Tier::Paid {
        let name = target.client.name.clone();
        app.set_status(format!("{name} has paid in full"));
        return;
    }
    let suggested = target
        .client
        .monthly_installment()
        .min(target.remaining)
        .round_dp(2);
    app.command_input = format_amount(suggested).replace(',', "");
    app.input_mode = InputMode::Editing;
}

fn cycle_tier_filter(app: &mut App) {
    let next = match app.tier_filter {
        None => Some(Tier::Late),
        Some(Tier::Late) => Some(Tier::Current),
        Some(Tier::Current) => Some(Tier::Paid),
        Some(Tier::Paid) => None,
    };
    app.set_tier_filter(next);
    let label = next.map_or("all".to_string(), |t| t.label(app.locale).to_string());
    app.set_status(format!("Filter: {label}"));
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows.max(1);
    match app.screen {
        Screen::Clients => {
            let len = app.visible_clients().len();
            scroll_down(&mut app.client_index, &mut app.client_scroll, len, page);
        }
        Screen::Payments => {
            let len = app.payments.len();
            scroll_down(&mut app.payment_index, &mut app.payment_scroll, len, page);
        }
        Screen::Dashboard => {}
    }
}

fn handle_move_up(app: &mut App) {
    match app.screen {
        Screen::Clients => scroll_up(&mut app.client_index, &mut app.client_scroll),
        Screen::Payments => scroll_up(&mut app.payment_index, &mut app.payment_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_top(app: &mut App) {
    match app.screen {
        Screen::Clients => scroll_to_top(&mut app.client_index, &mut app.client_scroll),
        Screen::Payments => scroll_to_top(&mut app.payment_index, &mut app.payment_scroll),
        Screen::Dashboard => {}
    }
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows.max(1);
    match app.screen {
        Screen::Clients => {
            let len = app.visible_clients().len();
            scroll_to_bottom(&mut app.client_index, &mut app.client_scroll, len, page);
        }
        Screen::Payments => {
            let len = app.payments.len();
            scroll_to_bottom(&mut app.payment_index, &mut app.payment_scroll, len, page);
        }
        Screen::Dashboard => {}
    }
}

fn handle_escape(app: &mut App, db: &mut Database) -> Result<()> {
    match app.screen {
        Screen::Payments => {
            app.screen = Screen::Clients;
        }
        _ if !app.search_input.is_empty() => {
            app.search_input.clear();
            app.refresh_all(db)?;
        }
        _ => {
            app.status_message.clear();
        }
    }
    Ok(())
}
