use std::collections::HashMap;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use super::util::format_money;
use crate::db::Database;
use crate::import::{parse_date, parse_decimal, CsvImporter};
use crate::models::{Client, Installment};
use crate::report::{self, ExportKind};
use crate::schedule::Tier;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
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

    register_command!("q", "Quit InstallTUI", cmd_quit, r);
    register_command!("quit", "Quit InstallTUI", cmd_quit, r);
    register_command!("d", "Go to Dashboard", cmd_dashboard, r);
    register_command!("dashboard", "Go to Dashboard", cmd_dashboard, r);
    register_command!("c", "Go to Clients", cmd_clients, r);
    register_command!("clients", "Go to Clients", cmd_clients, r);
    register_command!("p", "Show payments of the selected client", cmd_payments, r);
    register_command!("payments", "Show payments of the selected client", cmd_payments, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!(
        "add-client",
        "Add client (e.g. :add-client Hany Samy, 01012345678, 12000, 12, 2024-01-01)",
        cmd_add_client,
        r
    );
    register_command!(
        "a",
        "Add client (e.g. :a Hany Samy, 01012345678, 12000, 12)",
        cmd_add_client,
        r
    );
    register_command!(
        "edit",
        "Edit selected client (e.g. :edit total 15000; fields: name phone total months start)",
        cmd_edit,
        r
    );
    register_command!(
        "pay",
        "Record payment for selected client (e.g. :pay 1000 2024-02-01)",
        cmd_pay,
        r
    );
    register_command!(
        "delete-client",
        "Delete selected client and their payments",
        cmd_delete_client,
        r
    );
    register_command!(
        "delete-payment",
        "Delete selected payment",
        cmd_delete_payment,
        r
    );
    register_command!(
        "import",
        "Import clients from CSV (e.g. :import ~/clients.csv)",
        cmd_import,
        r
    );
    register_command!(
        "i",
        "Import clients from CSV (e.g. :i ~/clients.csv)",
        cmd_import,
        r
    );
    register_command!(
        "export",
        "Export clients to CSV (e.g. :export ~/clients.csv --detailed)",
        cmd_export,
        r
    );
    register_command!("report", "Show portfolio report", cmd_report, r);
    register_command!("remind", "Draft reminder for selected client", cmd_remind, r);
    register_command!(
        "remind-late",
        "Draft reminders for every late client",
        cmd_remind_late,
        r
    );
    register_command!(
        "filter",
        "Filter clients by status (e.g. :filter late, :filter all)",
        cmd_filter,
        r
    );
    register_command!("f", "Filter clients by status", cmd_filter, r);
    register_command!(
        "search",
        "Search clients by name or phone (e.g. :search hany)",
        cmd_search,
        r
    );
    register_command!("s", "Search clients (e.g. :s 0101)", cmd_search, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
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

fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

// ── Navigation ───────────────────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_dashboard(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Dashboard;
    app.refresh_all(db)
}

fn cmd_clients(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.screen = Screen::Clients;
    app.refresh_all(db)
}

fn cmd_payments(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.open_payments(db)
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

// ── Clients ──────────────────────────────────────────────────

fn cmd_add_client(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let fields: Vec<&str> = args.split(',').map(str::trim).collect();
    if fields.len() < 4 {
        app.set_status("Usage: :add-client <name>, <phone>, <total>, <months>[, <start date>]");
        return Ok(());
    }

    let total = match parse_decimal(fields[2]) {
        Ok(t) => t,
        Err(e) => {
            app.set_status(format!("Invalid total: {e}"));
            return Ok(());
        }
    };
    let Ok(months) = fields[3].parse::<u32>() else {
        app.set_status(format!("Invalid month count: {}", fields[3]));
        return Ok(());
    };
    let start_date = match fields.get(4).filter(|s| !s.is_empty()) {
        Some(raw) => match parse_date(raw) {
            Ok(d) => d.format("%Y-%m-%d").to_string(),
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        },
        None => today(),
    };

    let client = Client::new(
        fields[0].to_string(),
        fields[1].to_string(),
        total,
        months,
        start_date,
    );
    if let Err(e) = client.validate() {
        app.set_status(format!("Invalid client: {e}"));
        return Ok(());
    }

    let id = db.insert_client(&client)?;
    app.screen = Screen::Clients;
    app.refresh_all(db)?;
    app.select_client(id);
    app.set_status(format!(
        "Added {}: {} x {} months, ends {}",
        client.name,
        format_money(client.monthly_installment(), &app.currency),
        client.months,
        client.end_date()
    ));
    Ok(())
}

fn cmd_edit(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(mut client) = app.focused_client().map(|s| s.client.clone()) else {
        app.set_status("Select a client first");
        return Ok(());
    };
    let mut parts = args.splitn(2, ' ');
    let field = parts.next().unwrap_or("").to_lowercase();
    let value = parts.next().unwrap_or("").trim();
    if field.is_empty() || value.is_empty() {
        app.set_status("Usage: :edit <name|phone|total|months|start> <value>");
        return Ok(());
    }

    let applied: Result<(), String> = match field.as_str() {
        "name" => {
            client.name = value.to_string();
            Ok(())
        }
        "phone" => {
            client.phone = value.to_string();
            Ok(())
        }
        "total" => parse_decimal(value)
            .map(|t| client.total = t)
            .map_err(|e| e.to_string()),
        "months" => value
            .parse::<u32>()
            .map(|m| client.months = m)
            .map_err(|_| format!("Invalid month count: {value}")),
        "start" | "start-date" | "startdate" => parse_date(value)
            .map(|d| client.start_date = d.format("%Y-%m-%d").to_string())
            .map_err(|e| e.to_string()),
        other => Err(format!("Unknown field '{other}'")),
    };
    if let Err(msg) = applied {
        app.set_status(msg);
        return Ok(());
    }
    if let Err(e) = client.validate() {
        app.set_status(format!("Invalid client: {e}"));
        return Ok(());
    }

    if db.update_client(&client)? {
        app.refresh_all(db)?;
        app.set_status(format!("Updated {}", client.name));
    } else {
        app.refresh_all(db)?;
        app.set_status("Client no longer exists");
    }
    Ok(())
}

fn cmd_delete_client(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let Some(target) = app.focused_client() else {
        app.set_status("Select a client first");
        return Ok(());
    };
    if let Some(id) = target.client.id {
        let name = target.client.name.clone();
        app.confirm_message = format!("Delete {name} and all of their payments?");
        app.pending_action = Some(PendingAction::DeleteClient { id, name });
        app.input_mode = InputMode::Confirm;
    }
    Ok(())
}

fn cmd_filter(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() || args.eq_ignore_ascii_case("all") {
        app.set_tier_filter(None);
        app.set_status("Showing all clients");
        return Ok(());
    }
    match Tier::parse(args) {
        Some(tier) => {
            app.set_tier_filter(Some(tier));
            app.screen = Screen::Clients;
            app.set_status(format!("Showing {} clients", tier.label(app.locale)));
        }
        None => app.set_status("Usage: :filter <paid|current|late|all>"),
    }
    Ok(())
}

fn cmd_search(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.search_input = args.to_string();
    app.client_index = 0;
    app.client_scroll = 0;
    app.screen = Screen::Clients;
    app.refresh_all(db)?;
    if args.is_empty() {
        app.set_status("Search cleared");
    } else {
        app.set_status(format!("{} match(es) for '{args}'", app.standings.len()));
    }
    Ok(())
}

// ── Payments ─────────────────────────────────────────────────

fn cmd_pay(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    record_payment(args, app, db)
}

/// Parse `<amount> [date]` and record it against the focused client.
pub(crate) fn record_payment(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let Some(target) = app.focused_client() else {
        app.set_status("Select a client first");
        return Ok(());
    };
    let (Some(client_id), name) = (target.client.id, target.client.name.clone()) else {
        return Ok(());
    };

    let mut parts = args.split_whitespace();
    let Some(amount_str) = parts.next() else {
        app.set_status("Usage: :pay <amount> [YYYY-MM-DD]");
        return Ok(());
    };
    let amount = match parse_decimal(amount_str) {
        Ok(a) => a,
        Err(e) => {
            app.set_status(format!("Invalid amount: {e}"));
            return Ok(());
        }
    };
    let date = match parts.next() {
        Some(raw) => match parse_date(raw) {
            Ok(d) => d.format("%Y-%m-%d").to_string(),
            Err(e) => {
                app.set_status(e.to_string());
                return Ok(());
            }
        },
        None => today(),
    };

    let payment = Installment::new(client_id, amount, date);
    if let Err(e) = payment.validate() {
        app.set_status(format!("Invalid payment: {e}"));
        return Ok(());
    }
    db.insert_installment(&payment)?;
    app.refresh_all(db)?;

    let standing = app
        .portfolio
        .iter()
        .find(|s| s.client.id == Some(client_id));
    let msg = match standing {
        Some(s) => format!(
            "Recorded {} for {name}. Remaining {} ({})",
            format_money(amount, &app.currency),
            format_money(s.remaining, &app.currency),
            s.tier.label(app.locale)
        ),
        None => format!("Recorded {} for {name}", format_money(amount, &app.currency)),
    };
    app.set_status(msg);
    Ok(())
}

fn cmd_delete_payment(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if app.screen != Screen::Payments || app.payments.is_empty() {
        app.set_status("Open a client's payments and select one first");
        return Ok(());
    }
    if let Some(payment) = app.payments.get(app.payment_index) {
        if let Some(id) = payment.id {
            let description = format!(
                "{} on {}",
                format_money(payment.amount, &app.currency),
                payment.date
            );
            app.confirm_message = format!("Delete payment of {description}?");
            app.pending_action = Some(PendingAction::DeletePayment { id, description });
            app.input_mode = InputMode::Confirm;
        }
    }
    Ok(())
}

// ── Import / export ──────────────────────────────────────────

fn cmd_import(args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <file.csv>");
        return Ok(());
    }
    let path = crate::run::shellexpand(args);
    let outcome = match CsvImporter::read_path(std::path::Path::new(&path)) {
        Ok(o) => o,
        Err(e) => {
            app.set_status(format!("Import failed: {e}"));
            return Ok(());
        }
    };

    if !outcome.is_clean() {
        let mut body = outcome.errors.join("\n");
        body.push_str("\n\nNothing was imported. Fix the rows above and try again.");
        app.show_popup(format!("Import errors ({})", outcome.errors.len()), &body);
        app.set_status(format!("{} row(s) failed validation", outcome.errors.len()));
        return Ok(());
    }

    app.confirm_message = format!("Import {} clients from {path}?", outcome.clients.len());
    app.import_preview = outcome.clients;
    app.pending_action = Some(PendingAction::ImportCommit);
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let kind = if args.split_whitespace().any(|a| a == "--detailed") {
        ExportKind::Detailed
    } else {
        ExportKind::Basic
    };
    let path = args
        .split_whitespace()
        .find(|a| !a.starts_with('-'))
        .map(crate::run::shellexpand)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/installtui-clients.csv")
        });

    app.refresh_all(db)?;
    if app.portfolio.is_empty() {
        app.set_status("No clients to export");
        return Ok(());
    }
    let count = report::export_to_path(std::path::Path::new(&path), &app.portfolio, kind)?;
    app.set_status(format!("Exported {count} clients to {path}"));
    Ok(())
}

// ── Reports and reminders ────────────────────────────────────

fn cmd_report(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.refresh_all(db)?;
    let text = report::render_summary_report(&app.summary, &app.portfolio, &app.currency, app.locale);
    app.show_popup("Portfolio Report", &text);
    Ok(())
}

fn cmd_remind(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    let Some(target) = app.focused_client() else {
        app.set_status("Select a client first");
        return Ok(());
    };
    if target.tier == Tier::Paid {
        let name = target.client.name.clone();
        app.set_status(format!("{name} has paid in full"));
        return Ok(());
    }
    let message = report::draft_reminder(target, &app.currency, app.locale);
    let link = report::whatsapp_link(&target.client.phone, &message);
    let title = format!("Reminder for {}", target.client.name);
    app.show_popup(title, &format!("{message}\n\n{link}"));
    Ok(())
}

fn cmd_remind_late(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.refresh_all(db)?;
    let targets = report::late_reminder_targets(&app.portfolio);
    if targets.is_empty() {
        app.set_status("No late clients with a balance");
        return Ok(());
    }

    let mut lines = Vec::new();
    for (i, s) in targets.iter().enumerate() {
        let message = report::draft_reminder(s, &app.currency, app.locale);
        lines.push(format!(
            "{}. {} ({}): {} overdue",
            i + 1,
            s.client.name,
            s.client.phone,
            format_money(s.arrears(), &app.currency)
        ));
        lines.push(format!("   {}", report::whatsapp_link(&s.client.phone, &message)));
    }
    let title = format!("Late reminders ({})", targets.len());
    app.show_popup(title, &lines.join("\n"));
    Ok(())
}
