use anyhow::{Context, Result};
use chrono::Local;
use std::path::Path;

use crate::config::Config;
use crate::db::Database;
use crate::import::{parse_date, parse_decimal, ClientImport, CsvImporter};
use crate::models::{Client, Installment};
use crate::report::{self, ExportKind, PortfolioSummary};
use crate::schedule::{self, build_standings, ClientStanding, Tier};
use crate::ui::util::{format_amount, format_money, truncate};

pub(crate) fn as_cli(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    tracing::debug!(command = %args[1], "cli invocation");
    match args[1].as_str() {
        "clients" | "ls" => cli_clients(&args[2..], config, db),
        "add-client" | "add" => cli_add_client(&args[2..], config, db),
        "pay" => cli_pay(&args[2..], config, db),
        "history" => cli_history(&args[2..], config, db),
        "delete-client" => cli_delete_client(&args[2..], db),
        "import" => cli_import(&args[2..], db),
        "export" => cli_export(&args[2..], db),
        "report" => cli_report(config, db),
        "remind" => cli_remind(&args[2..], config, db),
        "end-date" => cli_end_date(&args[2..]),
        "status" => cli_status(&args[2..], config, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("installtui {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("InstallTUI - local-only installment plan tracker");
    println!();
    println!("Usage: installtui [command]");
    println!();
    println!("Commands:");
    println!("  (none)                                 Launch interactive TUI");
    println!("  clients [--status <paid|current|late>] List clients with their status");
    println!("  add-client <name> <phone> <total> <months> [start]");
    println!("                                         Add a client (start defaults to today)");
    println!("  pay <client-id> <amount> [date]        Record a payment");
    println!("  history <client-id>                    Show a client's payments");
    println!("  delete-client <client-id>              Delete a client and their payments");
    println!("  import <file.csv>                      Import clients (all rows or none)");
    println!("  export [path|-] [--detailed]           Export clients to CSV");
    println!("  report                                 Print the portfolio report");
    println!("  remind <client-id> | --late            Draft WhatsApp reminders");
    println!("  end-date <start> <months>              Project a plan's end date");
    println!("  status <client-id>                     Show one client's standing");
    println!("  --help, -h                             Show this help");
    println!("  --version, -V                          Show version");
    println!();
    println!("Environment:");
    println!("  INSTALLTUI_DB        Database path");
    println!("  INSTALLTUI_CURRENCY  Currency shown next to amounts (default EGP)");
    println!("  INSTALLTUI_LANG      en or ar");
    println!("  INSTALLTUI_LOG       Log level (error, warn, info, debug, trace)");
}

fn now() -> chrono::NaiveDateTime {
    Local::now().naive_local()
}

fn all_standings(db: &Database) -> Result<Vec<ClientStanding>> {
    Ok(build_standings(&db.get_clients(None)?, &db.get_installments()?, now()))
}

fn parse_id(args: &[String], usage: &str) -> Result<i64> {
    let raw = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?;
    raw.parse::<i64>()
        .with_context(|| format!("Invalid client ID: {raw}"))
}

fn standing_for(db: &Database, id: i64) -> Result<ClientStanding> {
    let client = db
        .get_client_by_id(id)?
        .ok_or_else(|| anyhow::anyhow!("Client {id} not found"))?;
    let paid = schedule::total_paid(&db.get_installments_for_client(id)?);
    Ok(ClientStanding::new(client, paid, now()))
}

fn cli_clients(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    let tier = match args.windows(2).find(|w| w[0] == "--status") {
        Some(w) => Some(
            Tier::parse(&w[1])
                .ok_or_else(|| anyhow::anyhow!("Unknown status '{}' (paid, current, late)", w[1]))?,
        ),
        None => None,
    };

    let standings = all_standings(db)?;
    let shown: Vec<&ClientStanding> = standings
        .iter()
        .filter(|s| tier.map_or(true, |t| s.tier == t))
        .collect();
    if shown.is_empty() {
        println!("No clients");
        return Ok(());
    }

    println!(
        "{:<5} {:<24} {:<14} {:>14} {:>14} {:<11} {}",
        "ID", "Name", "Phone", "Total", "Remaining", "End", "Status"
    );
    println!("{}", "─".repeat(96));
    for s in &shown {
        println!(
            "{:<5} {:<24} {:<14} {:>14} {:>14} {:<11} {}",
            s.client.id.unwrap_or(0),
            truncate(&s.client.name, 24),
            s.client.phone,
            format_amount(s.client.total),
            format_amount(s.remaining),
            s.end_date,
            s.tier.label(config.locale),
        );
    }
    println!();
    println!(
        "{} of {} client(s), amounts in {}",
        shown.len(),
        db.get_client_count()?,
        config.currency
    );
    Ok(())
}

fn cli_add_client(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    if args.len() < 4 {
        anyhow::bail!("Usage: installtui add-client <name> <phone> <total> <months> [start]");
    }
    let total = parse_decimal(&args[2])?;
    let months: u32 = args[3]
        .parse()
        .with_context(|| format!("Invalid month count: {}", args[3]))?;
    let start_date = match args.get(4) {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };

    let client = Client::new(
        args[0].clone(),
        args[1].clone(),
        total,
        months,
        start_date.format("%Y-%m-%d").to_string(),
    );
    client.validate()?;
    let id = db.insert_client(&client)?;
    println!(
        "Added client {id}: {} ({} x {} months, ends {})",
        client.name,
        format_money(client.monthly_installment(), &config.currency),
        client.months,
        client.end_date()
    );
    Ok(())
}

fn cli_pay(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    let usage = "installtui pay <client-id> <amount> [date]";
    let id = parse_id(args, usage)?;
    let amount = parse_decimal(
        args.get(1)
            .ok_or_else(|| anyhow::anyhow!("Usage: {usage}"))?,
    )?;
    let date = match args.get(2) {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };

    if db.get_client_by_id(id)?.is_none() {
        anyhow::bail!("Client {id} not found");
    }
    let payment = Installment::new(id, amount, date.format("%Y-%m-%d").to_string());
    payment.validate()?;
    db.insert_installment(&payment)?;

    let s = standing_for(db, id)?;
    println!(
        "Recorded {} for {}. Remaining {} ({})",
        format_money(amount, &config.currency),
        s.client.name,
        format_money(s.remaining, &config.currency),
        s.tier.label(config.locale)
    );
    Ok(())
}

fn cli_history(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    let id = parse_id(args, "installtui history <client-id>")?;
    let s = standing_for(db, id)?;
    let payments = db.get_installments_for_client(id)?;

    println!("{} ({})", s.client.name, s.client.phone);
    println!("{}", "─".repeat(40));
    if payments.is_empty() {
        println!("  No payments");
    }
    for p in &payments {
        println!("  {:<4} {}  {:>16}", p.id.unwrap_or(0), p.date, format_amount(p.amount));
    }
    println!("{}", "─".repeat(40));
    println!("  Paid:      {}", format_money(s.paid, &config.currency));
    println!("  Remaining: {}", format_money(s.remaining, &config.currency));
    Ok(())
}

fn cli_delete_client(args: &[String], db: &mut Database) -> Result<()> {
    let id = parse_id(args, "installtui delete-client <client-id>")?;
    if db.delete_client(id)? {
        println!("Deleted client {id} and their payments");
        Ok(())
    } else {
        anyhow::bail!("Client {id} not found")
    }
}

fn print_import_errors(outcome: &ClientImport) {
    eprintln!("{} row(s) failed validation:", outcome.errors.len());
    for e in &outcome.errors {
        eprintln!("  {e}");
    }
    eprintln!("Nothing was imported.");
}

fn cli_import(args: &[String], db: &mut Database) -> Result<()> {
    let file_path = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("Usage: installtui import <file.csv>"))?;
    let path = Path::new(file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let outcome = CsvImporter::read_path(path)?;
    if !outcome.is_clean() {
        print_import_errors(&outcome);
        anyhow::bail!("Import aborted");
    }
    let count = db.insert_clients_batch(&outcome.clients)?;
    println!("Imported {count} clients");
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    let kind = if args.iter().any(|a| a == "--detailed") {
        ExportKind::Detailed
    } else {
        ExportKind::Basic
    };
    let target = args
        .iter()
        .find(|a| *a == "-" || !a.starts_with('-'))
        .map(|a| shellexpand(a));

    let standings = all_standings(db)?;
    match target.as_deref() {
        Some("-") => {
            report::write_clients(std::io::stdout().lock(), &standings, kind)?;
        }
        _ => {
            let output_path = target.unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
                format!("{home}/installtui-clients.csv")
            });
            let count = report::export_to_path(Path::new(&output_path), &standings, kind)?;
            println!("Exported {count} clients to {output_path}");
        }
    }
    Ok(())
}

fn cli_report(config: &Config, db: &mut Database) -> Result<()> {
    let standings = all_standings(db)?;
    let summary = PortfolioSummary::from_standings(&standings);
    println!(
        "{}",
        report::render_summary_report(&summary, &standings, &config.currency, config.locale)
    );
    Ok(())
}

fn cli_remind(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    if args.first().is_some_and(|a| a == "--late") {
        let standings = all_standings(db)?;
        let targets = report::late_reminder_targets(&standings);
        if targets.is_empty() {
            println!("No late clients with a balance");
        }
        for s in targets {
            let message = report::draft_reminder(s, &config.currency, config.locale);
            println!("{} ({})", s.client.name, s.client.phone);
            println!("  {}", report::whatsapp_link(&s.client.phone, &message));
        }
        return Ok(());
    }

    let id = parse_id(args, "installtui remind <client-id> | --late")?;
    let s = standing_for(db, id)?;
    if s.tier == Tier::Paid {
        println!("{} has paid in full", s.client.name);
        return Ok(());
    }
    let message = report::draft_reminder(&s, &config.currency, config.locale);
    println!("{message}");
    println!();
    println!("{}", report::whatsapp_link(&s.client.phone, &message));
    Ok(())
}

fn cli_end_date(args: &[String]) -> Result<()> {
    let [start, months, ..] = args else {
        anyhow::bail!("Usage: installtui end-date <start> <months>");
    };
    let months: f64 = months
        .parse()
        .with_context(|| format!("Invalid month count: {months}"))?;
    println!("{}", schedule::project_end_date(start, months));
    Ok(())
}

fn cli_status(args: &[String], config: &Config, db: &mut Database) -> Result<()> {
    let id = parse_id(args, "installtui status <client-id>")?;
    let s = standing_for(db, id)?;
    let money = |v| format_money(v, &config.currency);

    println!("{} ({})", s.client.name, s.client.phone);
    println!("{}", "─".repeat(40));
    println!(
        "  Plan:       {} over {} months ({} / month)",
        money(s.client.total),
        s.client.months,
        money(s.client.monthly_installment())
    );
    println!("  Start:      {}", s.client.start_date);
    println!("  End:        {}", s.end_date);
    println!("  Paid:       {}", money(s.paid));
    println!("  Remaining:  {}", money(s.remaining));
    if let Some(expected) = s.expected {
        println!("  Due so far: {}", money(expected));
        println!("  Overdue:    {}", money(s.arrears()));
    }
    println!("  Status:     {} [{}]", s.tier.label(config.locale), s.tier.color().hsl());
    if let Some(end) = s.end_date.date() {
        if end < Local::now().date_naive() && s.remaining > rust_decimal::Decimal::ZERO {
            println!("  Plan ended on {end} with {} still open", money(s.remaining));
        }
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_shellexpand_home() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        assert_eq!(shellexpand("~/clients.csv"), format!("{home}/clients.csv"));
    }

    #[test]
    fn test_shellexpand_passthrough() {
        assert_eq!(shellexpand("/tmp/clients.csv"), "/tmp/clients.csv");
        assert_eq!(shellexpand("clients.csv"), "clients.csv");
    }

    #[test]
    fn test_parse_id() {
        let args = vec!["42".to_string()];
        assert_eq!(parse_id(&args, "usage").unwrap(), 42);
        assert!(parse_id(&[], "usage").is_err());
        assert!(parse_id(&["abc".to_string()], "usage").is_err());
    }
}
