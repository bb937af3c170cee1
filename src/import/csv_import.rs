use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::models::Client;
use crate::schedule;

/// Columns every client sheet must carry, in export order.
pub(crate) const REQUIRED_HEADERS: [&str; 5] = ["name", "phone", "total", "months", "startDate"];

/// Result of reading a client sheet. Rows are only usable when `errors` is empty.
#[derive(Debug, Default)]
pub(crate) struct ClientImport {
    pub(crate) clients: Vec<Client>,
    pub(crate) errors: Vec<String>,
}

impl ClientImport {
    pub(crate) fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

pub(crate) struct CsvImporter;

impl CsvImporter {
    pub(crate) fn read_path(path: &Path) -> Result<ClientImport> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;
        let outcome = Self::read(file)?;
        tracing::info!(
            path = %path.display(),
            rows = outcome.clients.len(),
            errors = outcome.errors.len(),
            "parsed client sheet"
        );
        Ok(outcome)
    }

    /// Parse a client sheet. Missing columns fail the whole read; bad rows are
    /// collected as `Row N: ...` messages where N is the spreadsheet line.
    pub(crate) fn read<R: Read>(reader: R) -> Result<ClientImport> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .context("Failed to read CSV header")?
            .iter()
            .map(normalize_header)
            .collect();

        let mut columns = [0usize; REQUIRED_HEADERS.len()];
        let mut missing = Vec::new();
        for (slot, required) in columns.iter_mut().zip(REQUIRED_HEADERS) {
            match headers.iter().position(|h| header_matches(h, required)) {
                Some(idx) => *slot = idx,
                None => missing.push(required),
            }
        }
        if !missing.is_empty() {
            anyhow::bail!("Missing required columns: {}", missing.join(", "));
        }
        let [name_col, phone_col, total_col, months_col, start_col] = columns;

        let mut outcome = ClientImport::default();
        for (i, result) in rdr.records().enumerate() {
            let line = i + 2;
            let record = result.with_context(|| format!("Failed to read CSV row {line}"))?;
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let field = |col: usize| record.get(col).map(str::trim).unwrap_or("");

            match parse_client(
                field(name_col),
                field(phone_col),
                field(total_col),
                field(months_col),
                field(start_col),
            ) {
                Ok(client) => outcome.clients.push(client),
                Err(e) => outcome.errors.push(format!("Row {line}: {e}")),
            }
        }

        if outcome.clients.is_empty() && outcome.errors.is_empty() {
            anyhow::bail!("CSV file has no client rows");
        }
        Ok(outcome)
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_string()
}

fn header_matches(header: &str, required: &str) -> bool {
    let squash = |s: &str| s.replace(['_', ' '], "").to_lowercase();
    squash(header) == squash(required)
}

fn parse_client(name: &str, phone: &str, total: &str, months: &str, start: &str) -> Result<Client> {
    if name.is_empty() || phone.is_empty() || total.is_empty() || months.is_empty() || start.is_empty()
    {
        anyhow::bail!("missing or empty fields");
    }
    let total = parse_decimal(total)?;
    let months = parse_months(months)?;
    let start_date = parse_date(start)?;

    let client = Client::new(
        name.to_string(),
        phone.to_string(),
        total,
        months,
        start_date.format("%Y-%m-%d").to_string(),
    );
    client.validate()?;
    Ok(client)
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    schedule::parse_plan_date(s)
        .ok_or_else(|| anyhow::anyhow!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal> {
    let cleaned = s
        .replace(['$', ',', '"'], "")
        .replace("EGP", "")
        .replace('(', "-")
        .replace(')', "")
        .trim()
        .to_string();
    if cleaned.is_empty() {
        anyhow::bail!("missing amount");
    }
    Decimal::from_str(&cleaned).with_context(|| format!("invalid amount '{s}'"))
}

pub(crate) fn parse_months(s: &str) -> Result<u32> {
    if let Ok(n) = s.trim().parse::<u32>() {
        return Ok(n);
    }
    let value = Decimal::from_str(s.trim()).with_context(|| format!("invalid month count '{s}'"))?;
    if value.fract() != Decimal::ZERO || value < Decimal::ZERO {
        anyhow::bail!("month count must be a whole number, got '{s}'");
    }
    value
        .to_u32()
        .ok_or_else(|| anyhow::anyhow!("month count out of range: '{s}'"))
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
