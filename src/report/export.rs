use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::import::REQUIRED_HEADERS;
use crate::schedule::ClientStanding;

/// Extra columns appended by a detailed export.
pub(crate) const DETAILED_HEADERS: [&str; 4] = ["paid", "remaining", "endDate", "status"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportKind {
    /// The import columns only; the file can be imported again as-is.
    Basic,
    Detailed,
}

/// Write one row per client, BOM first so spreadsheet apps detect UTF-8.
pub(crate) fn write_clients<W: Write>(
    mut writer: W,
    standings: &[ClientStanding],
    kind: ExportKind,
) -> Result<usize> {
    writer.write_all(UTF8_BOM)?;
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = REQUIRED_HEADERS.to_vec();
    if kind == ExportKind::Detailed {
        header.extend(DETAILED_HEADERS);
    }
    wtr.write_record(&header)?;

    for s in standings {
        let c = &s.client;
        let mut record = vec![
            c.name.clone(),
            c.phone.clone(),
            c.total.to_string(),
            c.months.to_string(),
            c.start_date.clone(),
        ];
        if kind == ExportKind::Detailed {
            record.push(s.paid.to_string());
            record.push(s.remaining.to_string());
            record.push(s.end_date.to_string());
            record.push(s.tier.as_str().to_string());
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(standings.len())
}

pub(crate) fn export_to_path(path: &Path, standings: &[ClientStanding], kind: ExportKind) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let count = write_clients(file, standings, kind)?;
    tracing::info!(path = %path.display(), count, ?kind, "clients exported");
    Ok(count)
}
