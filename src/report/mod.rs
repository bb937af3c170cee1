//! Portfolio summaries, reminder drafts and spreadsheet export built from
//! client standings.

mod export;
mod reminder;
mod summary;

pub(crate) use export::{export_to_path, write_clients, ExportKind};
pub(crate) use reminder::{draft_reminder, late_reminder_targets, whatsapp_link};
pub(crate) use summary::{render_summary_report, PortfolioSummary};
