mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, types::Type, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

const CLIENT_COLUMNS: &str = "id, name, phone, total, months, start_date, created_at";
const INSTALLMENT_COLUMNS: &str = "id, client_id, amount, date, created_at";

/// Read a decimal stored as TEXT. Unparseable text is a conversion error, not zero.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(raw.trim())
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        phone: row.get(2)?,
        total: decimal_column(row, 3)?,
        months: row.get(4)?,
        start_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn installment_from_row(row: &Row<'_>) -> rusqlite::Result<Installment> {
    Ok(Installment {
        id: Some(row.get(0)?),
        client_id: row.get(1)?,
        amount: decimal_column(row, 2)?,
        date: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Clients ───────────────────────────────────────────────

    pub(crate) fn insert_client(&self, client: &Client) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO clients (name, phone, total, months, start_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                client.name,
                client.phone,
                client.total.to_string(),
                client.months,
                client.start_date,
                client.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, name = %client.name, "client added");
        Ok(id)
    }

    /// Insert all clients in one transaction; nothing is written if any insert fails.
    pub(crate) fn insert_clients_batch(&mut self, clients: &[Client]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for client in clients {
            tx.execute(
                "INSERT INTO clients (name, phone, total, months, start_date, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    client.name,
                    client.phone,
                    client.total.to_string(),
                    client.months,
                    client.start_date,
                    client.created_at,
                ],
            )
            .with_context(|| format!("Failed to insert client '{}'", client.name))?;
        }
        tx.commit()?;
        tracing::info!(count = clients.len(), "clients imported");
        Ok(clients.len())
    }

    /// All clients sorted by name, optionally filtered by a name/phone substring.
    pub(crate) fn get_clients(&self, search: Option<&str>) -> Result<Vec<Client>> {
        let mut sql = format!("SELECT {CLIENT_COLUMNS} FROM clients");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

        if let Some(s) = search.map(str::trim).filter(|s| !s.is_empty()) {
            sql.push_str(" WHERE name LIKE ?1 OR phone LIKE ?1");
            param_values.push(Box::new(format!("%{s}%")));
        }
        sql.push_str(" ORDER BY name COLLATE NOCASE, id");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), client_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_client_by_id(&self, id: i64) -> Result<Option<Client>> {
        let result = self.conn.query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
            params![id],
            client_from_row,
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_client_count(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))?)
    }

    /// Overwrite the editable fields of an existing client. Returns false if it no longer exists.
    pub(crate) fn update_client(&self, client: &Client) -> Result<bool> {
        let id = client
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update a client without an ID"))?;
        let changed = self.conn.execute(
            "UPDATE clients SET name = ?1, phone = ?2, total = ?3, months = ?4, start_date = ?5
             WHERE id = ?6",
            params![
                client.name,
                client.phone,
                client.total.to_string(),
                client.months,
                client.start_date,
                id,
            ],
        )?;
        tracing::info!(id, "client updated");
        Ok(changed > 0)
    }

    /// Delete a client; its installments go with it.
    pub(crate) fn delete_client(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM clients WHERE id = ?1", params![id])?;
        tracing::info!(id, removed, "client deleted");
        Ok(removed > 0)
    }

    // ── Installments ──────────────────────────────────────────

    pub(crate) fn insert_installment(&self, inst: &Installment) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO installments (client_id, amount, date, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    inst.client_id,
                    inst.amount.to_string(),
                    inst.date,
                    inst.created_at,
                ],
            )
            .with_context(|| format!("Failed to record payment for client {}", inst.client_id))?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, client_id = inst.client_id, amount = %inst.amount, "payment recorded");
        Ok(id)
    }

    /// Every installment, oldest first.
    pub(crate) fn get_installments(&self) -> Result<Vec<Installment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INSTALLMENT_COLUMNS} FROM installments ORDER BY date, id"
        ))?;
        let rows = stmt.query_map([], installment_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// One client's payment history, newest first.
    pub(crate) fn get_installments_for_client(&self, client_id: i64) -> Result<Vec<Installment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INSTALLMENT_COLUMNS} FROM installments
             WHERE client_id = ?1
             ORDER BY date DESC, id DESC"
        ))?;
        let rows = stmt.query_map(params![client_id], installment_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn delete_installment(&self, id: i64) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM installments WHERE id = ?1", params![id])?;
        tracing::info!(id, "payment deleted");
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests;
