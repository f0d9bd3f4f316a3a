//! Expense record operations

use rusqlite::{params, OptionalExtension};
use serde::Serialize;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{ExpenseRecord, NewExpenseRecord};

/// Outcome of inserting one imported record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordInsertResult {
    Inserted(i64),
    /// Already stored for this user; carries the existing id
    Duplicate(i64),
}

/// Counts from a CSV import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

impl Database {
    /// Add a manually entered record (never deduplicated)
    pub fn add_expense_record(&self, user_id: i64, record: &NewExpenseRecord) -> Result<i64> {
        let conn = self.conn()?;

        conn.execute(
            r#"
            INSERT INTO expense_records (user_id, date, description, amount, category)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                record.date.to_string(),
                record.description,
                record.amount,
                record.category,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Insert an imported record unless the user already has one with the same hash
    pub fn insert_imported_record(
        &self,
        user_id: i64,
        record: &NewExpenseRecord,
    ) -> Result<RecordInsertResult> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM expense_records WHERE user_id = ? AND import_hash = ?",
                params![user_id, record.import_hash],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(existing_id) = existing {
            return Ok(RecordInsertResult::Duplicate(existing_id));
        }

        conn.execute(
            r#"
            INSERT INTO expense_records (user_id, date, description, amount, category, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                user_id,
                record.date.to_string(),
                record.description,
                record.amount,
                record.category,
                record.import_hash,
            ],
        )?;

        Ok(RecordInsertResult::Inserted(conn.last_insert_rowid()))
    }

    /// Import a batch, skipping records already stored for this user
    pub fn import_expense_records(
        &self,
        user_id: i64,
        records: &[NewExpenseRecord],
    ) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        for record in records {
            match self.insert_imported_record(user_id, record)? {
                RecordInsertResult::Inserted(_) => summary.imported += 1,
                RecordInsertResult::Duplicate(_) => summary.skipped += 1,
            }
        }
        Ok(summary)
    }

    /// The user's records, newest first
    pub fn list_expense_records(
        &self,
        user_id: i64,
        limit: Option<i64>,
    ) -> Result<Vec<ExpenseRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, date, description, amount, category, created_at
            FROM expense_records
            WHERE user_id = ?
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )?;

        // SQLite treats a negative LIMIT as no limit
        let records = stmt
            .query_map(params![user_id, limit.unwrap_or(-1)], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// One of the user's records by id
    pub fn get_expense_record(&self, user_id: i64, id: i64) -> Result<Option<ExpenseRecord>> {
        let conn = self.conn()?;

        Ok(conn
            .query_row(
                r#"
                SELECT id, date, description, amount, category, created_at
                FROM expense_records
                WHERE user_id = ? AND id = ?
                "#,
                params![user_id, id],
                row_to_record,
            )
            .optional()?)
    }

    /// Number of records stored for the user
    pub fn count_expense_records(&self, user_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM expense_records WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?)
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExpenseRecord> {
    let date_str: String = row.get(1)?;
    let created_at: String = row.get(5)?;
    Ok(ExpenseRecord {
        id: row.get(0)?,
        date: chrono::NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").unwrap_or_default(),
        description: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        created_at: parse_datetime(&created_at),
    })
}
