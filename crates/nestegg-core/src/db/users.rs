//! Caller identity registry

use rusqlite::{params, OptionalExtension};

use super::Database;
use crate::error::{Error, Result};

impl Database {
    /// Register `email` on first use and return its user id
    pub fn ensure_user(&self, email: &str) -> Result<i64> {
        let email = email.trim();
        if email.is_empty() {
            return Err(Error::InvalidParameters("User identity cannot be empty".into()));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO users (email) VALUES (?)",
            params![email],
        )?;

        let id = conn.query_row(
            "SELECT id FROM users WHERE email = ?",
            params![email],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    /// Look up a user id without registering
    pub fn find_user(&self, email: &str) -> Result<Option<i64>> {
        let conn = self.conn()?;
        Ok(conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email.trim()],
                |row| row.get(0),
            )
            .optional()?)
    }
}
