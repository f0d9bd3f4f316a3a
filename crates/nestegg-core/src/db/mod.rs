//! SQLite storage behind an r2d2 pool, optionally encrypted with SQLCipher.
//!
//! Submodules:
//! - `users` - Caller identity registry
//! - `budgets` - One saved budget per user
//! - `records` - Expense records and CSV import deduplication
//! - `audit` - Audit log of API access

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod audit;
mod budgets;
mod records;
mod users;

pub use audit::AuditEntry;
pub use records::{ImportSummary, RecordInsertResult};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Passphrase the SQLCipher key is derived from
pub const DB_KEY_ENV: &str = "NESTEGG_DB_KEY";

/// Argon2 over the passphrase with a fixed salt, hex encoded.
///
/// A given passphrase opens every nestegg database it encrypted.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Changing this invalidates every existing encrypted database
    const APP_SALT: &[u8; 16] = b"nestegg-salt-v01";

    let encryption = |what: &str, e: &dyn std::fmt::Display| {
        Error::Encryption(format!("{}: {}", what, e))
    };
    let salt = SaltString::encode_b64(APP_SALT).map_err(|e| encryption("Bad key salt", &e))?;
    let output = Argon2::default()
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| encryption("Key derivation failed", &e))?
        .hash
        .ok_or_else(|| Error::Encryption("Key derivation produced no output".into()))?;

    Ok(hex::encode(output.as_bytes()))
}

/// `CURRENT_TIMESTAMP` text as UTC; unreadable values become now
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Cloneable handle on the connection pool
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    db_path: String,
    encrypted: bool,
}

impl Database {
    /// Open an encrypted database keyed by `NESTEGG_DB_KEY`.
    ///
    /// Fails when the variable is unset; `new_unencrypted()` is the explicit
    /// opt-out.
    pub fn new(path: &str) -> Result<Self> {
        let passphrase = std::env::var(DB_KEY_ENV).map_err(|_| {
            Error::Encryption(format!(
                "{} is not set. Export a passphrase to encrypt the database, \
                or pass --no-encrypt to store it in plain text.",
                DB_KEY_ENV
            ))
        })?;
        Self::new_with_key(path, Some(&passphrase))
    }

    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open `path`, keying every pooled connection when a passphrase is given
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let key_pragma = passphrase
            .map(|p| derive_key(p).map(|key| format!("PRAGMA key = 'x\"{}\"';", key)))
            .transpose()?;
        let encrypted = key_pragma.is_some();

        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            if let Some(pragma) = &key_pragma {
                conn.execute_batch(pragma)?;
            }
            conn.execute_batch("PRAGMA foreign_keys = ON;")
        });
        let pool = Pool::builder().max_size(10).build(manager)?;

        let db = Self {
            pool,
            db_path: path.to_string(),
            encrypted,
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a throwaway database (for testing)
    ///
    /// Uses a temporary file rather than `:memory:` because every pooled
    /// connection would otherwise see its own empty database.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "nestegg_test_{}_{}.db",
            std::process::id(),
            id
        ));

        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path.to_string_lossy())
    }

    /// Whether the pool was opened with a key and SQLCipher is active
    pub fn is_encrypted(&self) -> Result<bool> {
        if !self.encrypted {
            return Ok(false);
        }
        let cipher: Option<String> = self
            .conn()?
            .query_row("PRAGMA cipher_version;", [], |row| row.get(0))
            .ok();
        Ok(cipher.is_some())
    }

    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Create missing tables and indexes
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- WAL mode: readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;

            -- Users (one row per caller identity)
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Budgets (one row per user, overwritten on save)
            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL UNIQUE REFERENCES users(id) ON DELETE CASCADE,
                monthly_income REAL NOT NULL DEFAULT 0,
                housing REAL NOT NULL DEFAULT 0,
                savings REAL NOT NULL DEFAULT 0,
                retirement REAL NOT NULL DEFAULT 0,
                food REAL NOT NULL DEFAULT 0,
                transportation REAL NOT NULL DEFAULT 0,
                utilities REAL NOT NULL DEFAULT 0,
                insurance REAL NOT NULL DEFAULT 0,
                personal_entertainment REAL NOT NULL DEFAULT 0,
                debt REAL NOT NULL DEFAULT 0,
                household_items REAL NOT NULL DEFAULT 0,
                giving REAL NOT NULL DEFAULT 0,
                other REAL NOT NULL DEFAULT 0,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Expense records; import_hash is NULL for manually added records
            CREATE TABLE IF NOT EXISTS expense_records (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                date DATE NOT NULL,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                category TEXT,
                import_hash TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(user_id, import_hash)
            );

            CREATE INDEX IF NOT EXISTS idx_expense_records_user_date ON expense_records(user_id, date);

            -- Audit log, one row per API read or write
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                user_email TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_user ON audit_log(user_email);
            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            "#,
        )?;

        info!(path = %self.db_path, "Database ready");
        Ok(())
    }
}
