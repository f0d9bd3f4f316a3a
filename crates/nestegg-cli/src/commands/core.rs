//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `open_advisor` - Advisor configured from the environment
//! - `resolve_user` - User row for the `--user` identity
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use nestegg_core::{db::Database, Advisor};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Advisor using the AI backend named by `AI_BACKEND`, or heuristics only
pub fn open_advisor() -> Result<Advisor> {
    Advisor::from_env().context("Failed to load advisor configuration")
}

/// Register (or look up) the identity the CLI acts as
pub fn resolve_user(db: &Database, user: &str) -> Result<i64> {
    db.ensure_user(user)
        .with_context(|| format!("Failed to resolve user '{}'", user))
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if db.is_encrypted()? {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    }
    println!("   Path: {}", db.path());

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Save a budget: nestegg budget save --income 5000 --recommended");
    println!("  2. Import expenses: nestegg records import --file expenses.csv");
    println!("  3. Start web UI: nestegg serve");

    Ok(())
}
