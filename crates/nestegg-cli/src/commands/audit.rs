//! Audit log command

use anyhow::Result;
use nestegg_core::db::Database;

use super::truncate;

pub fn cmd_audit(db: &Database, limit: i64, user: Option<&str>) -> Result<()> {
    let entries = db.list_audit_log(limit.max(1), user)?;

    if entries.is_empty() {
        println!("No audit entries.");
        return Ok(());
    }

    println!();
    for e in &entries {
        let entity = match (&e.entity_type, e.entity_id) {
            (Some(t), Some(id)) => format!("{}#{}", t, id),
            (Some(t), None) => t.clone(),
            _ => "-".to_string(),
        };
        println!(
            "   {}  {:<24}  {:<10}  {:<20}  {}",
            e.timestamp,
            truncate(&e.user_email, 24),
            e.action,
            entity,
            e.details.as_deref().unwrap_or("")
        );
    }
    println!();

    Ok(())
}
