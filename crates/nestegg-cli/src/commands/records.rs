//! Expense record command implementations

use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use nestegg_core::budget::summarize_records;
use nestegg_core::db::Database;
use nestegg_core::import::{parse_csv, parse_date};
use nestegg_core::models::NewExpenseRecord;
use nestegg_core::Advisor;

use super::{money, truncate, warn_on_fallback};

/// Most recent records sent along with an advice request
const ADVICE_RECORD_LIMIT: i64 = 200;

/// Add a record, letting the advisor pick a category when none is given.
///
/// Returns the new record id.
pub async fn cmd_records_add(
    db: &Database,
    advisor: &Advisor,
    user_id: i64,
    date: Option<&str>,
    description: &str,
    amount: f64,
    category: Option<&str>,
) -> Result<i64> {
    let description = description.trim();
    if description.is_empty() {
        bail!("Description cannot be empty");
    }
    if !amount.is_finite() {
        bail!("Amount must be a finite number");
    }

    let date: NaiveDate = match date {
        Some(d) => parse_date(d).context("Invalid --date")?,
        None => Local::now().date_naive(),
    };

    let category = match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(c) => c.to_string(),
        None => {
            let advice = advisor.categorize_expense(description).await?;
            println!("   Category: {} (suggested, {})", advice.value, advice.source);
            advice.value
        }
    };

    let record = NewExpenseRecord::new(date, description, amount, Some(category.clone()));
    let id = db
        .add_expense_record(user_id, &record)
        .context("Failed to add expense record")?;

    println!(
        "✅ Added #{}: {} {} ({}) on {}",
        id,
        money(amount),
        description,
        category,
        date
    );
    Ok(id)
}

pub fn cmd_records_list(db: &Database, user_id: i64, limit: i64) -> Result<()> {
    let records = db.list_expense_records(user_id, Some(limit.max(1)))?;

    if records.is_empty() {
        println!("No expense records yet. Add one with: nestegg records add -a 12.50 -d Lunch");
        return Ok(());
    }

    println!();
    println!(
        "   {:>5}  {:<10}  {:<32}  {:<16}  {:>12}",
        "ID", "Date", "Description", "Category", "Amount"
    );
    println!("   {}", "─".repeat(83));
    for r in &records {
        println!(
            "   {:>5}  {:<10}  {:<32}  {:<16}  {:>12}",
            r.id,
            r.date,
            truncate(&r.description, 32),
            truncate(r.category.as_deref().unwrap_or("-"), 16),
            money(r.amount)
        );
    }
    println!();

    Ok(())
}

/// Import a CSV file, skipping records already stored for this user
pub fn cmd_records_import(db: &Database, user_id: i64, file: &Path) -> Result<()> {
    println!("📥 Importing {}...", file.display());

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let records =
        parse_csv(reader).with_context(|| format!("Failed to parse {}", file.display()))?;
    let summary = db.import_expense_records(user_id, &records)?;

    println!(
        "✅ Imported {} record(s), skipped {} duplicate(s)",
        summary.imported, summary.skipped
    );
    Ok(())
}

pub fn cmd_records_summary(db: &Database, user_id: i64) -> Result<()> {
    let records = db.list_expense_records(user_id, None)?;
    let breakdown = summarize_records(&records);

    println!();
    println!("📊 Spending Summary");
    println!("   ─────────────────────────────────────────────");
    println!("   Total spent:   {}", money(breakdown.total_spent));
    println!("   Transactions:  {}", breakdown.total_transactions);
    println!("   Top category:  {}", breakdown.top_category);

    if !breakdown.categories_data.is_empty() {
        println!();
        for c in &breakdown.categories_data {
            println!(
                "   {:<20} {:>12} {:>6.1}%  ({} records)",
                c.category,
                money(c.amount),
                c.percentage,
                c.count
            );
        }
    }
    println!();

    Ok(())
}

pub async fn cmd_records_insights(db: &Database, advisor: &Advisor, user_id: i64) -> Result<()> {
    let records = db.list_expense_records(user_id, Some(ADVICE_RECORD_LIMIT))?;
    let advice = advisor.expense_insights(&records).await?;
    warn_on_fallback(advisor, &advice, "spending insights");

    println!();
    println!("💡 Spending Insights ({})", advice.source);
    println!("   ─────────────────────────────────────────────");
    for insight in &advice.value {
        println!("   [{}] {}", insight.kind, insight.title);
        println!("      {}", insight.message);
        if let Some(action) = &insight.action {
            println!("      → {}", action);
        }
    }
    println!();

    Ok(())
}

pub async fn cmd_records_ask(
    db: &Database,
    advisor: &Advisor,
    user_id: i64,
    question: &str,
) -> Result<()> {
    let records = db.list_expense_records(user_id, Some(ADVICE_RECORD_LIMIT))?;
    let advice = advisor.answer_question(question, &records).await?;
    warn_on_fallback(advisor, &advice, "answers");

    println!();
    println!("{}", advice.value);
    println!();

    Ok(())
}
