//! Budget command implementations

use anyhow::{bail, Context, Result};
use nestegg_core::budget::{self, VarianceStatus};
use nestegg_core::db::Database;
use nestegg_core::models::{Budget, CategoryKind, SavedBudget};
use nestegg_core::Advisor;

use super::{money, warn_on_fallback};

/// Parse a `NAME=AMOUNT` budget assignment
pub fn parse_assignment(input: &str) -> Result<(CategoryKind, f64)> {
    let (name, amount) = input
        .split_once('=')
        .with_context(|| format!("Expected NAME=AMOUNT, got '{}'", input))?;

    let kind: CategoryKind = name
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    let amount: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("Invalid amount for {}: '{}'", kind, amount.trim()))?;

    Ok((kind, amount))
}

pub fn cmd_budget_show(db: &Database, user_id: i64) -> Result<()> {
    let budget = db.get_budget(user_id)?.to_budget();
    print_budget(&budget);
    Ok(())
}

/// Build the new budget from the saved one and the command-line changes, then save it
pub fn cmd_budget_save(
    db: &Database,
    user_id: i64,
    income: Option<f64>,
    amounts: &[String],
    recommended: bool,
    reset: bool,
) -> Result<()> {
    let mut budget = db.get_budget(user_id)?.to_budget();
    if let Some(income) = income {
        budget.monthly_income = income;
    }

    if recommended {
        if budget.monthly_income <= 0.0 {
            bail!("Set a monthly income (--income) before applying recommendations");
        }
        budget::apply_recommendations(&mut budget);
    } else if reset {
        budget::reset(&mut budget);
    }

    for assignment in amounts {
        let (kind, amount) = parse_assignment(assignment)?;
        budget.set_amount(kind, amount);
    }

    budget.validate()?;
    db.upsert_budget(user_id, &SavedBudget::from_budget(&budget))
        .context("Failed to save budget")?;

    println!("✅ Budget saved");
    print_budget(&budget);
    Ok(())
}

pub fn cmd_budget_evaluate(db: &Database, user_id: i64, json: bool) -> Result<()> {
    let budget = db.get_budget(user_id)?.to_budget();
    let evaluation = budget::evaluate(&budget);

    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    let summary = &evaluation.summary;
    let metrics = &evaluation.report.metrics;

    println!();
    println!("📊 Budget Evaluation");
    println!("   ─────────────────────────────────────────────");
    println!("   Income:     {:>12}", money(summary.monthly_income));
    println!("   Budgeted:   {:>12}", money(summary.total_budgeted));
    println!("   Remaining:  {:>12}", money(summary.remaining_income));
    println!();
    println!("   Utilization:        {:.1}%", metrics.budget_utilization);
    println!(
        "   Debt-to-income:     {:.1}% ({:?})",
        metrics.debt_to_income_ratio, metrics.debt_level
    );
    println!(
        "   Emergency fund:     {:.1} months ({:?})",
        metrics.emergency_fund_months, metrics.emergency_fund_level
    );

    let significant: Vec<_> = evaluation.report.significant().collect();
    if !significant.is_empty() {
        println!();
        println!("   Categories off target:");
        for v in significant {
            let marker = match v.status {
                VarianceStatus::Over => "⬆️ ",
                VarianceStatus::Under => "⬇️ ",
                VarianceStatus::OnTarget => "  ",
            };
            println!(
                "   {} {:<28} {:>6.1}% (recommended {}%, {:+.1})",
                marker, v.name, v.actual_percentage, v.recommended_percentage, v.variance
            );
        }
    }
    println!();

    Ok(())
}

pub fn cmd_budget_recommend(income: f64) -> Result<()> {
    let mut budget = Budget::standard(income);
    budget.validate()?;
    budget::apply_recommendations(&mut budget);

    println!("💡 Recommended budget for {} monthly income", money(income));
    print_budget(&budget);
    println!("   Save it with: nestegg budget save --income {} --recommended", income);
    Ok(())
}

pub async fn cmd_budget_insights(db: &Database, advisor: &Advisor, user_id: i64) -> Result<()> {
    let budget = db.get_budget(user_id)?.to_budget();

    if advisor.is_ai_enabled() {
        println!("🤖 Asking the AI backend...");
    }
    let advice = advisor.budget_insights(&budget).await?;
    warn_on_fallback(advisor, &advice, "budget insights");

    println!();
    println!("💡 Budget Insights ({})", advice.source);
    println!("   ─────────────────────────────────────────────");
    for insight in &advice.value {
        match &insight.title {
            Some(title) => println!("   {} - {}", title, insight.message),
            None => println!("   {}", insight.message),
        }
        if let Some(savings) = &insight.savings {
            println!("      Potential savings: {}", savings);
        }
    }
    println!();

    Ok(())
}

fn print_budget(budget: &Budget) {
    println!();
    println!("   Monthly income: {}", money(budget.monthly_income));
    println!("   ─────────────────────────────────────────────");
    for cat in &budget.categories {
        println!(
            "   {} {:<28} {:>12}  ({}%)",
            cat.icon,
            cat.name,
            money(cat.amount),
            cat.recommended_percentage
        );
    }
    println!("   ─────────────────────────────────────────────");
    println!("   Total budgeted: {}", money(budget.total_budgeted()));
    println!("   Remaining:      {}", money(budget.remaining_income()));
    println!();
}
