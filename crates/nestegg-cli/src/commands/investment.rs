//! Retirement projection command

use anyhow::Result;
use nestegg_core::growth::{simulate, ScenarioProjector};
use nestegg_core::models::{GrowthResult, InvestmentParameters};
use nestegg_core::{Advice, Advisor};

use super::{money, warn_on_fallback};

/// What to show next to the projection
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectOptions {
    pub scenarios: bool,
    /// Ask the advisor for scenarios instead of using the presets
    pub ai_scenarios: bool,
    pub tips: bool,
    pub json: bool,
}

pub async fn cmd_project(
    advisor: &Advisor,
    params: &InvestmentParameters,
    options: ProjectOptions,
) -> Result<()> {
    let result = simulate(params)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_projection(params, &result);
    }

    if options.scenarios {
        let advice = if options.ai_scenarios {
            let advice = advisor.scenarios(params, &result).await?;
            warn_on_fallback(advisor, &advice, "scenarios");
            advice
        } else {
            Advice::heuristic(ScenarioProjector::new(params, &result).presets()?)
        };

        println!("🔮 What if... ({})", advice.source);
        println!("   ─────────────────────────────────────────────");
        for s in &advice.value {
            println!("   {}", s.title);
            println!(
                "      +{}/month → {} at retirement (+{})",
                money(s.additional_contribution),
                money(s.final_amount),
                money(s.additional_growth)
            );
        }
        println!();
    }

    if options.tips {
        let advice = advisor.saving_tips(params, Some(&result)).await?;
        warn_on_fallback(advisor, &advice, "saving tips");

        println!("💡 Saving Tips ({})", advice.source);
        println!("   ─────────────────────────────────────────────");
        for tip in &advice.value {
            println!("   {} [{}]", tip.title, tip.category);
            println!("      {}", tip.description);
            println!("      Potential savings: {}", tip.potential_savings);
        }
        println!();
    }

    Ok(())
}

fn print_projection(params: &InvestmentParameters, result: &GrowthResult) {
    println!();
    println!(
        "📈 Retirement Projection (age {} → {}, {}% annual return)",
        params.current_age, params.retirement_age, params.annual_return_percent
    );
    println!("   ─────────────────────────────────────────────");
    println!("   {:>5}  {:>16}  {:>14}  {:>14}", "Age", "Balance", "Contributed", "Growth");
    for year in &result.yearly_data {
        println!(
            "   {:>5}  {:>16}  {:>14}  {:>14}",
            year.year,
            money(year.balance),
            money(year.contributions),
            money(year.growth)
        );
    }
    println!("   ─────────────────────────────────────────────");
    println!("   Years:               {}", result.total_years);
    println!("   Starting balance:    {}", money(result.initial_balance));
    println!("   Total contributions: {}", money(result.total_contributions));
    println!("   Total growth:        {}", money(result.total_growth));
    println!("   Final amount:        {}", money(result.final_amount));
    println!();
}
