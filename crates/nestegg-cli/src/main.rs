//! Nestegg CLI - Budget and retirement planner
//!
//! Usage:
//!   nestegg init                                  Initialize database
//!   nestegg project --current-age 30 --retirement-age 65 --monthly 500
//!   nestegg budget save --income 5000 --recommended
//!   nestegg records import --file expenses.csv
//!   nestegg serve --port 3000                     Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use nestegg_core::models::InvestmentParameters;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Project {
            current_age,
            retirement_age,
            current_investment,
            monthly,
            annual_return,
            scenarios,
            ai,
            tips,
            json,
        } => {
            let params = InvestmentParameters {
                current_age,
                retirement_age,
                current_investment,
                monthly_contribution: monthly,
                annual_return_percent: annual_return,
            };
            let options = commands::ProjectOptions {
                scenarios,
                ai_scenarios: ai,
                tips,
                json,
            };
            let advisor = commands::open_advisor()?;
            commands::cmd_project(&advisor, &params, options).await
        }
        Commands::Budget { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                None | Some(BudgetAction::Show) => commands::cmd_budget_show(&db, user_id),
                Some(BudgetAction::Save {
                    income,
                    amounts,
                    recommended,
                    reset,
                }) => commands::cmd_budget_save(&db, user_id, income, &amounts, recommended, reset),
                Some(BudgetAction::Evaluate { json }) => {
                    commands::cmd_budget_evaluate(&db, user_id, json)
                }
                Some(BudgetAction::Recommend { income }) => commands::cmd_budget_recommend(income),
                Some(BudgetAction::Insights) => {
                    let advisor = commands::open_advisor()?;
                    commands::cmd_budget_insights(&db, &advisor, user_id).await
                }
            }
        }
        Commands::Records { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let user_id = commands::resolve_user(&db, &cli.user)?;
            match action {
                None => commands::cmd_records_list(&db, user_id, 20),
                Some(RecordsAction::List { limit }) => {
                    commands::cmd_records_list(&db, user_id, limit)
                }
                Some(RecordsAction::Add {
                    amount,
                    description,
                    date,
                    category,
                }) => {
                    let advisor = commands::open_advisor()?;
                    commands::cmd_records_add(
                        &db,
                        &advisor,
                        user_id,
                        date.as_deref(),
                        &description,
                        amount,
                        category.as_deref(),
                    )
                    .await
                    .map(|_| ())
                }
                Some(RecordsAction::Import { file }) => {
                    commands::cmd_records_import(&db, user_id, &file)
                }
                Some(RecordsAction::Summary) => commands::cmd_records_summary(&db, user_id),
                Some(RecordsAction::Insights) => {
                    let advisor = commands::open_advisor()?;
                    commands::cmd_records_insights(&db, &advisor, user_id).await
                }
                Some(RecordsAction::Ask { question }) => {
                    let advisor = commands::open_advisor()?;
                    commands::cmd_records_ask(&db, &advisor, user_id, &question).await
                }
            }
        }
        Commands::Audit { limit, for_user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_audit(&db, limit, for_user.as_deref())
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
    }
}
