//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nestegg - Plan a budget, track expenses and project retirement savings
#[derive(Parser)]
#[command(name = "nestegg")]
#[command(about = "Self-hosted budget and retirement planner", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "nestegg.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set NESTEGG_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    /// Identity whose budget and records are used
    ///
    /// Matches the identity the web server records for unauthenticated requests.
    #[arg(long, default_value = "local-dev", global = true)]
    pub user: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Project retirement savings growth
    Project {
        /// Current age in years
        #[arg(long)]
        current_age: u32,

        /// Planned retirement age
        #[arg(long)]
        retirement_age: u32,

        /// Amount already invested
        #[arg(long, default_value = "0")]
        current_investment: f64,

        /// Monthly contribution
        #[arg(short, long, default_value = "0")]
        monthly: f64,

        /// Nominal annual return in percent
        #[arg(short = 'r', long, default_value = "7")]
        annual_return: f64,

        /// Also show what-if scenarios
        #[arg(long)]
        scenarios: bool,

        /// Ask the AI backend for scenarios instead of the presets
        #[arg(long, requires = "scenarios")]
        ai: bool,

        /// Also show money-saving tips
        #[arg(long)]
        tips: bool,

        /// Print the projection as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the monthly budget
    Budget {
        #[command(subcommand)]
        action: Option<BudgetAction>,
    },

    /// Manage expense records
    Records {
        #[command(subcommand)]
        action: Option<RecordsAction>,
    },

    /// Show the audit log
    Audit {
        /// Maximum entries to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only entries for this identity
        #[arg(long)]
        for_user: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires Cloudflare Access headers or an API key.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum BudgetAction {
    /// Show the saved budget
    Show,

    /// Save the budget (overwrites the previous one)
    Save {
        /// Monthly income (keeps the saved income when omitted)
        #[arg(short, long)]
        income: Option<f64>,

        /// Category amount as NAME=AMOUNT (repeatable), e.g. --set housing=1400
        #[arg(long = "set", value_name = "NAME=AMOUNT")]
        amounts: Vec<String>,

        /// Start from the recommended amounts for the income
        #[arg(long)]
        recommended: bool,

        /// Start from zero amounts, keeping income
        #[arg(long, conflicts_with = "recommended")]
        reset: bool,
    },

    /// Evaluate the saved budget (totals, variances, health metrics)
    Evaluate {
        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recommended amounts for an income
    Recommend {
        /// Monthly income
        #[arg(short, long)]
        income: f64,
    },

    /// Insights about the saved budget
    Insights,
}

#[derive(Subcommand)]
pub enum RecordsAction {
    /// Add an expense record
    Add {
        /// Amount spent
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// What the money was spent on
        #[arg(short, long)]
        description: String,

        /// Date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Category (suggested by the AI backend when omitted)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List recent records
    List {
        /// Maximum records to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },

    /// Import records from CSV (date, description, amount, optional category)
    Import {
        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Category breakdown of all records
    Summary,

    /// Spending insights
    Insights,

    /// Ask a question about your spending
    Ask {
        /// The question
        question: String,
    },
}
