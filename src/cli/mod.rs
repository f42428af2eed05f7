pub mod add;
pub mod categories;
pub mod delete;
pub mod demo;
pub mod edit;
pub mod export;
pub mod init;
pub mod list;
pub mod status;
pub mod summary;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::error::{Result, TallyError};
use crate::filters::ExpenseFilter;
use crate::models::{parse_instant, Category};
use crate::settings::db_path;
use crate::storage::{KeyValueStore, SqliteStore};
use crate::store::ExpenseStore;

pub(crate) fn parse_date_arg(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    parse_instant(raw).ok_or_else(|| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{raw}'"))
}

pub(crate) fn parse_category_arg(raw: &str) -> std::result::Result<Category, String> {
    raw.parse::<Category>().map_err(|e| {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
        format!("{e} (choose from {})", names.join(", "))
    })
}

pub(crate) fn open_store() -> Result<ExpenseStore<SqliteStore>> {
    let path = db_path();
    if !path.exists() {
        return Err(TallyError::Settings(format!(
            "No database found at {}\nRun `tally init` to set one up.",
            path.display()
        )));
    }
    Ok(ExpenseStore::open(SqliteStore::open(&path)?))
}

/// Tell the user when the last write did not reach the database.
pub(crate) fn warn_if_unsaved<S: KeyValueStore>(store: &ExpenseStore<S>) {
    if !store.last_save_ok() {
        eprintln!("Warning: the change could not be saved to the database and will be lost.");
    }
}

#[derive(Parser)]
#[command(name = "tally", version, about = "Personal expense tracker for the terminal.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Filter flags shared by `list` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only this category
    #[arg(long, value_parser = parse_category_arg)]
    pub category: Option<Category>,
    /// Start date, inclusive: YYYY-MM-DD
    #[arg(long = "from", value_parser = parse_date_arg)]
    pub from_date: Option<DateTime<Utc>>,
    /// End date, inclusive: YYYY-MM-DD
    #[arg(long = "to", value_parser = parse_date_arg)]
    pub to_date: Option<DateTime<Utc>>,
    /// Minimum amount (ignored if not a number)
    #[arg(long = "min")]
    pub min_amount: Option<String>,
    /// Maximum amount (ignored if not a number)
    #[arg(long = "max")]
    pub max_amount: Option<String>,
    /// Case-insensitive text to look for in notes
    #[arg(long)]
    pub keyword: Option<String>,
}

impl From<FilterArgs> for ExpenseFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            category: args.category,
            start_date: args.from_date,
            end_date: args.to_date,
            min_amount: args.min_amount,
            max_amount: args.max_amount,
            keyword: args.keyword,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Set up tally: choose a data directory and initialize the database.
    Init {
        /// Path for tally data (default: ~/Documents/tally)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Record an expense.
    Add {
        /// Amount spent, e.g. 12.50
        amount: f64,
        /// Category: Food, Transport, Entertainment, Shopping, Other
        #[arg(long, default_value = "Food", value_parser = parse_category_arg)]
        category: Category,
        /// Short note (up to 80 characters)
        #[arg(long, default_value = "")]
        note: String,
        /// Date: YYYY-MM-DD (default: today)
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<DateTime<Utc>>,
    },
    /// List expenses, newest first.
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Edit an expense. Fields not given keep their current value.
    Edit {
        /// Expense id or unique id prefix (shown in `tally list`)
        id: String,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long, value_parser = parse_category_arg)]
        category: Option<Category>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<DateTime<Utc>>,
    },
    /// Delete an expense.
    Delete {
        /// Expense id or unique id prefix (shown in `tally list`)
        id: String,
    },
    /// Monthly total, category breakdown and daily trend.
    Summary {
        /// Month: YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,
    },
    /// Export expenses to CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output file path (default: <data_dir>/exports/expenses-YYYY-MM-DD.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the available categories.
    Categories,
    /// Load sample expenses to explore tally.
    Demo,
    /// Show data location and collection statistics.
    Status,
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
