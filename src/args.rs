//! These structs provide the CLI interface for the loanbook CLI.

use crate::model::{Amount, FilterCriteria, NewTransaction, TransactionId, TransactionType};
use crate::Result;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// The file name `loanbook export` writes to when no `--output` is given.
pub const DEFAULT_EXPORT_FILE: &str = "loan_expense_transactions.csv";

/// loanbook: A command-line tool for keeping track of borrowed money and what it was spent on.
///
/// Transactions are either loans (money coming in) or expenses (money going out). They are kept
/// in a JSON file in your loanbook home directory. From there you can list and search them, see
/// totals per month and per category, export them to CSV, or serve them over HTTP to a front end.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the loanbook home directory and initialize the configuration file.
    ///
    /// This is the first command you should run. By default the home directory is
    /// $HOME/loanbook, pass --loanbook-home or set LOANBOOK_HOME to put it somewhere else.
    ///
    /// If you already have a data.json from an earlier installation, pass it as --data-file and
    /// it will be used as-is.
    Init(InitArgs),
    /// Record a new loan or expense.
    Add(TransactionArgs),
    /// Replace every field of an existing transaction.
    Update(UpdateArgs),
    /// Delete a transaction.
    Delete(DeleteArgs),
    /// List transactions, newest first.
    List(ListArgs),
    /// Show totals, monthly sums and the expense breakdown by category.
    Summary(FilterArgs),
    /// Write transactions to a CSV file.
    Export(ExportArgs),
    /// Serve the transactions over HTTP.
    Serve(ServeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where loanbook data and configuration is held. Defaults to ~/loanbook
    #[arg(long, env = "LOANBOOK_HOME", default_value_t = default_loanbook_home())]
    loanbook_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, loanbook_home: PathBuf) -> Self {
        Self {
            log_level,
            loanbook_home: loanbook_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn loanbook_home(&self) -> &DisplayPath {
        &self.loanbook_home
    }
}

/// (Not shown): Args for the `loanbook init` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct InitArgs {
    /// Where to keep transactions. Relative paths are relative to the loanbook home directory.
    /// Defaults to data.json
    #[arg(long)]
    data_file: Option<PathBuf>,
}

impl InitArgs {
    pub fn new(data_file: Option<PathBuf>) -> Self {
        Self { data_file }
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }
}

/// (Not shown): The fields of a transaction, used by `loanbook add` and `loanbook update`.
#[derive(Debug, Parser, Clone)]
pub struct TransactionArgs {
    /// Either "loan" or "expense"
    #[arg(long = "type")]
    kind: TransactionType,

    /// The amount, e.g. 1500 or "1,500.50". A leading currency symbol is ignored.
    #[arg(long)]
    amount: Amount,

    /// The date of the transaction, e.g. 2024-01-15
    #[arg(long)]
    date: String,

    /// A free-form category such as Materials, Labor or Equipment
    #[arg(long)]
    category: Option<String>,

    /// A note about the transaction
    #[arg(long)]
    description: Option<String>,
}

impl TransactionArgs {
    pub fn new(kind: TransactionType, amount: impl Into<Amount>, date: impl Into<String>) -> Self {
        Self {
            kind,
            amount: amount.into(),
            date: date.into(),
            category: None,
            description: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// The payload handed to the store.
    pub fn to_new_transaction(&self) -> NewTransaction {
        let mut fields = NewTransaction::new(self.kind, self.amount, &self.date);
        if let Some(category) = &self.category {
            fields = fields.with_category(category);
        }
        if let Some(description) = &self.description {
            fields = fields.with_description(description);
        }
        fields
    }
}

/// (Not shown): Args for the `loanbook update` command.
#[derive(Debug, Parser, Clone)]
pub struct UpdateArgs {
    /// The ID of the transaction to replace
    id: TransactionId,

    #[clap(flatten)]
    fields: TransactionArgs,
}

impl UpdateArgs {
    pub fn new(id: TransactionId, fields: TransactionArgs) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    pub fn fields(&self) -> &TransactionArgs {
        &self.fields
    }
}

/// (Not shown): Args for the `loanbook delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The ID of the transaction to delete
    id: TransactionId,
}

impl DeleteArgs {
    pub fn new(id: TransactionId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> &TransactionId {
        &self.id
    }
}

/// (Not shown): Narrows the transactions that a command works on.
#[derive(Debug, Parser, Clone, Default)]
pub struct FilterArgs {
    /// Only transactions in this month, 1 through 12
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,

    /// Only transactions in this year
    #[arg(long)]
    year: Option<i32>,

    /// Only transactions whose description, category or type contains this text, ignoring case
    #[arg(long)]
    search: Option<String>,
}

impl FilterArgs {
    pub fn new(month: Option<u32>, year: Option<i32>, search: Option<String>) -> Self {
        Self {
            month,
            year,
            search,
        }
    }

    pub fn criteria(&self) -> Result<FilterCriteria> {
        FilterCriteria::new(self.month, self.year, self.search.clone())
    }
}

/// How `loanbook list` prints transactions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned columns for reading in a terminal.
    #[default]
    Table,
    /// A JSON array, the same shape as the data file.
    Json,
    /// CSV with a header row.
    Csv,
}

serde_plain::derive_display_from_serialize!(OutputFormat);
serde_plain::derive_fromstr_from_deserialize!(OutputFormat);

/// (Not shown): Args for the `loanbook list` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ListArgs {
    #[clap(flatten)]
    filter: FilterArgs,

    /// One of table, json or csv
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl ListArgs {
    pub fn new(filter: FilterArgs, format: OutputFormat) -> Self {
        Self { filter, format }
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// (Not shown): Args for the `loanbook export` command.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    #[clap(flatten)]
    filter: FilterArgs,

    /// The CSV file to write. An existing file is overwritten.
    #[arg(long, default_value = DEFAULT_EXPORT_FILE)]
    output: PathBuf,
}

impl ExportArgs {
    pub fn new(filter: FilterArgs, output: impl Into<PathBuf>) -> Self {
        Self {
            filter,
            output: output.into(),
        }
    }

    pub fn filter(&self) -> &FilterArgs {
        &self.filter
    }

    pub fn output(&self) -> &Path {
        &self.output
    }
}

/// (Not shown): Args for the `loanbook serve` command.
#[derive(Debug, Parser, Clone, Default)]
pub struct ServeArgs {
    /// The address to listen on, e.g. 127.0.0.1:4000. Defaults to `bind` in config.json
    #[arg(long)]
    bind: Option<String>,
}

impl ServeArgs {
    pub fn new(bind: Option<String>) -> Self {
        Self { bind }
    }

    pub fn bind(&self) -> Option<&str> {
        self.bind.as_deref()
    }
}

fn default_loanbook_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("loanbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --loanbook-home or LOANBOOK_HOME instead of relying on the \
                default loanbook home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("loanbook")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
