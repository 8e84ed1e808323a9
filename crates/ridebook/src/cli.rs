//! Clap derive structures for the `ridebook` CLI.
//!
//! Every resource shares one command shape (`list`, `get`, `create`,
//! `update`, `delete`, `act`, `export`, `stats`); see [`ResourceCommand`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use ridebook_core::api::DateRange;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ridebook -- back-office CLI for the ride-booking platform
#[derive(Debug, Parser)]
#[command(
    name = "ridebook",
    version,
    about = "Manage the ride-booking back office from the command line",
    long_about = "Administer affiliates, commissions, payouts, ride requests, companies,\n\
        users, vehicles, routes, payments, B2B partners and CMS pages through\n\
        the back-office REST API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "RIDEBOOK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API root URL (overrides profile)
    #[arg(long, short = 'u', env = "RIDEBOOK_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token (overrides stored token)
    #[arg(long, env = "RIDEBOOK_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "RIDEBOOK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "RIDEBOOK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "RIDEBOOK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage affiliates
    #[command(alias = "aff")]
    Affiliates(ResourceArgs),

    /// Manage affiliate commissions
    #[command(alias = "com")]
    Commissions(ResourceArgs),

    /// Manage affiliate payouts
    Payouts(ResourceArgs),

    /// Manage ride requests
    #[command(alias = "req")]
    Requests(ResourceArgs),

    /// Manage corporate accounts
    Companies(ResourceArgs),

    /// Manage back-office users
    Users(ResourceArgs),

    /// Manage fleet vehicles
    Vehicles(ResourceArgs),

    /// Manage fixed-price routes
    Routes(ResourceArgs),

    /// Manage customer payments
    Payments(ResourceArgs),

    /// Manage B2B partners
    Partners(ResourceArgs),

    /// Manage CMS pages
    Pages(ResourceArgs),

    /// Show dashboard statistics
    Dashboard,

    /// Manage the stored bearer token
    Auth(AuthArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Filters ──────────────────────────────────────────────────────────

/// Relative period accepted by `--period`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Period {
    Today,
    Week,
    Month,
    Quarter,
}

impl From<Period> for DateRange {
    fn from(p: Period) -> Self {
        match p {
            Period::Today => DateRange::Today,
            Period::Week => DateRange::Week,
            Period::Month => DateRange::Month,
            Period::Quarter => DateRange::Quarter,
        }
    }
}

/// Filters shared by `list` and `export`.
#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Filter by status
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by type
    #[arg(long = "type", short = 't')]
    pub kind: Option<String>,

    /// Restrict to a recent period
    #[arg(long)]
    pub period: Option<Period>,

    /// Extra filter as key=value (repeatable)
    #[arg(long = "filter", short = 'f', value_name = "KEY=VALUE")]
    pub extra: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u64>,

    /// Items per page
    #[arg(long, short = 'l')]
    pub limit: Option<u64>,
}

// ── Resource Commands ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List items (one page)
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one item
    Get {
        /// Item ID
        id: String,
    },

    /// Create an item from a JSON file
    Create {
        /// JSON payload file
        #[arg(long = "from-file", short = 'F')]
        from_file: PathBuf,
    },

    /// Update an item from a JSON file
    Update {
        /// Item ID
        id: String,

        /// JSON payload file
        #[arg(long = "from-file", short = 'F')]
        from_file: PathBuf,
    },

    /// Delete an item
    #[command(alias = "rm")]
    Delete {
        /// Item ID
        id: String,
    },

    /// Run a lifecycle action (approve, reject, cancel, ...)
    ///
    /// More than one ID runs the bulk variant of the action.
    Act {
        /// Action name, e.g. `approve` or `process-payment`
        action: String,

        /// Item ID(s)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Optional JSON body file
        #[arg(long = "data", short = 'd')]
        data: Option<PathBuf>,
    },

    /// Download an export of the filtered list
    Export(ExportArgs),

    /// Show aggregate statistics
    Stats,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Directory to save the export into
    #[arg(long, short = 'd', default_value = ".")]
    pub dir: PathBuf,

    /// Write the export to stdout instead of a file
    #[arg(long, conflicts_with = "dir")]
    pub stdout: bool,

    /// Overwrite an existing file with the same name
    #[arg(long)]
    pub overwrite: bool,
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store a bearer token for the active profile
    SetToken {
        /// Token value (prompted when omitted)
        token: Option<String>,
    },

    /// Remove the stored token
    Logout,

    /// Show where the token comes from
    Status {
        /// Also verify the token against the server
        #[arg(long)]
        check: bool,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the merged configuration
    Show,

    /// Set a value on the active profile
    Set {
        /// Key: api_url, login_path, token_env, token_storage, insecure,
        /// timeout, ca_cert, cookies
        key: String,

        /// Value
        value: String,
    },

    /// List profile names (the default is marked with *)
    Profiles,

    /// Make a profile the default
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}
