//! Clap derive structures for the `caseflow` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Every registry's `list` command mirrors that registry's filter schema
//! as typed flags.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// caseflow -- terminal client for humanitarian case-management platforms
#[derive(Debug, Parser)]
#[command(
    name = "caseflow",
    version,
    about = "Browse case-management registries from the command line",
    long_about = "A terminal client for humanitarian case-management platforms.\n\n\
        Lists households, individuals, grievance tickets, and payment plans\n\
        through the platform's REST API, using the same filter vocabulary\n\
        the web application does. Filtered views can be exported as\n\
        shareable web links with --link.",
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
    #[arg(long, short = 'p', env = "CASEFLOW_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Server URL (overrides profile)
    #[arg(long, env = "CASEFLOW_SERVER", global = true)]
    pub server: Option<String>,

    /// Business area slug (overrides profile)
    #[arg(long, short = 'b', env = "CASEFLOW_BUSINESS_AREA", global = true)]
    pub business_area: Option<String>,

    /// Program slug; registries other than grievances require one
    #[arg(long, env = "CASEFLOW_PROGRAM", global = true)]
    pub program: Option<String>,

    /// API token
    #[arg(long, env = "CASEFLOW_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CASEFLOW_OUTPUT",
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

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "CASEFLOW_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "CASEFLOW_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
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
    /// Browse the household registry
    #[command(alias = "hh")]
    Households(HouseholdsArgs),

    /// Browse the individual registry
    #[command(alias = "ind")]
    Individuals(IndividualsArgs),

    /// Browse grievance tickets
    #[command(alias = "gr")]
    Grievances(GrievancesArgs),

    /// Browse payment plans
    #[command(alias = "pp")]
    Payments(PaymentsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Paging Arguments ──────────────────────────────────────────

/// Pagination, ordering, and link arguments shared by all list commands.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page to fetch (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Rows per page (overrides profile default)
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Sort key; prefix with '-' for descending (e.g. "-created_at")
    #[arg(long, short = 's')]
    pub ordering: Option<String>,

    /// Follow next pages until the result set is exhausted
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Print the shareable web link for this filter instead of fetching
    #[arg(long)]
    pub link: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HOUSEHOLDS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HouseholdsArgs {
    #[command(subcommand)]
    pub command: HouseholdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum HouseholdsCommand {
    /// List households in the selected program
    #[command(alias = "ls")]
    List(HouseholdListArgs),

    /// Get household details
    Get {
        /// Household ID (UUID)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct HouseholdListArgs {
    /// Free-text search (code, head of household)
    #[arg(long)]
    pub search: Option<String>,

    /// Residence status (repeatable): IDP, REFUGEE, HOST, ...
    #[arg(long, value_name = "STATUS", value_delimiter = ',')]
    pub residence_status: Vec<String>,

    /// Admin-2 area code (repeatable)
    #[arg(long, value_name = "AREA", value_delimiter = ',')]
    pub admin2: Vec<String>,

    /// Minimum household size
    #[arg(long, value_name = "N")]
    pub size_min: Option<f64>,

    /// Maximum household size
    #[arg(long, value_name = "N")]
    pub size_max: Option<f64>,

    /// Registered on or after (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub registered_from: Option<String>,

    /// Registered on or before (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub registered_to: Option<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INDIVIDUALS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IndividualsArgs {
    #[command(subcommand)]
    pub command: IndividualsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IndividualsCommand {
    /// List individuals in the selected program
    #[command(alias = "ls")]
    List(IndividualListArgs),

    /// Get individual details
    Get {
        /// Individual ID (UUID)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct IndividualListArgs {
    /// Free-text search (code, full name)
    #[arg(long)]
    pub search: Option<String>,

    /// Sex (repeatable): MALE, FEMALE
    #[arg(long, value_name = "SEX", value_delimiter = ',')]
    pub sex: Vec<String>,

    /// Minimum age in years
    #[arg(long, value_name = "N")]
    pub age_min: Option<f64>,

    /// Maximum age in years
    #[arg(long, value_name = "N")]
    pub age_max: Option<f64>,

    /// Admin-2 area code (repeatable)
    #[arg(long, value_name = "AREA", value_delimiter = ',')]
    pub admin2: Vec<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  GRIEVANCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct GrievancesArgs {
    #[command(subcommand)]
    pub command: GrievancesCommand,
}

#[derive(Debug, Subcommand)]
pub enum GrievancesCommand {
    /// List grievance tickets (program-scoped, or area-wide without --program)
    #[command(alias = "ls")]
    List(GrievanceListArgs),

    /// Get grievance ticket details
    Get {
        /// Ticket ID (UUID)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct GrievanceListArgs {
    /// Free-text search (ticket code, household code)
    #[arg(long)]
    pub search: Option<String>,

    /// Workflow status (repeatable): NEW, ASSIGNED, IN_PROGRESS, ...
    #[arg(long, value_name = "STATUS", value_delimiter = ',')]
    pub status: Vec<String>,

    /// Category (repeatable): DATA_CHANGE, REFERRAL, ...
    #[arg(long, value_name = "CATEGORY", value_delimiter = ',')]
    pub category: Vec<String>,

    /// Admin-2 area code (repeatable)
    #[arg(long, value_name = "AREA", value_delimiter = ',')]
    pub admin2: Vec<String>,

    /// Minimum priority (1 = high)
    #[arg(long, value_name = "N")]
    pub priority_min: Option<f64>,

    /// Maximum priority (3 = low)
    #[arg(long, value_name = "N")]
    pub priority_max: Option<f64>,

    /// Created on or after (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub created_from: Option<String>,

    /// Created on or before (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub created_to: Option<String>,

    /// Assignee (user id or email)
    #[arg(long, value_name = "USER")]
    pub assigned_to: Option<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PAYMENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PaymentsArgs {
    #[command(subcommand)]
    pub command: PaymentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PaymentsCommand {
    /// List payment plans in the selected program
    #[command(alias = "ls")]
    List(PaymentListArgs),

    /// Get payment plan details
    Get {
        /// Payment plan ID (UUID)
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct PaymentListArgs {
    /// Free-text search (plan code, name)
    #[arg(long)]
    pub search: Option<String>,

    /// Plan status (repeatable): OPEN, LOCKED, ACCEPTED, ...
    #[arg(long, value_name = "STATUS", value_delimiter = ',')]
    pub status: Vec<String>,

    /// Minimum total entitled amount
    #[arg(long, value_name = "AMOUNT")]
    pub entitled_min: Option<f64>,

    /// Maximum total entitled amount
    #[arg(long, value_name = "AMOUNT")]
    pub entitled_max: Option<f64>,

    /// Dispersion starts on or after (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_from: Option<String>,

    /// Dispersion starts on or before (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_to: Option<String>,

    /// Dispersion ends on or after (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_from: Option<String>,

    /// Dispersion ends on or before (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_to: Option<String>,

    #[command(flatten)]
    pub paging: PageArgs,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Store an API token in the system keyring (hidden prompt)
    SetToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Remove a stored API token from the system keyring
    EraseToken {
        /// Profile name (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
