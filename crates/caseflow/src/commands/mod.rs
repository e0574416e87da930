//! Command dispatch: bridges CLI args -> session fetches -> output formatting.

pub mod config_cmd;
pub mod grievances;
pub mod households;
pub mod individuals;
pub mod payments;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};

use caseflow_core::{PageSpec, Session};

use crate::cli::{Command, GlobalOpts, PageArgs};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    session: &Session,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Households(args) => households::handle(session, args, global).await,
        Command::Individuals(args) => individuals::handle(session, args, global).await,
        Command::Grievances(args) => grievances::handle(session, args, global).await,
        Command::Payments(args) => payments::handle(session, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}

// ── Shared helpers ───────────────────────────────────────────────────

/// Fail fast when a program-scoped registry is used without a program.
///
/// The server rejects these fetches anyway; checking before we connect
/// turns a confusing network round-trip into a usage error.
pub(crate) fn require_program(session: &Session) -> Result<(), CliError> {
    if session.program().is_none() {
        return Err(CliError::ProgramRequired);
    }
    Ok(())
}

/// Parse a date flag (YYYY-MM-DD).
pub(crate) fn parse_date_opt(
    field: &str,
    raw: Option<&str>,
) -> Result<Option<NaiveDate>, CliError> {
    raw.map(|s| {
        s.parse().map_err(|_| CliError::Validation {
            field: field.to_owned(),
            reason: format!("expected YYYY-MM-DD, got '{s}'"),
        })
    })
    .transpose()
}

/// Build the page spec for a list command from flags plus the session's
/// default page size.
pub(crate) fn page_spec(paging: &PageArgs, default_page_size: u32) -> PageSpec {
    let mut page = PageSpec::new(paging.page_size.unwrap_or(default_page_size));
    page.page = paging.page.max(1);
    page.ordering = paging.ordering.clone();
    page
}

/// Progress bar for `--all` page walks. Hidden when quiet; indicatif
/// already suppresses drawing when stderr is not a terminal.
pub(crate) fn page_progress(total_pages: u32, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(u64::from(total_pages));
    bar.set_style(
        ProgressStyle::with_template("fetching pages [{bar:30}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

/// `-` for absent optional values in detail views.
pub(crate) fn dash<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".to_owned(), ToString::to_string)
}
