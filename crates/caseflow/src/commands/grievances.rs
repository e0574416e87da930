//! Grievance ticket command handlers.

use std::sync::Arc;

use tabled::Tabled;

use caseflow_core::{
    FilterState, FilterStore, FilterValue, GrievanceTicket, ListPage, PageSpec, Session,
};

use crate::cli::{GlobalOpts, GrievanceListArgs, GrievancesArgs, GrievancesCommand};
use crate::error::CliError;
use crate::output;

use super::{dash, page_progress, page_spec, parse_date_opt};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Assigned to")]
    assigned_to: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Arc<GrievanceTicket>> for TicketRow {
    fn from(t: &Arc<GrievanceTicket>) -> Self {
        Self {
            id: t.id.to_string(),
            code: t.code.clone(),
            status: t.status.as_ref().map(ToString::to_string).unwrap_or_default(),
            category: t.category.as_ref().map(ToString::to_string).unwrap_or_default(),
            priority: t.priority.map(|p| p.to_string()).unwrap_or_default(),
            assigned_to: t.assigned_to.clone().unwrap_or_default(),
            created: t
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(t: &GrievanceTicket) -> String {
    [
        format!("ID:           {}", t.id),
        format!("Code:         {}", t.code),
        format!("Status:       {}", dash(t.status.as_ref())),
        format!("Category:     {}", dash(t.category.as_ref())),
        format!("Priority:     {}", dash(t.priority.as_ref())),
        format!("Urgency:      {}", dash(t.urgency.as_ref())),
        format!("Assigned to:  {}", t.assigned_to.as_deref().unwrap_or("-")),
        format!("Admin area:   {}", t.admin2.as_deref().unwrap_or("-")),
        format!("Household:    {}", t.household_code.as_deref().unwrap_or("-")),
        format!("Created:      {}", dash(t.created_at.as_ref())),
        format!("Updated:      {}", dash(t.updated_at.as_ref())),
    ]
    .join("\n")
}

// ── Filter construction ─────────────────────────────────────────────

/// Stage every provided flag on a draft against the ticket schema, then
/// publish once. The applied snapshot is what the fetch reads.
fn filter_state(args: &GrievanceListArgs) -> Result<FilterState, CliError> {
    let mut store = FilterStore::new(GrievanceTicket::filter_schema());

    if let Some(search) = &args.search {
        store.edit("search", FilterValue::text(search.clone()))?;
    }
    if !args.status.is_empty() {
        store.edit("status", FilterValue::multi(args.status.clone()))?;
    }
    if !args.category.is_empty() {
        store.edit("category", FilterValue::multi(args.category.clone()))?;
    }
    if !args.admin2.is_empty() {
        store.edit("admin2", FilterValue::multi(args.admin2.clone()))?;
    }
    if args.priority_min.is_some() || args.priority_max.is_some() {
        store.edit(
            "priority",
            FilterValue::NumberRange {
                min: args.priority_min,
                max: args.priority_max,
            },
        )?;
    }
    let from = parse_date_opt("created-from", args.created_from.as_deref())?;
    let to = parse_date_opt("created-to", args.created_to.as_deref())?;
    if from.is_some() || to.is_some() {
        store.edit("created", FilterValue::DateRange { from, to })?;
    }
    if let Some(user) = &args.assigned_to {
        store.edit("assignedTo", FilterValue::text(user.clone()))?;
    }

    store.apply();
    Ok(store.applied().state().clone())
}

// ── Paging ──────────────────────────────────────────────────────────

/// Follow pages after the first until the result set is exhausted.
async fn fetch_remaining(
    session: &Session,
    state: &FilterState,
    first: ListPage<GrievanceTicket>,
    mut page: PageSpec,
    quiet: bool,
) -> Result<Vec<Arc<GrievanceTicket>>, CliError> {
    let total_pages = page.page_count(first.total);
    let bar = page_progress(total_pages, quiet);
    bar.set_position(u64::from(page.page));

    let mut rows = first.rows;
    while page.page < total_pages {
        page.page += 1;
        let next = session.fetch_grievances(state, &page).await?;
        if next.rows.is_empty() {
            // The result set shrank while we were walking it.
            break;
        }
        rows.extend(next.rows);
        bar.set_position(u64::from(page.page));
    }
    bar.finish_and_clear();
    Ok(rows)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    session: &Session,
    args: GrievancesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        GrievancesCommand::List(list) => {
            let state = filter_state(&list)?;
            let page = page_spec(&list.paging, session.config().page_size);

            if list.paging.link {
                let url = session.view_link(
                    GrievanceTicket::VIEW_PATH,
                    &GrievanceTicket::filter_schema(),
                    &state,
                    &page,
                );
                output::print_output(url.as_str(), global.quiet);
                return Ok(());
            }

            session.connect().await?;
            let first = session.fetch_grievances(&state, &page).await?;
            let rows = if list.paging.all {
                fetch_remaining(session, &state, first, page, global.quiet).await?
            } else {
                first.rows
            };

            let out = output::render_list(
                &global.output,
                &rows,
                |t| TicketRow::from(t),
                |t| t.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        GrievancesCommand::Get { id } => {
            session.connect().await?;
            let ticket = session.get_grievance(&id).await?;
            let out = output::render_single(&global.output, &ticket, detail, |t| t.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
