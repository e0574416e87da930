//! Household command handlers.

use std::sync::Arc;

use tabled::Tabled;

use caseflow_core::{FilterState, FilterStore, FilterValue, Household, ListPage, PageSpec, Session};

use crate::cli::{GlobalOpts, HouseholdListArgs, HouseholdsArgs, HouseholdsCommand};
use crate::error::CliError;
use crate::output;

use super::{dash, page_progress, page_spec, parse_date_opt, require_program};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HouseholdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Head of household")]
    head: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Admin area")]
    admin2: String,
    #[tabled(rename = "Residence")]
    residence: String,
    #[tabled(rename = "Registered")]
    registered: String,
}

impl From<&Arc<Household>> for HouseholdRow {
    fn from(h: &Arc<Household>) -> Self {
        Self {
            id: h.id.to_string(),
            code: h.code.clone(),
            head: h.head_of_household.clone().unwrap_or_default(),
            size: h.size.map(|s| s.to_string()).unwrap_or_default(),
            admin2: h.admin2.clone().unwrap_or_default(),
            residence: h
                .residence_status
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            registered: h
                .registration_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }
}

fn detail(h: &Household) -> String {
    [
        format!("ID:          {}", h.id),
        format!("Code:        {}", h.code),
        format!("Head:        {}", h.head_of_household.as_deref().unwrap_or("-")),
        format!("Size:        {}", dash(h.size.as_ref())),
        format!("Admin 1:     {}", h.admin1.as_deref().unwrap_or("-")),
        format!("Admin 2:     {}", h.admin2.as_deref().unwrap_or("-")),
        format!("Residence:   {}", dash(h.residence_status.as_ref())),
        format!("Status:      {}", h.status.as_deref().unwrap_or("-")),
        format!("Registered:  {}", dash(h.registration_date.as_ref())),
    ]
    .join("\n")
}

// ── Filter construction ─────────────────────────────────────────────

fn filter_state(args: &HouseholdListArgs) -> Result<FilterState, CliError> {
    let mut store = FilterStore::new(Household::filter_schema());

    if let Some(search) = &args.search {
        store.edit("search", FilterValue::text(search.clone()))?;
    }
    if !args.residence_status.is_empty() {
        store.edit(
            "residenceStatus",
            FilterValue::multi(args.residence_status.clone()),
        )?;
    }
    if !args.admin2.is_empty() {
        store.edit("admin2", FilterValue::multi(args.admin2.clone()))?;
    }
    if args.size_min.is_some() || args.size_max.is_some() {
        store.edit(
            "size",
            FilterValue::NumberRange {
                min: args.size_min,
                max: args.size_max,
            },
        )?;
    }
    let from = parse_date_opt("registered-from", args.registered_from.as_deref())?;
    let to = parse_date_opt("registered-to", args.registered_to.as_deref())?;
    if from.is_some() || to.is_some() {
        store.edit("registrationDate", FilterValue::DateRange { from, to })?;
    }

    store.apply();
    Ok(store.applied().state().clone())
}

// ── Paging ──────────────────────────────────────────────────────────

async fn fetch_remaining(
    session: &Session,
    state: &FilterState,
    first: ListPage<Household>,
    mut page: PageSpec,
    quiet: bool,
) -> Result<Vec<Arc<Household>>, CliError> {
    let total_pages = page.page_count(first.total);
    let bar = page_progress(total_pages, quiet);
    bar.set_position(u64::from(page.page));

    let mut rows = first.rows;
    while page.page < total_pages {
        page.page += 1;
        let next = session.fetch_households(state, &page).await?;
        if next.rows.is_empty() {
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
    args: HouseholdsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        HouseholdsCommand::List(list) => {
            let state = filter_state(&list)?;
            let page = page_spec(&list.paging, session.config().page_size);

            if list.paging.link {
                let url = session.view_link(
                    Household::VIEW_PATH,
                    &Household::filter_schema(),
                    &state,
                    &page,
                );
                output::print_output(url.as_str(), global.quiet);
                return Ok(());
            }

            require_program(session)?;
            session.connect().await?;
            let first = session.fetch_households(&state, &page).await?;
            let rows = if list.paging.all {
                fetch_remaining(session, &state, first, page, global.quiet).await?
            } else {
                first.rows
            };

            let out = output::render_list(
                &global.output,
                &rows,
                |h| HouseholdRow::from(h),
                |h| h.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HouseholdsCommand::Get { id } => {
            require_program(session)?;
            session.connect().await?;
            let household = session.get_household(&id).await?;
            let out =
                output::render_single(&global.output, &household, detail, |h| h.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
