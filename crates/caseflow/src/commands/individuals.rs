//! Individual command handlers.

use std::sync::Arc;

use tabled::Tabled;

use caseflow_core::{
    FilterState, FilterStore, FilterValue, Individual, ListPage, PageSpec, Session,
};

use crate::cli::{GlobalOpts, IndividualListArgs, IndividualsArgs, IndividualsCommand};
use crate::error::CliError;
use crate::output;

use super::{dash, page_progress, page_spec, require_program};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct IndividualRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Full name")]
    name: String,
    #[tabled(rename = "Sex")]
    sex: String,
    #[tabled(rename = "Born")]
    born: String,
    #[tabled(rename = "Relationship")]
    relationship: String,
    #[tabled(rename = "Household")]
    household: String,
}

impl From<&Arc<Individual>> for IndividualRow {
    fn from(i: &Arc<Individual>) -> Self {
        Self {
            id: i.id.to_string(),
            code: i.code.clone(),
            name: i.full_name.clone(),
            sex: i.sex.as_ref().map(ToString::to_string).unwrap_or_default(),
            born: i.birth_date.map(|d| d.to_string()).unwrap_or_default(),
            relationship: i.relationship.clone().unwrap_or_default(),
            household: i.household_code.clone().unwrap_or_default(),
        }
    }
}

fn detail(i: &Individual) -> String {
    [
        format!("ID:            {}", i.id),
        format!("Code:          {}", i.code),
        format!("Full name:     {}", i.full_name),
        format!("Sex:           {}", dash(i.sex.as_ref())),
        format!("Born:          {}", dash(i.birth_date.as_ref())),
        format!("Relationship:  {}", i.relationship.as_deref().unwrap_or("-")),
        format!("Phone:         {}", i.phone.as_deref().unwrap_or("-")),
        format!("Household:     {}", i.household_code.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

// ── Filter construction ─────────────────────────────────────────────

fn filter_state(args: &IndividualListArgs) -> Result<FilterState, CliError> {
    let mut store = FilterStore::new(Individual::filter_schema());

    if let Some(search) = &args.search {
        store.edit("search", FilterValue::text(search.clone()))?;
    }
    if !args.sex.is_empty() {
        store.edit("sex", FilterValue::multi(args.sex.clone()))?;
    }
    if args.age_min.is_some() || args.age_max.is_some() {
        store.edit(
            "age",
            FilterValue::NumberRange {
                min: args.age_min,
                max: args.age_max,
            },
        )?;
    }
    if !args.admin2.is_empty() {
        store.edit("admin2", FilterValue::multi(args.admin2.clone()))?;
    }

    store.apply();
    Ok(store.applied().state().clone())
}

// ── Paging ──────────────────────────────────────────────────────────

async fn fetch_remaining(
    session: &Session,
    state: &FilterState,
    first: ListPage<Individual>,
    mut page: PageSpec,
    quiet: bool,
) -> Result<Vec<Arc<Individual>>, CliError> {
    let total_pages = page.page_count(first.total);
    let bar = page_progress(total_pages, quiet);
    bar.set_position(u64::from(page.page));

    let mut rows = first.rows;
    while page.page < total_pages {
        page.page += 1;
        let next = session.fetch_individuals(state, &page).await?;
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
    args: IndividualsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        IndividualsCommand::List(list) => {
            let state = filter_state(&list)?;
            let page = page_spec(&list.paging, session.config().page_size);

            if list.paging.link {
                let url = session.view_link(
                    Individual::VIEW_PATH,
                    &Individual::filter_schema(),
                    &state,
                    &page,
                );
                output::print_output(url.as_str(), global.quiet);
                return Ok(());
            }

            require_program(session)?;
            session.connect().await?;
            let first = session.fetch_individuals(&state, &page).await?;
            let rows = if list.paging.all {
                fetch_remaining(session, &state, first, page, global.quiet).await?
            } else {
                first.rows
            };

            let out = output::render_list(
                &global.output,
                &rows,
                |i| IndividualRow::from(i),
                |i| i.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IndividualsCommand::Get { id } => {
            require_program(session)?;
            session.connect().await?;
            let individual = session.get_individual(&id).await?;
            let out =
                output::render_single(&global.output, &individual, detail, |i| i.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
