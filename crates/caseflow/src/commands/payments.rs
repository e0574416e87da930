//! Payment plan command handlers.

use std::sync::Arc;

use tabled::Tabled;

use caseflow_core::{
    FilterState, FilterStore, FilterValue, ListPage, PageSpec, PaymentPlan, Session,
};

use crate::cli::{GlobalOpts, PaymentListArgs, PaymentsArgs, PaymentsCommand};
use crate::error::CliError;
use crate::output;

use super::{dash, page_progress, page_spec, parse_date_opt, require_program};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Entitled")]
    entitled: String,
    #[tabled(rename = "Dispersion")]
    dispersion: String,
}

impl From<&Arc<PaymentPlan>> for PlanRow {
    fn from(p: &Arc<PaymentPlan>) -> Self {
        Self {
            id: p.id.to_string(),
            code: p.code.clone(),
            name: p.name.clone().unwrap_or_default(),
            status: p.status.as_ref().map(ToString::to_string).unwrap_or_default(),
            entitled: format_amount(p),
            dispersion: format_window(p),
        }
    }
}

/// "12500.00 KES" or "" when the server sent no amount.
fn format_amount(p: &PaymentPlan) -> String {
    match (p.total_entitled, p.currency.as_deref()) {
        (Some(amount), Some(currency)) => format!("{amount:.2} {currency}"),
        (Some(amount), None) => format!("{amount:.2}"),
        (None, _) => String::new(),
    }
}

/// "2024-01-01 → 2024-03-31", either side optional.
fn format_window(p: &PaymentPlan) -> String {
    match (p.dispersion_start, p.dispersion_end) {
        (None, None) => String::new(),
        (start, end) => format!(
            "{} → {}",
            start.map(|d| d.to_string()).unwrap_or_default(),
            end.map(|d| d.to_string()).unwrap_or_default(),
        ),
    }
}

fn detail(p: &PaymentPlan) -> String {
    [
        format!("ID:                {}", p.id),
        format!("Code:              {}", p.code),
        format!("Name:              {}", p.name.as_deref().unwrap_or("-")),
        format!("Status:            {}", dash(p.status.as_ref())),
        format!("Currency:          {}", p.currency.as_deref().unwrap_or("-")),
        format!("Total entitled:    {}", dash(p.total_entitled.as_ref())),
        format!("Dispersion start:  {}", dash(p.dispersion_start.as_ref())),
        format!("Dispersion end:    {}", dash(p.dispersion_end.as_ref())),
        format!("Follow-up plan:    {}", p.is_follow_up),
    ]
    .join("\n")
}

// ── Filter construction ─────────────────────────────────────────────

fn filter_state(args: &PaymentListArgs) -> Result<FilterState, CliError> {
    let mut store = FilterStore::new(PaymentPlan::filter_schema());

    if let Some(search) = &args.search {
        store.edit("search", FilterValue::text(search.clone()))?;
    }
    if !args.status.is_empty() {
        store.edit("status", FilterValue::multi(args.status.clone()))?;
    }
    if args.entitled_min.is_some() || args.entitled_max.is_some() {
        store.edit(
            "totalEntitled",
            FilterValue::NumberRange {
                min: args.entitled_min,
                max: args.entitled_max,
            },
        )?;
    }
    let start_from = parse_date_opt("start-from", args.start_from.as_deref())?;
    let start_to = parse_date_opt("start-to", args.start_to.as_deref())?;
    if start_from.is_some() || start_to.is_some() {
        store.edit(
            "dispersionStart",
            FilterValue::DateRange {
                from: start_from,
                to: start_to,
            },
        )?;
    }
    let end_from = parse_date_opt("end-from", args.end_from.as_deref())?;
    let end_to = parse_date_opt("end-to", args.end_to.as_deref())?;
    if end_from.is_some() || end_to.is_some() {
        store.edit(
            "dispersionEnd",
            FilterValue::DateRange {
                from: end_from,
                to: end_to,
            },
        )?;
    }

    store.apply();
    Ok(store.applied().state().clone())
}

// ── Paging ──────────────────────────────────────────────────────────

async fn fetch_remaining(
    session: &Session,
    state: &FilterState,
    first: ListPage<PaymentPlan>,
    mut page: PageSpec,
    quiet: bool,
) -> Result<Vec<Arc<PaymentPlan>>, CliError> {
    let total_pages = page.page_count(first.total);
    let bar = page_progress(total_pages, quiet);
    bar.set_position(u64::from(page.page));

    let mut rows = first.rows;
    while page.page < total_pages {
        page.page += 1;
        let next = session.fetch_payment_plans(state, &page).await?;
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
    args: PaymentsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PaymentsCommand::List(list) => {
            let state = filter_state(&list)?;
            let page = page_spec(&list.paging, session.config().page_size);

            if list.paging.link {
                let url = session.view_link(
                    PaymentPlan::VIEW_PATH,
                    &PaymentPlan::filter_schema(),
                    &state,
                    &page,
                );
                output::print_output(url.as_str(), global.quiet);
                return Ok(());
            }

            require_program(session)?;
            session.connect().await?;
            let first = session.fetch_payment_plans(&state, &page).await?;
            let rows = if list.paging.all {
                fetch_remaining(session, &state, first, page, global.quiet).await?
            } else {
                first.rows
            };

            let out = output::render_list(
                &global.output,
                &rows,
                |p| PlanRow::from(p),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PaymentsCommand::Get { id } => {
            require_program(session)?;
            session.connect().await?;
            let plan = session.get_payment_plan(&id).await?;
            let out = output::render_single(&global.output, &plan, detail, |p| p.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
