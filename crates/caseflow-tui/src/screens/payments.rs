//! Payment-plan registry: columns, sort cycle, and detail layout.

use ratatui::layout::Constraint;

use caseflow_core::PaymentPlan;

use crate::action::Action;
use crate::fmt;
use crate::screens::browse::{Column, TableSpec};

pub fn spec() -> TableSpec<PaymentPlan> {
    TableSpec {
        view_path: PaymentPlan::VIEW_PATH,
        columns: vec![
            Column { header: "Code", width: Constraint::Length(12), cell: |p| p.code.clone() },
            Column {
                header: "Name",
                width: Constraint::Min(18),
                cell: |p| fmt::opt_str(p.name.as_deref()),
            },
            Column {
                header: "Status",
                width: Constraint::Length(12),
                cell: |p| fmt::opt_display(p.status.as_ref()),
            },
            Column {
                header: "Entitled",
                width: Constraint::Length(16),
                cell: |p| fmt::money(p.total_entitled, p.currency.as_deref()),
            },
            Column {
                header: "Start",
                width: Constraint::Length(11),
                cell: |p| fmt::date(p.dispersion_start.as_ref()),
            },
            Column {
                header: "End",
                width: Constraint::Length(11),
                cell: |p| fmt::date(p.dispersion_end.as_ref()),
            },
            Column {
                header: "Follow-up",
                width: Constraint::Length(9),
                cell: |p| if p.is_follow_up { "yes".to_owned() } else { "no".to_owned() },
            },
        ],
        orderings: vec![
            ("default", None),
            ("starts soon", Some("dispersion_start_date")),
            ("starts late", Some("-dispersion_start_date")),
            ("entitled", Some("-total_entitled_quantity")),
        ],
        state_from: |action| match action {
            Action::PaymentPlansState(state) => Some(state),
            _ => None,
        },
        detail: |p| {
            vec![
                ("ID", p.id.to_string()),
                ("Code", p.code.clone()),
                ("Name", fmt::opt_str(p.name.as_deref())),
                ("Status", fmt::opt_display(p.status.as_ref())),
                ("Currency", fmt::opt_str(p.currency.as_deref())),
                ("Total entitled", fmt::money(p.total_entitled, p.currency.as_deref())),
                ("Dispersion start", fmt::date(p.dispersion_start.as_ref())),
                ("Dispersion end", fmt::date(p.dispersion_end.as_ref())),
                ("Follow-up", if p.is_follow_up { "yes".to_owned() } else { "no".to_owned() }),
            ]
        },
    }
}
