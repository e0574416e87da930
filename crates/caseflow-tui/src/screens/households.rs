//! Household registry: columns, sort cycle, and detail layout.

use ratatui::layout::Constraint;

use caseflow_core::Household;

use crate::action::Action;
use crate::fmt;
use crate::screens::browse::{Column, TableSpec};

pub fn spec() -> TableSpec<Household> {
    TableSpec {
        view_path: Household::VIEW_PATH,
        columns: vec![
            Column { header: "Code", width: Constraint::Length(12), cell: |h| h.code.clone() },
            Column {
                header: "Head of household",
                width: Constraint::Min(18),
                cell: |h| fmt::opt_str(h.head_of_household.as_deref()),
            },
            Column {
                header: "Size",
                width: Constraint::Length(5),
                cell: |h| fmt::opt_display(h.size.as_ref()),
            },
            Column {
                header: "Admin 2",
                width: Constraint::Length(14),
                cell: |h| fmt::opt_str(h.admin2.as_deref()),
            },
            Column {
                header: "Residence",
                width: Constraint::Length(14),
                cell: |h| fmt::opt_display(h.residence_status.as_ref()),
            },
            Column {
                header: "Registered",
                width: Constraint::Length(11),
                cell: |h| fmt::date(h.registration_date.as_ref()),
            },
        ],
        orderings: vec![
            ("default", None),
            ("largest", Some("-size")),
            ("smallest", Some("size")),
            ("newest", Some("-registration_date")),
        ],
        state_from: |action| match action {
            Action::HouseholdsState(state) => Some(state),
            _ => None,
        },
        detail: |h| {
            vec![
                ("ID", h.id.to_string()),
                ("Code", h.code.clone()),
                ("Head of household", fmt::opt_str(h.head_of_household.as_deref())),
                ("Size", fmt::opt_display(h.size.as_ref())),
                ("Admin 1", fmt::opt_str(h.admin1.as_deref())),
                ("Admin 2", fmt::opt_str(h.admin2.as_deref())),
                ("Residence", fmt::opt_display(h.residence_status.as_ref())),
                ("Status", fmt::opt_str(h.status.as_deref())),
                ("Registered", fmt::date(h.registration_date.as_ref())),
            ]
        },
    }
}
