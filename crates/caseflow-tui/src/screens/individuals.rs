//! Individual registry: columns, sort cycle, and detail layout.

use ratatui::layout::Constraint;

use caseflow_core::Individual;

use crate::action::Action;
use crate::fmt;
use crate::screens::browse::{Column, TableSpec};

pub fn spec() -> TableSpec<Individual> {
    TableSpec {
        view_path: Individual::VIEW_PATH,
        columns: vec![
            Column { header: "Code", width: Constraint::Length(12), cell: |i| i.code.clone() },
            Column {
                header: "Full name",
                width: Constraint::Min(18),
                cell: |i| i.full_name.clone(),
            },
            Column {
                header: "Sex",
                width: Constraint::Length(7),
                cell: |i| fmt::opt_display(i.sex.as_ref()),
            },
            Column {
                header: "Born",
                width: Constraint::Length(11),
                cell: |i| fmt::date(i.birth_date.as_ref()),
            },
            Column {
                header: "Relationship",
                width: Constraint::Length(14),
                cell: |i| fmt::opt_str(i.relationship.as_deref()),
            },
            Column {
                header: "Household",
                width: Constraint::Length(12),
                cell: |i| fmt::opt_str(i.household_code.as_deref()),
            },
        ],
        orderings: vec![
            ("default", None),
            ("name", Some("full_name")),
            ("youngest", Some("-birth_date")),
            ("oldest", Some("birth_date")),
        ],
        state_from: |action| match action {
            Action::IndividualsState(state) => Some(state),
            _ => None,
        },
        detail: |i| {
            vec![
                ("ID", i.id.to_string()),
                ("Code", i.code.clone()),
                ("Full name", i.full_name.clone()),
                ("Sex", fmt::opt_display(i.sex.as_ref())),
                ("Born", fmt::date(i.birth_date.as_ref())),
                ("Relationship", fmt::opt_str(i.relationship.as_deref())),
                ("Phone", fmt::opt_str(i.phone.as_deref())),
                ("Household", fmt::opt_str(i.household_code.as_deref())),
            ]
        },
    }
}
