//! Grievance-ticket registry: columns, sort cycle, and detail layout.

use ratatui::layout::Constraint;

use caseflow_core::GrievanceTicket;

use crate::action::Action;
use crate::fmt;
use crate::screens::browse::{Column, TableSpec};

pub fn spec() -> TableSpec<GrievanceTicket> {
    TableSpec {
        view_path: GrievanceTicket::VIEW_PATH,
        columns: vec![
            Column { header: "Code", width: Constraint::Length(14), cell: |t| t.code.clone() },
            Column {
                header: "Status",
                width: Constraint::Length(13),
                cell: |t| fmt::opt_display(t.status.as_ref()),
            },
            Column {
                header: "Category",
                width: Constraint::Length(21),
                cell: |t| fmt::opt_display(t.category.as_ref()),
            },
            Column {
                header: "Pri",
                width: Constraint::Length(4),
                cell: |t| fmt::opt_display(t.priority.as_ref()),
            },
            Column {
                header: "Assignee",
                width: Constraint::Min(14),
                cell: |t| fmt::opt_str(t.assigned_to.as_deref()),
            },
            Column {
                header: "Updated",
                width: Constraint::Length(10),
                cell: |t| fmt::ago(t.updated_at.as_ref()),
            },
        ],
        orderings: vec![
            ("default", None),
            ("newest", Some("-created_at")),
            ("oldest", Some("created_at")),
            ("priority", Some("-priority")),
        ],
        state_from: |action| match action {
            Action::GrievancesState(state) => Some(state),
            _ => None,
        },
        detail: |t| {
            vec![
                ("ID", t.id.to_string()),
                ("Code", t.code.clone()),
                ("Status", fmt::opt_display(t.status.as_ref())),
                ("Category", fmt::opt_display(t.category.as_ref())),
                ("Priority", fmt::opt_display(t.priority.as_ref())),
                ("Urgency", fmt::opt_display(t.urgency.as_ref())),
                ("Assigned to", fmt::opt_str(t.assigned_to.as_deref())),
                ("Admin area", fmt::opt_str(t.admin2.as_deref())),
                ("Household", fmt::opt_str(t.household_code.as_deref())),
                ("Created", fmt::datetime(t.created_at.as_ref())),
                ("Updated", fmt::datetime(t.updated_at.as_ref())),
            ]
        },
    }
}
