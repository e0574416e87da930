// ── Grievance ticket domain types ──

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::entity_id::EntityId;
use crate::filter::{FieldSpec, FilterSchema};

/// Ticket workflow status.
///
/// Parses the server's UPPER_SNAKE vocabulary; displays a human label.
/// Values outside the vocabulary are preserved verbatim in `Other` so a
/// server ahead of this client still renders something truthful.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum TicketStatus {
    #[strum(serialize = "NEW", to_string = "New")]
    New,
    #[strum(serialize = "ASSIGNED", to_string = "Assigned")]
    Assigned,
    #[strum(serialize = "IN_PROGRESS", to_string = "In Progress")]
    InProgress,
    #[strum(serialize = "ON_HOLD", to_string = "On Hold")]
    OnHold,
    #[strum(serialize = "FOR_APPROVAL", to_string = "For Approval")]
    ForApproval,
    #[strum(serialize = "CLOSED", to_string = "Closed")]
    Closed,
    #[strum(default)]
    Other(String),
}

impl TicketStatus {
    /// Wire vocabulary in workflow order. Feeds the filter schema.
    pub const CHOICES: [&'static str; 6] = [
        "NEW",
        "ASSIGNED",
        "IN_PROGRESS",
        "ON_HOLD",
        "FOR_APPROVAL",
        "CLOSED",
    ];

    /// Parse a raw server value, keeping unknown values verbatim.
    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }

    /// The server's wire form of this value.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::Assigned => "ASSIGNED",
            Self::InProgress => "IN_PROGRESS",
            Self::OnHold => "ON_HOLD",
            Self::ForApproval => "FOR_APPROVAL",
            Self::Closed => "CLOSED",
            Self::Other(raw) => raw,
        }
    }
}

// Serialized output (JSON/YAML) keeps the wire vocabulary, so scripted
// consumers see the same values the API uses.
impl Serialize for TicketStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// Ticket category (the intake channel taxonomy).
#[derive(Debug, Clone, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum TicketCategory {
    #[strum(serialize = "PAYMENT_VERIFICATION", to_string = "Payment Verification")]
    PaymentVerification,
    #[strum(serialize = "DATA_CHANGE", to_string = "Data Change")]
    DataChange,
    #[strum(serialize = "SENSITIVE_GRIEVANCE", to_string = "Sensitive Grievance")]
    SensitiveGrievance,
    #[strum(serialize = "GRIEVANCE_COMPLAINT", to_string = "Grievance Complaint")]
    GrievanceComplaint,
    #[strum(serialize = "NEGATIVE_FEEDBACK", to_string = "Negative Feedback")]
    NegativeFeedback,
    #[strum(serialize = "REFERRAL", to_string = "Referral")]
    Referral,
    #[strum(serialize = "POSITIVE_FEEDBACK", to_string = "Positive Feedback")]
    PositiveFeedback,
    #[strum(serialize = "NEEDS_ADJUDICATION", to_string = "Needs Adjudication")]
    NeedsAdjudication,
    #[strum(serialize = "SYSTEM_FLAGGING", to_string = "System Flagging")]
    SystemFlagging,
    #[strum(default)]
    Other(String),
}

impl TicketCategory {
    pub const CHOICES: [&'static str; 9] = [
        "PAYMENT_VERIFICATION",
        "DATA_CHANGE",
        "SENSITIVE_GRIEVANCE",
        "GRIEVANCE_COMPLAINT",
        "NEGATIVE_FEEDBACK",
        "REFERRAL",
        "POSITIVE_FEEDBACK",
        "NEEDS_ADJUDICATION",
        "SYSTEM_FLAGGING",
    ];

    pub fn from_raw(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| Self::Other(raw.to_owned()))
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Self::PaymentVerification => "PAYMENT_VERIFICATION",
            Self::DataChange => "DATA_CHANGE",
            Self::SensitiveGrievance => "SENSITIVE_GRIEVANCE",
            Self::GrievanceComplaint => "GRIEVANCE_COMPLAINT",
            Self::NegativeFeedback => "NEGATIVE_FEEDBACK",
            Self::Referral => "REFERRAL",
            Self::PositiveFeedback => "POSITIVE_FEEDBACK",
            Self::NeedsAdjudication => "NEEDS_ADJUDICATION",
            Self::SystemFlagging => "SYSTEM_FLAGGING",
            Self::Other(raw) => raw,
        }
    }
}

impl Serialize for TicketCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

/// A grievance ticket as listed in the registry.
#[derive(Debug, Clone, Serialize)]
pub struct GrievanceTicket {
    pub id: EntityId,
    pub code: String,
    pub category: Option<TicketCategory>,
    pub status: Option<TicketStatus>,
    /// 1 = high … 3 = low, per the platform's scale.
    pub priority: Option<u8>,
    pub urgency: Option<u8>,
    pub assigned_to: Option<String>,
    pub admin2: Option<String>,
    pub household_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl GrievanceTicket {
    /// REST collection segment. Program-scoped or BA-wide.
    pub const RESOURCE: &'static str = "grievance-tickets";

    /// List-page path in the web app, for share links.
    pub const VIEW_PATH: &'static str = "grievance/tickets";

    /// Canonical filter schema for the ticket registry.
    pub fn filter_schema() -> FilterSchema {
        FilterSchema::new(vec![
            FieldSpec::text("search", "Search"),
            FieldSpec::multi("status", "Status", &TicketStatus::CHOICES),
            FieldSpec::multi("category", "Category", &TicketCategory::CHOICES),
            FieldSpec::multi("admin2", "Admin area", &[]),
            FieldSpec::number_range("priority", "Priority"),
            FieldSpec::date_range("created", "Created"),
            FieldSpec::text("assignedTo", "Assigned to"),
        ])
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn every_status_choice_parses_to_a_known_variant() {
        for raw in TicketStatus::CHOICES {
            let status = TicketStatus::from_raw(raw);
            assert!(
                !matches!(status, TicketStatus::Other(_)),
                "{raw} fell through to Other"
            );
        }
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status = TicketStatus::from_raw("ESCALATED");
        assert_eq!(status, TicketStatus::Other("ESCALATED".into()));
        assert_eq!(status.to_string(), "ESCALATED");
    }

    #[test]
    fn status_displays_human_label() {
        assert_eq!(TicketStatus::from_raw("IN_PROGRESS").to_string(), "In Progress");
        assert_eq!(TicketStatus::from_raw("FOR_APPROVAL").to_string(), "For Approval");
    }

    #[test]
    fn wire_form_round_trips_every_choice() {
        for raw in TicketStatus::CHOICES {
            assert_eq!(TicketStatus::from_raw(raw).as_wire(), raw);
        }
        for raw in TicketCategory::CHOICES {
            assert_eq!(TicketCategory::from_raw(raw).as_wire(), raw);
        }
    }

    #[test]
    fn status_serializes_as_wire_form() {
        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let json = serde_json::to_string(&TicketStatus::Other("ESCALATED".into())).unwrap();
        assert_eq!(json, "\"ESCALATED\"");
    }

    #[test]
    fn category_vocabulary_is_closed_over_choices() {
        for raw in TicketCategory::CHOICES {
            assert!(!matches!(
                TicketCategory::from_raw(raw),
                TicketCategory::Other(_)
            ));
        }
    }

    #[test]
    fn schema_fields_match_server_vocabulary() {
        let schema = GrievanceTicket::filter_schema();
        let names: Vec<&str> = schema.fields().map(FieldSpec::name).collect();
        assert_eq!(
            names,
            vec!["search", "status", "category", "admin2", "priority", "created", "assignedTo"]
        );
    }
}
