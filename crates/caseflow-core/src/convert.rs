// ── API-to-domain type conversions ──
//
// Bridges the raw `caseflow_api` wire types into canonical
// `caseflow_core::model` domain types. Each `From` impl parses enum
// strings into their closed vocabularies (unknown values kept verbatim)
// and renames wire fields to domain names.

use caseflow_api::types::{GrievanceTicketDto, HouseholdDto, IndividualDto, PaymentPlanDto};

use crate::model::{
    EntityId, GrievanceTicket, Household, Individual, PaymentPlan,
    grievance::{TicketCategory, TicketStatus},
    household::ResidenceStatus,
    individual::Sex,
    payment::PlanStatus,
};

impl From<HouseholdDto> for Household {
    fn from(dto: HouseholdDto) -> Self {
        Self {
            id: EntityId::from(dto.id),
            code: dto.code,
            head_of_household: dto.head_of_household,
            size: dto.size,
            admin1: dto.admin1,
            admin2: dto.admin2,
            residence_status: dto.residence_status.as_deref().map(ResidenceStatus::from_raw),
            status: dto.status,
            registration_date: dto.registration_date,
        }
    }
}

impl From<IndividualDto> for Individual {
    fn from(dto: IndividualDto) -> Self {
        Self {
            id: EntityId::from(dto.id),
            code: dto.code,
            full_name: dto.full_name,
            sex: dto.sex.as_deref().map(Sex::from_raw),
            birth_date: dto.birth_date,
            relationship: dto.relationship,
            phone: dto.phone_no,
            household_code: dto.household_code,
        }
    }
}

impl From<GrievanceTicketDto> for GrievanceTicket {
    fn from(dto: GrievanceTicketDto) -> Self {
        Self {
            id: EntityId::from(dto.id),
            code: dto.code,
            category: dto.category.as_deref().map(TicketCategory::from_raw),
            status: dto.status.as_deref().map(TicketStatus::from_raw),
            priority: dto.priority,
            urgency: dto.urgency,
            assigned_to: dto.assigned_to,
            admin2: dto.admin2,
            household_code: dto.household_code,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        }
    }
}

impl From<PaymentPlanDto> for PaymentPlan {
    fn from(dto: PaymentPlanDto) -> Self {
        Self {
            id: EntityId::from(dto.id),
            code: dto.code,
            name: dto.name,
            status: dto.status.as_deref().map(PlanStatus::from_raw),
            currency: dto.currency,
            total_entitled: dto.total_entitled_quantity,
            dispersion_start: dto.dispersion_start_date,
            dispersion_end: dto.dispersion_end_date,
            is_follow_up: dto.is_follow_up,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn grievance_dto_converts_with_known_enums() {
        let dto = GrievanceTicketDto {
            id: Uuid::new_v4(),
            code: "GRV-0042-23".into(),
            category: Some("DATA_CHANGE".into()),
            status: Some("IN_PROGRESS".into()),
            priority: Some(1),
            urgency: Some(2),
            assigned_to: Some("A. Wanjiku".into()),
            admin2: Some("Dadaab".into()),
            household_code: Some("HH-23-0104.7712".into()),
            created_at: None,
            updated_at: None,
        };

        let ticket = GrievanceTicket::from(dto);
        assert_eq!(ticket.status, Some(TicketStatus::InProgress));
        assert_eq!(ticket.category, Some(TicketCategory::DataChange));
        assert!(ticket.id.as_uuid().is_some());
    }

    #[test]
    fn unknown_enum_values_survive_conversion() {
        let dto = HouseholdDto {
            id: Uuid::new_v4(),
            code: "HH-23-0104.7712".into(),
            head_of_household: None,
            size: Some(6),
            admin1: None,
            admin2: None,
            residence_status: Some("STATELESS".into()),
            status: None,
            registration_date: None,
        };

        let household = Household::from(dto);
        assert_eq!(
            household.residence_status,
            Some(ResidenceStatus::Other("STATELESS".into()))
        );
    }
}
