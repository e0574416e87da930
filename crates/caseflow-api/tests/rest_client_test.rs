#![allow(clippy::unwrap_used)]
// Integration tests for `RestClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use caseflow_api::types::{GrievanceTicketDto, HouseholdDto};
use caseflow_api::{Error, Paged, RestClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RestClient) {
    let server = MockServer::start().await;
    let client = RestClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn pair(k: &str, v: &str) -> (String, String) {
    (k.to_owned(), v.to_owned())
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_grievance_tickets_with_filter_params() {
    let (server, client) = setup().await;

    let id_a = Uuid::new_v4();
    let id_b = Uuid::new_v4();

    let body = json!({
        "count": 2,
        "next": null,
        "previous": null,
        "results": [
            {
                "id": id_a,
                "code": "GRV-0001",
                "category": "DATA_CHANGE",
                "status": "IN_PROGRESS",
                "priority": 2,
                "urgency": 1,
                "assignedTo": "A. Mwangi",
                "admin2": "Dadaab",
                "createdAt": "2024-03-01T09:30:00Z"
            },
            {
                "id": id_b,
                "code": "GRV-0002",
                "category": "PAYMENT",
                "status": "NEW",
                "admin2": "Kakuma"
            },
        ]
    });

    Mock::given(method("GET"))
        .and(path(
            "/api/rest/business-areas/kenya/programs/cash-2024/grievance-tickets/",
        ))
        .and(query_param("status", "NEW,IN_PROGRESS"))
        .and(query_param("admin2", "Dadaab,Kakuma"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let params = vec![
        pair("status", "NEW,IN_PROGRESS"),
        pair("admin2", "Dadaab,Kakuma"),
        pair("page", "1"),
    ];
    let page: Paged<GrievanceTicketDto> = client
        .list_grievance_tickets("kenya", Some("cash-2024"), &params)
        .await
        .unwrap();

    assert_eq!(page.count, 2);
    assert_eq!(page.results.len(), 2);
    assert_eq!(page.results[0].code, "GRV-0001");
    assert_eq!(page.results[0].assigned_to.as_deref(), Some("A. Mwangi"));
    assert_eq!(page.results[1].status.as_deref(), Some("NEW"));
    assert!(page.results[1].created_at.is_none());
}

#[tokio::test]
async fn test_list_grievance_tickets_business_area_wide() {
    let (server, client) = setup().await;

    let body = json!({
        "count": 0,
        "next": null,
        "previous": null,
        "results": []
    });

    Mock::given(method("GET"))
        .and(path("/api/rest/business-areas/kenya/grievance-tickets/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let page = client
        .list_grievance_tickets("kenya", None, &[])
        .await
        .unwrap();

    assert_eq!(page.count, 0);
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_get_household() {
    let (server, client) = setup().await;

    let hh_id = Uuid::new_v4();

    let body = json!({
        "id": hh_id,
        "code": "HH-23-0104.7712",
        "headOfHousehold": "Fatuma Hussein",
        "size": 6,
        "admin1": "Garissa",
        "admin2": "Dadaab",
        "residenceStatus": "REFUGEE",
        "status": "ACTIVE",
        "registrationDate": "2023-11-04"
    });

    Mock::given(method("GET"))
        .and(path(format!(
            "/api/rest/business-areas/kenya/programs/cash-2024/households/{hh_id}/"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let hh: HouseholdDto = client
        .get_household("kenya", "cash-2024", &hh_id.to_string())
        .await
        .unwrap();

    assert_eq!(hh.id, hh_id);
    assert_eq!(hh.code, "HH-23-0104.7712");
    assert_eq!(hh.head_of_household.as_deref(), Some("Fatuma Hussein"));
    assert_eq!(hh.size, Some(6));
    assert_eq!(hh.residence_status.as_deref(), Some("REFUGEE"));
}

#[tokio::test]
async fn test_token_installed_as_default_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest/info/"))
        .and(header("authorization", "Token s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "version": "3.2.1" })),
        )
        .mount(&server)
        .await;

    let client = RestClient::from_token(
        &server.uri(),
        &SecretString::from("s3cret"),
        &TransportConfig::default(),
    )
    .unwrap();

    let info = client.server_info().await.unwrap();
    assert_eq!(info.version, "3.2.1");
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.server_info().await;

    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_403_permission_denied() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "detail": "You do not have permission to view grievance tickets"
        })))
        .mount(&server)
        .await;

    let result = client.list_grievance_tickets("kenya", None, &[]).await;

    match result {
        Err(Error::PermissionDenied { ref message }) => {
            assert_eq!(message, "You do not have permission to view grievance tickets");
        }
        other => panic!("expected PermissionDenied, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_404_not_found_classification() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Not found." })))
        .mount(&server)
        .await;

    let err = client
        .get_household("kenya", "cash-2024", "HH-00-0000.0000")
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    match err {
        Error::Server { status, ref message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found.");
        }
        other => panic!("expected Server 404 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_without_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.server_info().await;

    match result {
        Err(Error::Server { status, ref code, .. }) => {
            assert_eq!(status, 500);
            assert!(code.is_none());
        }
        other => panic!("expected Server 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_deserialization_error_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/rest/info/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login page</html>"))
        .mount(&server)
        .await;

    let result = client.server_info().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => {
            assert!(body.contains("login page"));
        }
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
