//! End-to-end incident flows against a mock Graph endpoint.

use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use msgraph_security::auth::TokenProvider;
use msgraph_security::client::GraphClient;
use msgraph_security::incidents::{self, IncidentStatus, UpdateIncidentRequest};
use msgraph_security::odata::ODataQuery;

fn mock_client(server: &MockServer) -> GraphClient {
    let tp = TokenProvider::with_token("mock-token");
    GraphClient::with_base_url(tp, &format!("{}/", server.uri())).unwrap()
}

#[tokio::test]
async fn list_incidents_with_filter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/security/incidents"))
        .and(query_param("$filter", "status eq 'active'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {
                    "id": "2972395",
                    "displayName": "Multi-stage incident",
                    "status": "active",
                    "severity": "medium",
                    "systemTags": ["Defender Experts"]
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let options = ODataQuery::new().filter("status eq 'active'");
    let incidents = incidents::list_incidents(&client, &options).await.unwrap();

    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0].status, Some(IncidentStatus::Active));
    assert_eq!(incidents[0].system_tags, vec!["Defender Experts"]);
}

#[tokio::test]
async fn get_incident_with_expanded_alerts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/security/incidents/2972395"))
        .and(query_param("$expand", "alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "2972395",
            "displayName": "Multi-stage incident",
            "status": "active",
            "alerts": [
                {"id": "da123", "severity": "high", "incidentId": "2972395"},
                {"id": "da456", "severity": "medium", "incidentId": "2972395"}
            ]
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let options = ODataQuery::new().expand("alerts");
    let incident = incidents::get_incident(&client, "2972395", &options)
        .await
        .unwrap();

    assert_eq!(incident.alerts.len(), 2);
    assert_eq!(incident.alerts[0].incident_id.as_deref(), Some("2972395"));
}

#[tokio::test]
async fn get_incident_without_options_omits_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/security/incidents/555"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "555",
            "status": "redirected",
            "redirectIncidentId": "556"
        })))
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let incident = incidents::get_incident(&client, "555", &ODataQuery::new())
        .await
        .unwrap();

    assert_eq!(incident.status, Some(IncidentStatus::Redirected));
    assert_eq!(incident.redirect_incident_id.as_deref(), Some("556"));
}

#[tokio::test]
async fn update_incident_resolves_with_comment() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/security/incidents/2972395"))
        .and(body_json(json!({
            "status": "resolved",
            "classification": "truePositive",
            "determination": "multiStagedAttack",
            "resolvingComment": "contained and remediated"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "2972395",
            "status": "resolved",
            "classification": "truePositive",
            "resolvingComment": "contained and remediated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(&server);
    let update = UpdateIncidentRequest {
        status: Some(IncidentStatus::Resolved),
        classification: Some(msgraph_security::alerts::AlertClassification::TruePositive),
        determination: Some(msgraph_security::alerts::AlertDetermination::MultiStagedAttack),
        resolving_comment: Some("contained and remediated".to_string()),
        ..Default::default()
    };
    let incident = incidents::update_incident(&client, "2972395", &update)
        .await
        .unwrap();
    assert_eq!(incident.status, Some(IncidentStatus::Resolved));
}
