//! Alerts from the Microsoft Graph security API (`security/alerts_v2`).
//!
//! Alerts are the per-detection signals raised by Microsoft security
//! providers (Defender for Endpoint, Defender for Office 365, Sentinel, ...).
//! This module models the alert resource, its evolvable enum properties, and
//! the list/get/update/comment operations.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraphClient;
use crate::evidence::AlertEvidence;
use crate::odata::{list_all, Collection, ODataQuery};

// ── Enum properties ──────────────────────────────────────────────────────

/// Alert severity as assigned by the detecting provider.
///
/// Graph marks this enum evolvable: values unknown to this build deserialize
/// as [`AlertSeverity::UnknownFutureValue`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertSeverity {
    Unknown,
    Informational,
    Low,
    Medium,
    High,
    #[serde(other)]
    UnknownFutureValue,
}

/// Lifecycle status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertStatus {
    Unknown,
    New,
    InProgress,
    Resolved,
    #[serde(other)]
    UnknownFutureValue,
}

/// Analyst classification of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertClassification {
    Unknown,
    FalsePositive,
    TruePositive,
    InformationalExpectedActivity,
    #[serde(other)]
    UnknownFutureValue,
}

/// Analyst determination recorded when classifying an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlertDetermination {
    Unknown,
    Apt,
    Malware,
    SecurityPersonnel,
    SecurityTesting,
    UnwantedSoftware,
    MultiStagedAttack,
    CompromisedAccount,
    Phishing,
    MaliciousUserActivity,
    NotMalicious,
    NotEnoughDataToValidate,
    ConfirmedActivity,
    LineOfBusinessApplication,
    Other,
    #[serde(other)]
    UnknownFutureValue,
}

// ── Models ───────────────────────────────────────────────────────────────

/// A comment attached to an alert or incident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertComment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// An alert raised by a Microsoft security provider.
///
/// All properties are optional: Graph omits nulls, and `$select` projections
/// drop everything not asked for. Undeclared properties are preserved in
/// `additional_data` so a deserialize/serialize cycle loses nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_policy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<AlertClassification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<AlertComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detector_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub determination: Option<AlertDetermination>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<AlertEvidence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_activity_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mitre_techniques: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_alert_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_actions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

// ── Request types ────────────────────────────────────────────────────────

/// PATCH body for [`update_alert`]. Only set fields are sent, so a request
/// updating the status leaves the classification untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlertRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AlertStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<AlertClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub determination: Option<AlertDetermination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

/// POST body for [`create_alert_comment`]. Graph requires the `@odata.type`
/// annotation on comment objects.
#[derive(Serialize)]
struct CreateCommentRequest<'a> {
    #[serde(rename = "@odata.type")]
    odata_type: &'static str,
    comment: &'a str,
}

// ── Operations ───────────────────────────────────────────────────────────

/// Lists alerts, fetching every page.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] for 4xx/5xx responses and
/// [`crate::error::GraphError::Network`] on transport failures.
pub async fn list_alerts(
    client: &GraphClient,
    options: &ODataQuery,
) -> crate::error::Result<Vec<Alert>> {
    list_all(client, "security/alerts_v2", options).await
}

/// Fetches a single page of alerts, leaving paging to the caller via the
/// returned collection's `next_link`.
///
/// # Errors
///
/// Same as [`list_alerts`].
pub async fn list_alerts_page(
    client: &GraphClient,
    options: &ODataQuery,
) -> crate::error::Result<Collection<Alert>> {
    client.get_with_options("security/alerts_v2", options).await
}

/// Fetches one alert by id.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] with status 404 when no alert
/// has the given id.
pub async fn get_alert(client: &GraphClient, alert_id: &str) -> crate::error::Result<Alert> {
    client
        .get(&format!("security/alerts_v2/{alert_id}"))
        .await
}

/// Updates the mutable properties of an alert (status, classification,
/// determination, assignment) and returns the updated resource.
///
/// # Errors
///
/// Same as [`get_alert`].
pub async fn update_alert(
    client: &GraphClient,
    alert_id: &str,
    update: &UpdateAlertRequest,
) -> crate::error::Result<Alert> {
    client
        .patch(&format!("security/alerts_v2/{alert_id}"), update)
        .await
}

/// Appends an analyst comment to an alert. Graph returns the full comment
/// list for the alert, newest entry included.
///
/// # Errors
///
/// Same as [`get_alert`].
pub async fn create_alert_comment(
    client: &GraphClient,
    alert_id: &str,
    comment: &str,
) -> crate::error::Result<Vec<AlertComment>> {
    let body = CreateCommentRequest {
        odata_type: "microsoft.graph.security.alertComment",
        comment,
    };
    let comments: Collection<AlertComment> = client
        .post(&format!("security/alerts_v2/{alert_id}/comments"), &body)
        .await?;
    Ok(comments.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn alert_deserializes_from_graph_payload() {
        let body = json!({
            "id": "da637551227677560813_-961444813",
            "title": "Suspicious execution of hidden file",
            "severity": "high",
            "status": "new",
            "category": "DefenseEvasion",
            "serviceSource": "microsoftDefenderForEndpoint",
            "detectionSource": "antivirus",
            "mitreTechniques": ["T1564.001"],
            "createdDateTime": "2021-04-27T12:19:27.7211305Z",
            "incidentId": "28282",
            "tenantId": "b3c1b5fc-828c-45fa-a1e1-10d74f6d6e9c"
        });
        let alert: Alert = serde_json::from_value(body).unwrap();
        assert_eq!(alert.severity, Some(AlertSeverity::High));
        assert_eq!(alert.status, Some(AlertStatus::New));
        assert_eq!(alert.mitre_techniques, vec!["T1564.001"]);
        assert_eq!(alert.incident_id.as_deref(), Some("28282"));
        assert!(alert.additional_data.is_empty());
    }

    #[test]
    fn unknown_properties_land_in_additional_data() {
        let body = json!({
            "id": "a1",
            "severity": "low",
            "someFuturePropertyGraphAdded": {"nested": true}
        });
        let alert: Alert = serde_json::from_value(body).unwrap();
        assert_eq!(
            alert.additional_data["someFuturePropertyGraphAdded"],
            json!({"nested": true})
        );

        // And they come back out on serialization.
        let out = serde_json::to_value(&alert).unwrap();
        assert_eq!(out["someFuturePropertyGraphAdded"], json!({"nested": true}));
    }

    #[test]
    fn unrecognized_severity_maps_to_unknown_future_value() {
        let body = json!({"id": "a1", "severity": "catastrophic"});
        let alert: Alert = serde_json::from_value(body).unwrap();
        assert_eq!(alert.severity, Some(AlertSeverity::UnknownFutureValue));
    }

    #[test]
    fn null_properties_deserialize_as_none() {
        let body = json!({"id": "a1", "assignedTo": null, "classification": null});
        let alert: Alert = serde_json::from_value(body).unwrap();
        assert!(alert.assigned_to.is_none());
        assert!(alert.classification.is_none());
    }

    #[test]
    fn update_request_omits_unset_fields() {
        let update = UpdateAlertRequest {
            status: Some(AlertStatus::Resolved),
            ..Default::default()
        };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"status": "resolved"}));
    }

    #[test]
    fn comment_request_carries_odata_type() {
        let body = CreateCommentRequest {
            odata_type: "microsoft.graph.security.alertComment",
            comment: "triaged, benign",
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["@odata.type"], "microsoft.graph.security.alertComment");
        assert_eq!(v["comment"], "triaged, benign");
    }

    #[test]
    fn determination_values_use_camel_case() {
        assert_eq!(
            serde_json::to_value(AlertDetermination::MultiStagedAttack).unwrap(),
            json!("multiStagedAttack")
        );
        assert_eq!(
            serde_json::from_value::<AlertDetermination>(json!("lineOfBusinessApplication"))
                .unwrap(),
            AlertDetermination::LineOfBusinessApplication
        );
    }
}
