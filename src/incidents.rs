//! Incidents from the Microsoft Graph security API (`security/incidents`).
//!
//! An incident groups the alerts, assets, and investigation state of a single
//! attack. The related alerts are a navigation property: they appear in the
//! payload only when the request asks for them with `$expand=alerts`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alerts::{Alert, AlertClassification, AlertComment, AlertDetermination, AlertSeverity};
use crate::client::GraphClient;
use crate::odata::{list_all, Collection, ODataQuery};

/// Lifecycle status of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IncidentStatus {
    Active,
    Resolved,
    InProgress,
    Redirected,
    #[serde(other)]
    UnknownFutureValue,
}

/// An incident correlating one or more alerts into a single attack story.
///
/// All properties are optional; undeclared properties are preserved in
/// `additional_data`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Related alerts; populated only when requested with `$expand=alerts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<AlertClassification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<AlertComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub determination: Option<AlertDetermination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_web_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_incident_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolving_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<AlertSeverity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// PATCH body for [`update_incident`]. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<AlertClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub determination: Option<AlertDetermination>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolving_comment: Option<String>,
}

/// Lists incidents, fetching every page.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] for 4xx/5xx responses and
/// [`crate::error::GraphError::Network`] on transport failures.
pub async fn list_incidents(
    client: &GraphClient,
    options: &ODataQuery,
) -> crate::error::Result<Vec<Incident>> {
    list_all(client, "security/incidents", options).await
}

/// Fetches a single page of incidents.
///
/// # Errors
///
/// Same as [`list_incidents`].
pub async fn list_incidents_page(
    client: &GraphClient,
    options: &ODataQuery,
) -> crate::error::Result<Collection<Incident>> {
    client.get_with_options("security/incidents", options).await
}

/// Fetches one incident by id. Pass `ODataQuery::new().expand("alerts")` in
/// `options` to include the related alerts.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] with status 404 when no
/// incident has the given id.
pub async fn get_incident(
    client: &GraphClient,
    incident_id: &str,
    options: &ODataQuery,
) -> crate::error::Result<Incident> {
    client
        .get_with_options(&format!("security/incidents/{incident_id}"), options)
        .await
}

/// Updates the mutable properties of an incident and returns the updated
/// resource.
///
/// # Errors
///
/// Same as [`get_incident`].
pub async fn update_incident(
    client: &GraphClient,
    incident_id: &str,
    update: &UpdateIncidentRequest,
) -> crate::error::Result<Incident> {
    client
        .patch(&format!("security/incidents/{incident_id}"), update)
        .await
}
