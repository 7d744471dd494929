//! eDiscovery cases and custodians
//! (`security/cases/ediscoveryCases`).
//!
//! A case scopes a legal investigation; custodians are the people whose data
//! sources it covers. Applying or removing a legal hold on custodians is
//! asynchronous: Graph answers 202 Accepted with a `Location` header naming
//! the case operation, which callers can poll via [`crate::operations`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraphClient;
use crate::error::Result;
use crate::odata::{list_all, ODataQuery};
use crate::operations::{poll_operation, CaseOperation, PollConfig};

// ── Models ───────────────────────────────────────────────────────────────

/// Lifecycle status of an eDiscovery case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaseStatus {
    Unknown,
    Active,
    PendingDelete,
    Closing,
    Closed,
    ClosedWithError,
    #[serde(other)]
    UnknownFutureValue,
}

/// Hold status of a custodian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HoldStatus {
    NotApplied,
    Applied,
    Applying,
    Removing,
    Partial,
    #[serde(other)]
    UnknownFutureValue,
}

/// Identity that created or closed a case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentitySet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Identity>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// A single identity inside an [`IdentitySet`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// An eDiscovery case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdiscoveryCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CaseStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<IdentitySet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<IdentitySet>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// A custodian attached to an eDiscovery case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdiscoveryCustodian {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_status: Option<HoldStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released_date_time: Option<String>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

// ── Request types ────────────────────────────────────────────────────────

/// POST body for [`create_case`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseRequest {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

/// POST body for [`add_custodian`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCustodianRequest {
    pub email: String,
}

/// POST body for the applyHold/removeHold actions. `ids` are custodian ids
/// within the case.
#[derive(Serialize)]
struct HoldRequest<'a> {
    ids: &'a [&'a str],
}

// ── Case operations ──────────────────────────────────────────────────────

/// Lists eDiscovery cases, fetching every page.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] for 4xx/5xx responses and
/// [`crate::error::GraphError::Network`] on transport failures.
pub async fn list_cases(
    client: &GraphClient,
    options: &ODataQuery,
) -> Result<Vec<EdiscoveryCase>> {
    list_all(client, "security/cases/ediscoveryCases", options).await
}

/// Fetches one case by id.
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] with status 404 when no case
/// has the given id.
pub async fn get_case(client: &GraphClient, case_id: &str) -> Result<EdiscoveryCase> {
    client
        .get(&format!("security/cases/ediscoveryCases/{case_id}"))
        .await
}

/// Creates a new case and returns it.
///
/// # Errors
///
/// Same as [`list_cases`].
pub async fn create_case(
    client: &GraphClient,
    request: &CreateCaseRequest,
) -> Result<EdiscoveryCase> {
    client.post("security/cases/ediscoveryCases", request).await
}

/// Closes a case. The case transitions through `closing` before reaching
/// `closed`; re-fetch with [`get_case`] to observe the final state.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn close_case(client: &GraphClient, case_id: &str) -> Result<()> {
    client
        .post_no_content(
            &format!("security/cases/ediscoveryCases/{case_id}/close"),
            &(),
        )
        .await
}

/// Reopens a closed case.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn reopen_case(client: &GraphClient, case_id: &str) -> Result<()> {
    client
        .post_no_content(
            &format!("security/cases/ediscoveryCases/{case_id}/reopen"),
            &(),
        )
        .await
}

/// Deletes a case. Graph only deletes cases that are closed and hold none
/// of their holds; otherwise it answers 400.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn delete_case(client: &GraphClient, case_id: &str) -> Result<()> {
    client
        .delete(&format!("security/cases/ediscoveryCases/{case_id}"))
        .await
}

// ── Custodian operations ─────────────────────────────────────────────────

/// Lists the custodians of a case, fetching every page.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn list_custodians(
    client: &GraphClient,
    case_id: &str,
    options: &ODataQuery,
) -> Result<Vec<EdiscoveryCustodian>> {
    list_all(
        client,
        &format!("security/cases/ediscoveryCases/{case_id}/custodians"),
        options,
    )
    .await
}

/// Fetches one custodian of a case.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn get_custodian(
    client: &GraphClient,
    case_id: &str,
    custodian_id: &str,
) -> Result<EdiscoveryCustodian> {
    client
        .get(&format!(
            "security/cases/ediscoveryCases/{case_id}/custodians/{custodian_id}"
        ))
        .await
}

/// Adds a custodian to a case by primary SMTP address and returns the new
/// custodian resource.
///
/// # Errors
///
/// Same as [`get_case`].
pub async fn add_custodian(
    client: &GraphClient,
    case_id: &str,
    request: &AddCustodianRequest,
) -> Result<EdiscoveryCustodian> {
    client
        .post(
            &format!("security/cases/ediscoveryCases/{case_id}/custodians"),
            request,
        )
        .await
}

// ── Hold actions ─────────────────────────────────────────────────────────

/// Applies a legal hold to the given custodians of a case.
///
/// Graph runs the hold change asynchronously and answers 202 Accepted with
/// a `Location` header naming the case operation. When `poll` is `Some` and
/// a location was returned, the operation is polled to completion and
/// returned; otherwise `Ok(None)` is returned immediately (fire and forget).
///
/// # Errors
///
/// Returns [`crate::error::GraphError::Api`] for 4xx/5xx responses, and,
/// when polling, [`crate::error::GraphError::OperationFailed`] or
/// [`crate::error::GraphError::Timeout`] from the poll loop.
pub async fn apply_hold(
    client: &GraphClient,
    case_id: &str,
    custodian_ids: &[&str],
    poll: Option<&PollConfig>,
) -> Result<Option<CaseOperation>> {
    hold_action(client, case_id, custodian_ids, "applyHold", poll).await
}

/// Removes a legal hold from the given custodians of a case. Semantics match
/// [`apply_hold`].
///
/// # Errors
///
/// Same as [`apply_hold`].
pub async fn remove_hold(
    client: &GraphClient,
    case_id: &str,
    custodian_ids: &[&str],
    poll: Option<&PollConfig>,
) -> Result<Option<CaseOperation>> {
    hold_action(client, case_id, custodian_ids, "removeHold", poll).await
}

async fn hold_action(
    client: &GraphClient,
    case_id: &str,
    custodian_ids: &[&str],
    action: &str,
    poll: Option<&PollConfig>,
) -> Result<Option<CaseOperation>> {
    let body = HoldRequest { ids: custodian_ids };
    let location = client
        .post_accepted(
            &format!("security/cases/ediscoveryCases/{case_id}/custodians/{action}"),
            &body,
        )
        .await?;

    let (Some(config), Some(location)) = (poll, location) else {
        return Ok(None);
    };

    match operation_id_from_location(&location) {
        Some(operation_id) => {
            let operation = poll_operation(client, case_id, &operation_id, config).await?;
            Ok(Some(operation))
        }
        None => {
            log::warn!("could not extract operation id from Location: {location}");
            Ok(None)
        }
    }
}

/// Extracts the operation id from a 202 `Location` header value, which has
/// the form `.../operations('{id}')` or `.../operations/{id}`, possibly
/// followed by a query string.
fn operation_id_from_location(location: &str) -> Option<String> {
    let path = location.split('?').next().unwrap_or(location);
    let last = path.trim_end_matches('/').rsplit('/').next()?;
    let id = last
        .strip_prefix("operations('")
        .and_then(|s| s.strip_suffix("')"))
        .unwrap_or(last);
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
