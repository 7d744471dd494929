//! Long-running eDiscovery case operations.
//!
//! Hold changes, estimates, and exports run asynchronously: the triggering
//! POST returns 202 Accepted with a `Location` header pointing at an
//! operation resource under
//! `security/cases/ediscoveryCases/{case_id}/operations/{operation_id}`.
//! [`poll_operation`] watches that resource until it reaches a terminal
//! status or the configured timeout elapses.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::client::GraphClient;
use crate::error::{GraphError, Result};

/// Status of a case operation. Terminal statuses are `Succeeded`,
/// `PartiallySucceeded`, `Failed`, and `SubmissionFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    NotStarted,
    SubmissionFailed,
    Running,
    Succeeded,
    PartiallySucceeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl OperationStatus {
    /// Returns `true` when the operation will make no further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationStatus::Succeeded
                | OperationStatus::PartiallySucceeded
                | OperationStatus::Failed
                | OperationStatus::SubmissionFailed
        )
    }
}

/// A long-running operation on an eDiscovery case.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percent_progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    /// Properties on the wire that this model does not declare.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// Controls [`poll_operation`]: how often to check and how long to wait
/// overall before giving up.
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

/// Fetches a case operation by id.
///
/// # Errors
///
/// Returns [`GraphError::Api`] for 4xx/5xx responses and
/// [`GraphError::Network`] on transport failures.
pub async fn get_operation(
    client: &GraphClient,
    case_id: &str,
    operation_id: &str,
) -> Result<CaseOperation> {
    client
        .get(&format!(
            "security/cases/ediscoveryCases/{case_id}/operations/{operation_id}"
        ))
        .await
}

/// Polls a case operation until it reaches a terminal status.
///
/// Sleeps for `config.interval` between checks. Returns the operation on
/// `Succeeded` or `PartiallySucceeded`.
///
/// # Errors
///
/// Returns [`GraphError::OperationFailed`] when the operation terminates in
/// `Failed` or `SubmissionFailed`, and [`GraphError::Timeout`] when
/// `config.timeout` elapses before a terminal status is observed.
pub async fn poll_operation(
    client: &GraphClient,
    case_id: &str,
    operation_id: &str,
    config: &PollConfig,
) -> Result<CaseOperation> {
    let started = Instant::now();
    loop {
        let operation = get_operation(client, case_id, operation_id).await?;
        let status = operation.status.unwrap_or(OperationStatus::Unknown);
        log::debug!(
            "operation {} status={:?} progress={:?}",
            operation_id,
            status,
            operation.percent_progress
        );

        if status.is_terminal() {
            return match status {
                OperationStatus::Succeeded | OperationStatus::PartiallySucceeded => Ok(operation),
                _ => Err(GraphError::OperationFailed {
                    status: format!("{status:?}"),
                    operation_id: operation_id.to_string(),
                }),
            };
        }

        if started.elapsed() >= config.timeout {
            return Err(GraphError::Timeout {
                elapsed: started.elapsed(),
                operation_id: operation_id.to_string(),
            });
        }

        tokio::time::sleep(config.interval).await;
    }
}
