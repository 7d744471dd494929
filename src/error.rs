//! Typed error hierarchy for the msgraph-security crate.
//!
//! `GraphError` is a structured enum that preserves diagnostic context at
//! each failure boundary. Every variant carries enough information for
//! callers to:
//! - Distinguish the failure category (auth, API, timeout, parse, network).
//! - Inspect the original cause via `source()` (thiserror derives this
//!   automatically from `#[source]` fields).
//! - Display a human-readable message that includes the relevant context
//!   (status code, OData error code, operation ID, elapsed duration, etc.).
//!
//! The central contract is the `Api` variant: any Graph response with an
//! HTTP status in [400, 599] surfaces as `GraphError::Api` carrying an
//! [`ODataError`] parsed from the response body's `{"error": {...}}`
//! envelope. Bodies that are not the envelope (HTML gateway pages, empty
//! bodies) are wrapped into a synthetic `ODataError` that preserves the raw
//! text, so the caller always gets a structured error and never a bare
//! transport failure for an HTTP-level rejection.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Synthetic error code used when a non-2xx response body is not the
/// standard OData error envelope (e.g. a gateway HTML page or empty body).
const UNKNOWN_ERROR_CODE: &str = "UnknownError";

/// The structured error object Microsoft Graph returns for failed requests.
///
/// Graph wraps errors as `{"error": {"code": ..., "message": ...,
/// "innerError": {...}}}`. `code` is a machine-readable string such as
/// `"InvalidAuthenticationToken"` or `"ResourceNotFound"`; `innerError`
/// typically carries `request-id`, `client-request-id`, and `date` for
/// support correlation. Any further keys Graph adds land in
/// `additional_data` and survive re-serialization.
///
/// Reference: <https://learn.microsoft.com/en-us/graph/errors>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ODataError {
    /// Machine-readable error code (e.g. `"ResourceNotFound"`).
    pub code: String,

    /// Human-readable description of the failure.
    pub message: String,

    /// Diagnostic details: `request-id`, `client-request-id`, `date`, and
    /// whatever else the service includes. Kept as a raw map because the
    /// key set is not contractual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_error: Option<Map<String, Value>>,

    /// Keys of the error object not modeled above.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// The envelope shape: the error object nested under a top-level `error` key.
#[derive(Deserialize)]
struct ODataErrorEnvelope {
    error: ODataError,
}

impl ODataError {
    /// Parses an error response body into a structured error. Total: bodies
    /// that are not the OData envelope produce a synthetic error whose
    /// message preserves the raw text, so HTTP-level failures always map to
    /// a structured error regardless of what the server sent.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<ODataErrorEnvelope>(body) {
            Ok(envelope) => envelope.error,
            Err(_) => ODataError {
                code: UNKNOWN_ERROR_CODE.to_string(),
                message: body.to_string(),
                inner_error: None,
                additional_data: Map::new(),
            },
        }
    }
}

/// Unified error type for all msgraph-security library operations.
///
/// Each variant corresponds to a distinct failure boundary in the system.
/// The `#[source]` attribute on inner errors enables `Error::source()`
/// chaining so callers (and logging frameworks) can traverse the full
/// cause chain.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Authentication failure at the Azure AD token endpoint.
    ///
    /// This covers:
    /// - Non-2xx responses from `/oauth2/v2.0/token` (invalid credentials,
    ///   expired secrets, misconfigured permissions). The message contains
    ///   Azure AD's AADSTS error codes when available.
    /// - Network failures reaching the token endpoint.
    /// - Missing token after a refresh attempt (internal invariant violation).
    #[error("authentication failed: {message}")]
    Auth {
        /// Human-readable description of the authentication failure,
        /// including HTTP status and Azure AD error body when available.
        message: String,
        /// The underlying transport or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The Graph API returned a non-success HTTP status code.
    ///
    /// Every status in [400, 599] maps here, with the response body parsed
    /// into a structured [`ODataError`]. Status, OData error code, and
    /// message are all preserved, so callers can tell a 403
    /// `Authorization_RequestDenied` from a 404 `ResourceNotFound` or a
    /// 429 throttle.
    #[error("Graph API error {status}: {}: {}", error.code, error.message)]
    Api {
        /// The HTTP status code returned by the Graph API.
        status: StatusCode,
        /// The structured OData error parsed from the response body.
        error: ODataError,
    },

    /// The polling loop exceeded the configured timeout without the case
    /// operation reaching a terminal state.
    ///
    /// This typically means the server-side operation is stuck or very
    /// slow. The caller can retry with a longer timeout or track the
    /// operation ID out of band.
    #[error("polling timed out after {elapsed:?} for operation {operation_id}")]
    Timeout {
        /// The total elapsed time when the timeout was detected.
        elapsed: std::time::Duration,
        /// The case operation ID that was being polled.
        operation_id: String,
    },

    /// The case operation reached a terminal failure state (`failed` or
    /// `submissionFailed`) instead of `succeeded`.
    ///
    /// Distinct from `Api`: the polling request itself succeeded (200 OK),
    /// but the operation's server-side work failed.
    #[error("operation {operation_id} reached terminal status: {status}")]
    OperationFailed {
        /// The terminal status that was reached.
        status: String,
        /// The case operation ID.
        operation_id: String,
    },

    /// JSON deserialization failed when parsing an API response body.
    ///
    /// This can occur if the Graph API returns an unexpected response
    /// shape for a 2xx status.
    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, request timeout, etc.).
    ///
    /// No HTTP status code is available because the request did not
    /// complete. This wraps the underlying `reqwest::Error` which carries
    /// detailed transport diagnostics.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Convenience alias used throughout the library.
/// Keeps function signatures concise while providing the full typed error.
pub type Result<T> = std::result::Result<T, GraphError>;
