//! Client library for the Microsoft Graph security API (v1.0).
//!
//! Covers alerts (`security/alerts_v2`), incidents (`security/incidents`),
//! and eDiscovery cases (`security/cases/ediscoveryCases`) with custodian
//! and legal-hold management, over OAuth2 client-credentials auth.
//!
//! ```no_run
//! use msgraph_security::auth::{TokenProvider, GRAPH_DEFAULT_SCOPE};
//! use msgraph_security::client::GraphClient;
//! use msgraph_security::odata::ODataQuery;
//! use msgraph_security::alerts;
//!
//! # async fn run() -> msgraph_security::error::Result<()> {
//! let auth = TokenProvider::new("tenant-id", "client-id", "secret", GRAPH_DEFAULT_SCOPE);
//! let client = GraphClient::new(auth)?;
//!
//! let high = ODataQuery::new().filter("severity eq 'high'").top(25);
//! for alert in alerts::list_alerts(&client, &high).await? {
//!     println!("{:?}: {:?}", alert.id, alert.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod alerts;
pub mod auth;
pub mod client;
pub mod ediscovery;
pub mod error;
pub mod evidence;
pub mod incidents;
pub mod odata;
pub mod operations;
