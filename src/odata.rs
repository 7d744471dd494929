//! OData query options and collection paging.
//!
//! Graph list endpoints accept the standard OData system query options
//! (`$select`, `$filter`, `$top`, ...) and return pages wrapped in a
//! `{"value": [...], "@odata.nextLink": "..."}` envelope. [`ODataQuery`]
//! builds the query string; [`Collection`] models the envelope;
//! [`list_all`] follows `@odata.nextLink` until the collection is exhausted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::client::GraphClient;
use crate::error::Result;

/// Builder for OData system query options.
///
/// Values are percent-encoded when the query string is rendered, so filters
/// may contain spaces and quotes as written:
///
/// ```
/// use msgraph_security::odata::ODataQuery;
///
/// let q = ODataQuery::new()
///     .filter("severity eq 'high'")
///     .top(10)
///     .orderby("createdDateTime desc");
/// assert_eq!(
///     q.to_query_string(),
///     "$filter=severity%20eq%20%27high%27&$orderby=createdDateTime%20desc&$top=10"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct ODataQuery {
    select: Option<String>,
    filter: Option<String>,
    expand: Option<String>,
    orderby: Option<String>,
    search: Option<String>,
    top: Option<u32>,
    skip: Option<u32>,
    count: bool,
}

impl ODataQuery {
    /// Creates an empty query with no options set.
    pub fn new() -> Self {
        Self::default()
    }

    /// `$select`: comma-separated list of properties to return.
    pub fn select(mut self, fields: &str) -> Self {
        self.select = Some(fields.to_string());
        self
    }

    /// `$filter`: OData filter expression, e.g. `severity eq 'high'`.
    pub fn filter(mut self, expr: &str) -> Self {
        self.filter = Some(expr.to_string());
        self
    }

    /// `$expand`: navigation properties to inline, e.g. `alerts`.
    pub fn expand(mut self, relations: &str) -> Self {
        self.expand = Some(relations.to_string());
        self
    }

    /// `$orderby`: sort expression, e.g. `createdDateTime desc`.
    pub fn orderby(mut self, expr: &str) -> Self {
        self.orderby = Some(expr.to_string());
        self
    }

    /// `$search`: free-text search expression.
    pub fn search(mut self, expr: &str) -> Self {
        self.search = Some(expr.to_string());
        self
    }

    /// `$top`: maximum number of items per page.
    pub fn top(mut self, n: u32) -> Self {
        self.top = Some(n);
        self
    }

    /// `$skip`: number of items to skip from the start of the result set.
    pub fn skip(mut self, n: u32) -> Self {
        self.skip = Some(n);
        self
    }

    /// `$count=true`: ask the service to include `@odata.count` in the
    /// response envelope.
    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    /// Renders the options as a query string without a leading `?`.
    /// Returns an empty string when no options are set. Option order is
    /// fixed so tests can assert on the rendered URL.
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();

        if self.count {
            parts.push("$count=true".to_string());
        }
        if let Some(expand) = &self.expand {
            parts.push(format!("$expand={}", urlencoding::encode(expand)));
        }
        if let Some(filter) = &self.filter {
            parts.push(format!("$filter={}", urlencoding::encode(filter)));
        }
        if let Some(orderby) = &self.orderby {
            parts.push(format!("$orderby={}", urlencoding::encode(orderby)));
        }
        if let Some(search) = &self.search {
            parts.push(format!("$search={}", urlencoding::encode(search)));
        }
        if let Some(select) = &self.select {
            parts.push(format!("$select={}", urlencoding::encode(select)));
        }
        if let Some(skip) = self.skip {
            parts.push(format!("$skip={skip}"));
        }
        if let Some(top) = self.top {
            parts.push(format!("$top={top}"));
        }

        parts.join("&")
    }
}

/// One page of a Graph collection response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection<T> {
    /// The items in this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, absent on the last page.
    #[serde(
        rename = "@odata.nextLink",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub next_link: Option<String>,
    /// Total count of the result set, present when `$count=true` was requested.
    #[serde(
        rename = "@odata.count",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub count: Option<i64>,
}

/// Fetches every page of a collection, following `@odata.nextLink` until
/// the service stops returning one, and concatenates the items.
///
/// The first page is requested at `path` with `options`; subsequent pages
/// use the absolute next-link URLs verbatim, as Graph encodes continuation
/// state (`$skiptoken`) into them.
///
/// # Errors
///
/// Returns the first error from any page request; items from pages already
/// fetched are discarded.
pub async fn list_all<T: DeserializeOwned>(
    client: &GraphClient,
    path: &str,
    options: &ODataQuery,
) -> Result<Vec<T>> {
    let mut page: Collection<T> = client.get_with_options(path, options).await?;
    let mut items = page.value;

    while let Some(next) = page.next_link {
        log::debug!("following next page: {}", next);
        page = client.get_url(&next).await?;
        items.append(&mut page.value);
    }

    Ok(items)
}
