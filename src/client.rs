//! HTTP client for the Microsoft Graph v1.0 API.
//!
//! `GraphClient` owns a `reqwest::Client`, the service base URL, and a
//! `TokenProvider`. Every request goes through a single execution path that
//! attaches the bearer token, retries once on 401 after refreshing the token,
//! and maps every 4xx/5xx response to a structured [`GraphError::Api`].

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::auth::TokenProvider;
use crate::error::{GraphError, ODataError, Result};
use crate::odata::ODataQuery;

/// Production Microsoft Graph v1.0 endpoint. Trailing slash matters:
/// relative paths are joined onto it without further normalization.
const BASE_URL: &str = "https://graph.microsoft.com/v1.0/";

/// Time allowed to establish a TCP connection.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Overall per-request deadline, response body included.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the Microsoft Graph security API.
///
/// Wraps a `reqwest::Client` with bearer-token auth and Graph's OData error
/// envelope handling. The token provider sits behind a `tokio::sync::Mutex`
/// so a shared `GraphClient` refreshes its token at most once at a time.
pub struct GraphClient {
    client: reqwest::Client,
    base_url: String,
    auth: Mutex<TokenProvider>,
}

impl GraphClient {
    /// Creates a client against the production Graph v1.0 endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Network`] if the underlying HTTP client cannot
    /// be constructed (e.g. TLS backend initialization failure).
    pub fn new(auth: TokenProvider) -> Result<Self> {
        Self::with_base_url(auth, BASE_URL)
    }

    /// Creates a client against an arbitrary base URL. Used by tests to
    /// point at a local mock server; `base_url` must end with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Network`] if the underlying HTTP client cannot
    /// be constructed.
    pub fn with_base_url(auth: TokenProvider, base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(GraphClient {
            client,
            base_url: base_url.to_string(),
            auth: Mutex::new(auth),
        })
    }

    /// Returns the cached bearer token, refreshing it first if absent or
    /// expired.
    async fn bearer_token(&self) -> Result<String> {
        let mut auth = self.auth.lock().await;
        if auth.token().is_none() {
            auth.refresh_token().await?;
        }
        auth.token()
            .map(str::to_string)
            .ok_or_else(|| GraphError::Auth {
                message: "token provider returned no token after refresh".to_string(),
                source: None,
            })
    }

    /// Drops the cached token so the next request acquires a fresh one.
    async fn invalidate_token(&self) {
        self.auth.lock().await.invalidate();
    }

    /// Core request path. Sends `method` to `url` with an optional JSON body,
    /// retrying exactly once on 401 after invalidating and refreshing the
    /// token. Responses outside 2xx are mapped to [`GraphError::Api`] with
    /// the parsed OData error envelope.
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Response> {
        let mut retried = false;
        loop {
            let token = self.bearer_token().await?;
            let mut request = self.client.request(method.clone(), url).bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            log::debug!("{} {}", method, url);
            let response = request.send().await?;
            let status = response.status();
            log::debug!("{} {} -> {}", method, url, status);

            if status == StatusCode::UNAUTHORIZED && !retried {
                // The cached token may simply be stale; refresh once and
                // replay the request before surfacing the error.
                log::debug!("401 from {}, refreshing token and retrying", url);
                self.invalidate_token().await;
                retried = true;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                let text = response.text().await.unwrap_or_default();
                return Err(GraphError::Api {
                    status,
                    error: ODataError::from_body(&text),
                });
            }

            return Ok(response);
        }
    }

    /// Joins a relative path onto the base URL.
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends a request and deserializes the JSON response body.
    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let response = self.execute(method, url, body).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// GET a relative path and deserialize the response.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Api`] for 4xx/5xx responses, [`GraphError::Parse`]
    /// if the body does not match `T`, and [`GraphError::Network`] on
    /// transport failures.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send_json(Method::GET, &self.url(path), None::<&()>)
            .await
    }

    /// GET a relative path with OData query options appended.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get`].
    pub async fn get_with_options<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &ODataQuery,
    ) -> Result<T> {
        let query = options.to_query_string();
        let url = if query.is_empty() {
            self.url(path)
        } else {
            format!("{}?{}", self.url(path), query)
        };
        self.send_json(Method::GET, &url, None::<&()>).await
    }

    /// GET an absolute URL, used to follow `@odata.nextLink` paging URLs
    /// returned by the service.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get`].
    pub async fn get_url<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send_json(Method::GET, url, None::<&()>).await
    }

    /// POST a JSON body and deserialize the response.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get`].
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::POST, &self.url(path), Some(body))
            .await
    }

    /// POST a JSON body to an action endpoint that returns no response body
    /// (204 No Content).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Api`] for 4xx/5xx responses and
    /// [`GraphError::Network`] on transport failures.
    pub async fn post_no_content<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<()> {
        self.execute(Method::POST, &self.url(path), Some(body))
            .await?;
        Ok(())
    }

    /// POST a JSON body to a long-running action endpoint. Graph answers
    /// these with 202 Accepted and a `Location` header pointing at the
    /// operation resource; the header value is returned when present.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Api`] for 4xx/5xx responses and
    /// [`GraphError::Network`] on transport failures.
    pub async fn post_accepted<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<String>> {
        let response = self
            .execute(Method::POST, &self.url(path), Some(body))
            .await?;
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(location)
    }

    /// PATCH a JSON body and deserialize the response.
    ///
    /// # Errors
    ///
    /// Same as [`GraphClient::get`].
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.send_json(Method::PATCH, &self.url(path), Some(body))
            .await
    }

    /// DELETE a resource. Graph answers with 204 No Content on success.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Api`] for 4xx/5xx responses and
    /// [`GraphError::Network`] on transport failures.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(Method::DELETE, &self.url(path), None::<&()>)
            .await?;
        Ok(())
    }
}
