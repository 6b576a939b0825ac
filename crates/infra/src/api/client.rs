//! HTTP adapter for the remote order API
//!
//! Implements [`OrderGateway`] over `reqwest`. Credentials come from the
//! caller on every request so token rotation applies immediately.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use oslink_core::{OrderGateway, RemoteEndpoint};
use oslink_domain::constants::{DEFAULT_REQUEST_TIMEOUT_SECS, ORDERS_ENDPOINT};
use oslink_domain::{
    LifecycleStatus, OrderListResponse, OrderPayload, OsLinkError, RemoteOrder, Result,
    StatusUpdate,
};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::errors::{ApiError, ApiErrorCategory};
use crate::http::HttpClient;

/// Configuration for [`HttpOrderGateway`]
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Overall deadline per API call, retries included
    pub timeout: Duration,
    /// Attempts for idempotent calls (lookup and status update)
    pub max_attempts: usize,
    pub base_backoff: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_attempts: 2,
            base_backoff: Duration::from_millis(250),
        }
    }
}

/// `OrderGateway` backed by the `/api/os` REST endpoints.
pub struct HttpOrderGateway {
    http: HttpClient,
}

impl HttpOrderGateway {
    /// # Errors
    ///
    /// Returns `OsLinkError::Config` if the underlying client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .max_attempts(config.max_attempts)
            .base_backoff(config.base_backoff)
            .user_agent(concat!("oslink-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    fn request(&self, method: Method, url: Url, endpoint: &RemoteEndpoint) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", endpoint.bearer_token))
            .header(CONTENT_TYPE, "application/json")
    }

    async fn execute(&self, builder: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = self.http.send(builder).await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);
        if error.category() == ApiErrorCategory::Authentication {
            warn!(status = status.as_u16(), "order API rejected the bearer token");
        }
        Err(error)
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[instrument(skip(self, endpoint), fields(server = %endpoint.server_url))]
    async fn find_by_external_id(
        &self,
        endpoint: &RemoteEndpoint,
        external_id: &str,
    ) -> Result<Option<RemoteOrder>> {
        let mut url = endpoint_url(&endpoint.server_url, ORDERS_ENDPOINT)?;
        url.query_pairs_mut().append_pair("search", external_id);

        let response = self.execute(self.request(Method::GET, url, endpoint)).await?;
        let listing: OrderListResponse = read_json(response).await?;

        let found = listing.orders.into_iter().find(|order| order.matches_external_id(external_id));
        debug!(found = found.is_some(), "remote lookup finished");
        Ok(found)
    }

    #[instrument(skip(self, endpoint, payload), fields(server = %endpoint.server_url, external_id = %payload.external_id))]
    async fn create(
        &self,
        endpoint: &RemoteEndpoint,
        payload: &OrderPayload,
    ) -> Result<Option<String>> {
        let url = endpoint_url(&endpoint.server_url, ORDERS_ENDPOINT)?;
        let builder = self.request(Method::POST, url, endpoint).json(payload);

        let response = self.execute(builder).await?;
        // The body is informational; a 2xx is what counts.
        let body = response.text().await.unwrap_or_default();
        Ok(created_id(&body))
    }

    #[instrument(skip(self, endpoint), fields(server = %endpoint.server_url))]
    async fn update_status(
        &self,
        endpoint: &RemoteEndpoint,
        remote_id: &str,
        status: LifecycleStatus,
    ) -> Result<()> {
        let url = order_url(&endpoint.server_url, remote_id)?;
        let body = StatusUpdate::new(status, Utc::now());
        self.execute(self.request(Method::PUT, url, endpoint).json(&body)).await?;
        Ok(())
    }
}

/// Resolve an absolute API path against the configured server URL. Like a
/// browser, any path on the server URL itself is replaced.
fn endpoint_url(server_url: &str, path: &str) -> Result<Url> {
    let base = Url::parse(server_url.trim())
        .map_err(|err| OsLinkError::Config(format!("invalid server URL {server_url:?}: {err}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(OsLinkError::Config(format!(
            "unsupported server URL scheme {:?}",
            base.scheme()
        )));
    }
    base.join(path).map_err(|err| OsLinkError::Config(format!("invalid API path {path}: {err}")))
}

/// `/api/os/{remote_id}`, with the id percent-encoded as a single segment.
fn order_url(server_url: &str, remote_id: &str) -> Result<Url> {
    let mut url = endpoint_url(server_url, ORDERS_ENDPOINT)?;
    url.path_segments_mut()
        .map_err(|()| OsLinkError::Config(format!("server URL cannot carry a path: {server_url}")))?
        .push(remote_id);
    Ok(url)
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|err| OsLinkError::Network(format!("failed to read response body: {err}")))?;
    serde_json::from_str(&text).map_err(|err| OsLinkError::Decode(err.to_string()))
}

fn created_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let id = value.get("id").or_else(|| value.get("order").and_then(|order| order.get("id")))?;
    match id {
        serde_json::Value::String(text) => Some(text.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
