//! Cafeteria REST API client.
//!
//! The server is the durable owner of inventory and of the authoritative
//! order log; this client consumes its contract as given:
//!
//! - `GET  /dashboard/api/public-items/` - inventory snapshot
//! - `PUT  /dashboard/api/items/{id}/update/` - authoritative quantity update
//! - `POST /shop/api/save-order/` - order submission
//! - `GET  /shop/api/get-order-history/` - server-side order log
//!
//! Mutating requests carry the `X-CSRFToken` header, read from the
//! `csrftoken` cookie in the client's cookie jar. The jar is seeded from
//! configuration and updated from `Set-Cookie` responses.

pub mod types;

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::cookie::{CookieStore, Jar};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::ShopConfig;
use crate::inventory::InventoryRecord;

pub use types::{ItemUpdate, Order, OrderLine, OrderPayload, PublicItemsResponse};

/// Errors that can occur when talking to the cafeteria server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failure (includes timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the server.
    #[error("Server returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL construction failed.
    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    /// No `csrftoken` cookie available for a mutating request.
    #[error("CSRF token not found")]
    MissingCsrfToken,
}

/// Client for the cafeteria REST API.
///
/// Cheaply cloneable; reconciliation updates clone it into spawned tasks.
#[derive(Clone)]
pub struct CafeteriaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: Url,
    jar: Arc<Jar>,
}

impl CafeteriaClient {
    /// Create a new client from configuration.
    ///
    /// Seeds the cookie jar with the configured session cookie and CSRF
    /// token, and applies the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ShopConfig) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        if let Some(session) = &config.session_cookie {
            jar.add_cookie_str(
                &format!("sessionid={}", session.expose_secret()),
                &config.api_base_url,
            );
        }
        if let Some(token) = &config.csrf_token {
            jar.add_cookie_str(
                &format!("csrftoken={}", token.expose_secret()),
                &config.api_base_url,
            );
        }

        let http = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: config.api_base_url.clone(),
                jar,
            }),
        })
    }

    /// Fetch the current inventory snapshot.
    pub async fn fetch_public_items(&self) -> Result<Vec<InventoryRecord>, ApiError> {
        let url = self.endpoint("dashboard/api/public-items/")?;
        let response = self.inner.http.get(url).send().await?;
        let data: PublicItemsResponse = Self::parse_response(response).await?;
        debug!(items = data.items.len(), "fetched inventory snapshot");
        Ok(data.items)
    }

    /// Push an authoritative quantity update for one inventory record.
    pub async fn update_item_quantity(
        &self,
        record: &InventoryRecord,
        new_quantity: u32,
    ) -> Result<InventoryRecord, ApiError> {
        let url = self.endpoint(&format!("dashboard/api/items/{}/update/", record.id))?;
        let token = self.csrf_token().ok_or(ApiError::MissingCsrfToken)?;
        let payload = ItemUpdate {
            id: record.id,
            name: record.name.clone(),
            quantity: new_quantity,
        };

        let response = self
            .inner
            .http
            .put(url)
            .header("X-CSRFToken", token)
            .json(&payload)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// Submit an order. The response body (the echoed order) is discarded.
    pub async fn save_order(&self, payload: &OrderPayload) -> Result<(), ApiError> {
        let url = self.endpoint("shop/api/save-order/")?;
        let token = self.csrf_token().ok_or(ApiError::MissingCsrfToken)?;

        let response = self
            .inner
            .http
            .post(url)
            .header("X-CSRFToken", token)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }
        debug!(order_id = %payload.order_id, "order submitted");
        Ok(())
    }

    /// Fetch the server-side order log.
    pub async fn fetch_order_history(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint("shop/api/get-order-history/")?;
        let response = self.inner.http.get(url).send().await?;
        Self::parse_response(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// CSRF token from the `csrftoken` cookie, if present in the jar.
    fn csrf_token(&self) -> Option<String> {
        let header = self.inner.jar.cookies(&self.inner.base_url)?;
        let header = header.to_str().ok()?;
        header
            .split(';')
            .map(str::trim)
            .find_map(|pair| pair.strip_prefix("csrftoken="))
            .map(str::to_string)
    }

    /// Read the body as text first so non-JSON error pages still produce a
    /// useful diagnostic.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %snippet(&body, 500),
                "failed to parse server response"
            );
            ApiError::Parse(e)
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    error!(status = %status, body = %snippet(body, 500), "server returned non-success status");
    ApiError::Status {
        status,
        body: snippet(body, 200),
    }
}

fn snippet(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}
