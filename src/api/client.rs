// Library Client Core - Library management client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! HTTP client for the library REST backend
//!
//! This module provides a thin wrapper around `reqwest::Client`:
//! - Base URL management (every endpoint is joined onto one configured root)
//! - Default headers (User-Agent, Accept)
//! - Optional bearer token per request
//! - Uniform status handling: any non-2xx becomes
//!   [`LibraryError::ApiRequestFailed`] carrying the body's `message` field
//! - Transport failures become [`LibraryError::NetworkError`]
//!
//! Nothing is retried here. A failed request is reported once and the caller
//! decides whether the user should try again.
//!
//! ## Client Structure
//! The `ApiClient` is cheap to clone (the inner `reqwest::Client` is
//! reference-counted) and is normally shared as `Arc<ApiClient>` between the
//! stores of one [`LibraryContext`](crate::context::LibraryContext).

use crate::api::models::ApiErrorBody;
use crate::error::{LibraryError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Backend root used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest response body kept in error values
const MAX_BODY_SNIPPET: usize = 800;

/// Configuration for ApiClient
/// Provides a builder pattern for client customization
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("library-core/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }
}

/// Builder for ClientConfig
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
        }
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

/// HTTP client bound to one backend
///
/// # Example
/// ```rust,no_run
/// use library_core::api::client::{ApiClient, ClientConfig};
///
/// # async fn example() -> library_core::error::Result<()> {
/// let config = ClientConfig::builder().base_url("http://localhost:3000").build();
/// let client = ApiClient::with_config(config)?;
///
/// let books = client.list_books().await?;
/// println!("{} books in the catalog", books.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Underlying HTTP client
    client: Client,
    /// Backend root, always ending with `/`
    base_url: Url,
    /// Client configuration
    config: ClientConfig,
}

impl ApiClient {
    /// Create a client for [`DEFAULT_BASE_URL`]
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new ApiClient with custom configuration
    ///
    /// # Errors
    /// Returns error if the base URL does not parse, the user agent is not a
    /// valid header value, or the HTTP client cannot be built
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(LibraryError::InvalidConfiguration(format!(
                "API base URL cannot carry paths: {}",
                config.base_url
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| {
                LibraryError::InvalidConfiguration(format!("Invalid user agent: {}", e))
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create a builder for custom client configuration
    pub fn builder() -> ClientConfigBuilder {
        ClientConfig::builder()
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve an endpoint such as `/books/1` against the base URL
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Perform a GET request and decode the JSON body
    pub(crate) async fn get<T>(&self, endpoint: &str, token: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.execute(Method::GET, endpoint, None::<&()>, token).await?;
        self.handle_success_response(response).await
    }

    /// Send a JSON body and decode the JSON response
    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.execute(method, endpoint, Some(body), token).await?;
        self.handle_success_response(response).await
    }

    /// Send a request whose response body is not needed
    ///
    /// Any 2xx counts as success, including an empty body.
    pub(crate) async fn send_unit<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.execute(method, endpoint, body, token).await?;
        Ok(())
    }

    /// Build, send and status-check one request
    async fn execute<B>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(endpoint)?;
        debug!(method = %method, endpoint, authenticated = token.is_some(), "sending request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, endpoint, error = %e, "request did not reach the server");
            LibraryError::network_error(format!("{} {}: {}", method, endpoint, e), e.is_timeout())
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(self.handle_error_response(endpoint, response).await)
        }
    }

    /// Decode a successful response body
    async fn handle_success_response<T>(&self, response: Response) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let endpoint = response.url().path().to_string();

        let response_text = response.text().await.map_err(|e| {
            LibraryError::network_error(format!("Failed to read response body: {}", e), e.is_timeout())
        })?;

        serde_json::from_str::<T>(&response_text).map_err(|e| {
            warn!(endpoint = %endpoint, status = status.as_u16(), error = %e, "unexpected response body");
            LibraryError::InvalidApiResponse {
                message: format!("{} at line {} col {}", e, e.line(), e.column()),
                response_body: Some(snippet(&response_text)),
            }
        })
    }

    /// Turn a non-2xx response into an error, keeping the body's `message`
    async fn handle_error_response(&self, endpoint: &str, response: Response) -> LibraryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        warn!(
            endpoint,
            status = status.as_u16(),
            server_message = message.as_deref().unwrap_or(""),
            "request rejected by server"
        );

        LibraryError::api_failed(status.as_u16(), message, endpoint)
    }
}

/// `/{collection}/{id}` with the id percent-encoded
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(id))
}

fn snippet(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_SNIPPET) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

// ===== TESTS =====
