//! Proxy for the compose registry search API.

use std::time::Duration;

use axum::http::StatusCode;
use dcx_core::RegistryConfig;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;

/// Header carrying the registry API key.
const KEY_HEADER: &str = "x-key";

/// HTTP client for the upstream compose registry.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RegistryClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Internal`] if the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn new(config: &RegistryConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| ApiError::internal(format!("registry client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    /// Returns the registry base URL.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Searches the registry.
    ///
    /// The upstream status code is returned alongside its JSON body so the
    /// caller can pass both through unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Upstream`] if the registry is unreachable or
    /// answers with something other than JSON.
    pub async fn search(&self, query: &str) -> Result<(StatusCode, Value), ApiError> {
        self.get("search", &[("query", query)]).await
    }

    /// Fetches the descriptor of registry entry `id`.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn yml(&self, id: &str) -> Result<Value, ApiError> {
        let (_, body) = self.get("yml", &[("id", id)]).await?;
        Ok(body)
    }

    async fn get(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<(StatusCode, Value), ApiError> {
        let url = format!("{}/{endpoint}", self.base_url);
        debug!(%url, ?query, "Querying compose registry");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header(KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(err.to_string()))?;

        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|err| ApiError::Upstream(err.to_string()))?;
        let body = response
            .json::<Value>()
            .await
            .map_err(|err| ApiError::Upstream(err.to_string()))?;

        Ok((status, body))
    }
}
