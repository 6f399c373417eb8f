//! Common utilities for the inventory API client
//!
//! Provides the authenticated HTTP wrapper shared by every endpoint.

use crate::error::InventoryError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// HTTP client wrapper with authentication
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: String, token: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("X-Auth-Token", &self.token)
            .header("Accept", "application/json")
    }

    /// Map a non-success response to the matching error variant
    async fn check(method: &str, path: &str, response: Response) -> Result<Response, InventoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = format!("{} {} failed: {} - {}", method, path, status, body);
        Err(match status {
            StatusCode::NOT_FOUND => InventoryError::NotFound(detail),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InventoryError::Authentication(detail),
            StatusCode::CONFLICT => InventoryError::Conflict(detail),
            StatusCode::BAD_REQUEST => InventoryError::InvalidRequest(detail),
            _ => InventoryError::Api(detail),
        })
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, InventoryError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            InventoryError::Api(format!(
                "error decoding response body: {} - Response (first 500 chars): {}",
                e,
                text.chars().take(500).collect::<String>()
            ))
        })
    }

    /// Make a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, InventoryError> {
        let url = self.build_url(path);
        debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        let response = Self::check("GET", path, response).await?;
        Self::decode(response).await
    }

    /// Make a POST request
    pub async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, InventoryError> {
        let url = self.build_url(path);
        debug!("POST {} with body: {}", url, body);

        let response = self.authorized(self.client.post(&url)).json(body).send().await?;
        let response = Self::check("POST", path, response).await?;
        Self::decode(response).await
    }

    /// Make a PATCH request with a JSON-patch body
    pub async fn patch<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, InventoryError> {
        let url = self.build_url(path);
        debug!("PATCH {} with body: {}", url, body);

        let response = self
            .authorized(self.client.patch(&url))
            .header("Content-Type", "application/json-patch+json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;
        let response = Self::check("PATCH", path, response).await?;
        Self::decode(response).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<(), InventoryError> {
        let url = self.build_url(path);
        debug!("DELETE {}", url);

        let response = self.authorized(self.client.delete(&url)).send().await?;
        Self::check("DELETE", path, response).await?;
        Ok(())
    }
}
