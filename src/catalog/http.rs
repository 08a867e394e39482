use crate::catalog::{CatalogError, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Characters of an error body kept for diagnostics
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP client wrapper for the catalog API
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build full URL from endpoint
    #[must_use]
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Execute GET request and parse JSON response
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        self.get_with_params(endpoint, &[]).await
    }

    /// Execute GET request with query parameters
    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(endpoint);
        tracing::debug!("GET {url} {params:?}");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(CatalogError::Network)?;

        Self::handle_response(&url, response).await
    }

    /// Handle response and parse JSON
    async fn handle_response<T: DeserializeOwned>(
        url: &str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(url.to_string()));
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();

            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: truncate(&text, ERROR_BODY_LIMIT),
            });
        }

        let body = response.text().await.map_err(CatalogError::Network)?;

        serde_json::from_str(&body).map_err(|e| {
            CatalogError::Parse(format!(
                "JSON parse error: {e} (body: {})",
                truncate(&body, ERROR_BODY_LIMIT)
            ))
        })
    }
}

fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_base_and_endpoint() {
        let client =
            HttpClient::new("https://api.example.com/", "test", Duration::from_secs(1)).unwrap();
        assert_eq!(client.url("/info/abc"), "https://api.example.com/info/abc");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 2), "éé...");
    }
}
