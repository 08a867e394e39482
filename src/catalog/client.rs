use super::api_types::AssetInfo;
use crate::catalog::{HttpClient, Result};
use crate::config::ApiConfig;
use serde_json::{Map, Value};
use std::time::Duration;

/// Asset category filter for the listing endpoint
const HDRI_CATEGORY: &str = "hdris";

/// Typed access to the catalog's read-only endpoints
#[derive(Clone)]
pub struct CatalogClient {
    client: HttpClient,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = HttpClient::new(
            config.base_url.as_str(),
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )?;

        Ok(Self { client })
    }

    /// `GET /assets?t=hdris`: identifier to asset summary, in response order
    pub async fn assets(&self) -> Result<Map<String, Value>> {
        self.client
            .get_with_params("/assets", &[("t", HDRI_CATEGORY)])
            .await
    }

    /// `GET /info/{id}`
    pub async fn info(&self, id: &str) -> Result<AssetInfo> {
        self.client.get(&format!("/info/{id}")).await
    }

    /// `GET /files/{id}`, left as raw JSON since its shape varies per asset
    pub async fn files(&self, id: &str) -> Result<Value> {
        self.client.get(&format!("/files/{id}")).await
    }
}
