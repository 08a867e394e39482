mod api_types;
mod client;
mod http;

pub use api_types::{ASSET_TYPE_HDRI, AssetInfo, AssetSummary, max_file_resolution};
pub use client::CatalogClient;
pub use http::HttpClient;

/// Catalog result type
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Catalog error types
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether another attempt at the same request could succeed.
    ///
    /// Transport failures and unexpected statuses are retryable; a 404 or a
    /// body that does not parse will not change on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Api { .. })
    }
}
