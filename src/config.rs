//! Run settings, layered from built-in defaults, an optional `hdri.toml` in
//! the working directory and `HDRI__SECTION__KEY` environment variables.

use crate::types::{FileFormat, Resolution};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "hdri";
const ENV_PREFIX: &str = "HDRI";

/// Browser-like agent; the catalog CDN rejects some default client agents.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiConfig,
    pub download: DownloadConfig,
    pub harvest: HarvestConfig,
    pub log: LogConfig,
}

impl Settings {
    /// Load settings from `hdri.toml` (if present) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(
                    Environment::with_prefix(ENV_PREFIX)
                        .prefix_separator("__")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    /// Load settings from an inline TOML document layered over the defaults
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(File::from_str(source, config::FileFormat::Toml)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

/// Catalog endpoints and HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// JSON API origin
    pub base_url: String,
    /// Static origin serving the binary files
    pub download_base_url: String,
    /// Origin of the fallback thumbnail URL
    pub thumbnail_base_url: String,
    pub user_agent: String,
    /// Per-request timeout for API calls
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.polyhaven.com".to_string(),
            download_base_url: "https://dl.polyhaven.org/file/ph-assets/HDRIs".to_string(),
            thumbnail_base_url: "https://cdn.polyhaven.com/asset_img/thumbs".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Asset downloader settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Resolution label, e.g. `1k`, `4k`, `16k`
    pub resolution: String,
    /// The one format fetched per asset
    pub format: FileFormat,
    /// Number of listed assets to process
    pub max_downloads: usize,
    /// Destination directory; `hdri_{resolution}` when unset
    pub output_dir: Option<PathBuf>,
    /// Connect timeout and longest wait for each body read; the transfer as a
    /// whole is unbounded
    pub timeout_secs: u64,
    /// Write buffer size in bytes
    pub chunk_size: usize,
    /// Pause between assets
    pub pause_ms: u64,
}

impl DownloadConfig {
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("hdri_{}", self.resolution)))
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub const fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            resolution: "4k".to_string(),
            format: FileFormat::Hdr,
            max_downloads: 10,
            output_dir: None,
            timeout_secs: 60,
            chunk_size: 1024,
            pause_ms: 1000,
        }
    }
}

/// Metadata harvester settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarvestConfig {
    /// Number of listed HDRIs to process
    pub max_assets: usize,
    /// Total attempts per asset for retryable failures
    pub max_retries: u32,
    pub retry_pause_ms: u64,
    /// Pause between assets
    pub pause_ms: u64,
    /// Metadata document path
    pub output: PathBuf,
    /// Appended to an identifier whose info lookup returns 404
    pub fallback_suffix: String,
    /// Used when the file listing carries no resolution
    pub default_max_resolution: Resolution,
    pub placeholder_dimensions: Resolution,
}

impl HarvestConfig {
    #[must_use]
    pub const fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }

    #[must_use]
    pub const fn pause(&self) -> Duration {
        Duration::from_millis(self.pause_ms)
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_assets: 843,
            max_retries: 3,
            retry_pause_ms: 1000,
            pause_ms: 1000,
            output: PathBuf::from("hdri_metadata.json"),
            fallback_suffix: "_4k".to_string(),
            default_max_resolution: Resolution::new(8192, 4096),
            placeholder_dimensions: Resolution::new(30000, 30000),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit newline-delimited JSON instead of text
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}
