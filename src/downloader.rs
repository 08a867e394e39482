use crate::catalog::{CatalogClient, CatalogError, Result};
use crate::config::Settings;
use crate::pacing::{FixedDelay, Pacer};
use crate::types::FileFormat;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

/// Result of a single file fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A file with the same name was already present
    Skipped,
    /// Body written to the contained path
    Downloaded(PathBuf),
    /// Server answered with a status other than 200
    Unavailable(u16),
    /// Transport or filesystem failure
    Failed(String),
}

/// Tally of one downloader run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    pub listed: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Download URLs for every format of an asset at a given resolution
#[must_use]
pub fn build_download_links(
    base_url: &str,
    id: &str,
    resolution: &str,
) -> BTreeMap<FileFormat, String> {
    let base_url = base_url.trim_end_matches('/');

    FileFormat::ALL
        .into_iter()
        .map(|format| {
            let ext = format.extension();
            (
                format,
                format!("{base_url}/{ext}/{resolution}/{id}_{resolution}.{ext}"),
            )
        })
        .collect()
}

/// Last path segment of a URL, without query or fragment
#[must_use]
pub fn file_name_from_url(url: &str) -> Option<&str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Fetches HDRI binaries into a local directory
pub struct AssetDownloader {
    catalog: CatalogClient,
    client: Client,
    download_base_url: String,
    chunk_size: usize,
    pacer: Box<dyn Pacer>,
}

impl AssetDownloader {
    /// Create a downloader from run settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let catalog = CatalogClient::new(&settings.api)?;
        let client = Client::builder()
            .user_agent(settings.api.user_agent.as_str())
            .connect_timeout(settings.download.timeout())
            .read_timeout(settings.download.timeout())
            .build()?;

        Ok(Self {
            catalog,
            client,
            download_base_url: settings.api.download_base_url.clone(),
            chunk_size: settings.download.chunk_size.max(1),
            pacer: Box::new(FixedDelay::new(settings.download.pause())),
        })
    }

    /// Replace the pause applied between assets
    #[must_use]
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Identifiers of all listed HDRIs; empty when the listing fails
    pub async fn list_assets(&self) -> Vec<String> {
        match self.catalog.assets().await {
            Ok(assets) => {
                let ids: Vec<String> = assets.into_iter().map(|(id, _)| id).collect();
                info!("Found {} HDRIs", ids.len());
                ids
            }
            Err(e) => {
                warn!("Failed to list assets: {e}");
                Vec::new()
            }
        }
    }

    /// Download URLs for `id` using this downloader's origin
    #[must_use]
    pub fn download_links(&self, id: &str, resolution: &str) -> BTreeMap<FileFormat, String> {
        build_download_links(&self.download_base_url, id, resolution)
    }

    /// Download `url` into `dir` unless a file of the same name is present.
    ///
    /// Failures are logged and reported through the outcome, never raised.
    pub async fn fetch(&self, url: &str, dir: &Path) -> FetchOutcome {
        let Some(file_name) = file_name_from_url(url) else {
            warn!("No file name in URL: {url}");
            return FetchOutcome::Failed(format!("no file name in {url}"));
        };
        let path = dir.join(file_name);

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!("Skipping (already present): {file_name}");
            return FetchOutcome::Skipped;
        }

        match self.download_to(url, &path).await {
            Ok(StatusCode::OK) => {
                info!("Downloaded: {file_name}");
                FetchOutcome::Downloaded(path)
            }
            Ok(status) => {
                warn!("Not found ({status}): {url}");
                FetchOutcome::Unavailable(status.as_u16())
            }
            Err(e) => {
                warn!("Error fetching {url}: {e}");
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Process the first `max_downloads` listed assets in listing order
    pub async fn run(&self, settings: &Settings) -> Result<DownloadReport> {
        let config = &settings.download;
        let dir = config.output_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let assets = self.list_assets().await;
        let mut report = DownloadReport {
            listed: assets.len(),
            ..Default::default()
        };

        if assets.is_empty() {
            return Ok(report);
        }

        for id in assets.iter().take(config.max_downloads) {
            info!("Processing: {id}");

            let links = self.download_links(id, &config.resolution);
            let Some(url) = links.get(&config.format) else {
                continue;
            };

            match self.fetch(url, &dir).await {
                FetchOutcome::Downloaded(_) => report.downloaded += 1,
                FetchOutcome::Skipped => report.skipped += 1,
                FetchOutcome::Unavailable(_) | FetchOutcome::Failed(_) => report.failed += 1,
            }

            self.pacer.pause().await;
        }

        info!(
            "Downloads finished: {} downloaded, {} skipped, {} failed",
            report.downloaded, report.skipped, report.failed
        );

        Ok(report)
    }

    /// Stream the body into a `.part` sibling and move it into place.
    ///
    /// Nothing is written for non-200 responses.
    async fn download_to(&self, url: &str, path: &Path) -> Result<StatusCode> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            return Ok(status);
        }

        let part = part_path(path);
        let result = async {
            let file = tokio::fs::File::create(&part).await?;
            let mut writer = BufWriter::with_capacity(self.chunk_size, file);
            let mut stream = response.bytes_stream();
            let mut written = 0u64;

            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(CatalogError::Network)?;
                writer.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }

            writer.flush().await?;
            tokio::fs::rename(&part, path).await?;
            debug!("Wrote {written} bytes to {}", path.display());
            Ok::<_, CatalogError>(())
        }
        .await;

        if result.is_err()
            && let Err(e) = tokio::fs::remove_file(&part).await
        {
            debug!("Could not remove {}: {e}", part.display());
        }

        result.map(|()| status)
    }
}

fn part_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}
