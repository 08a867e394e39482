use crate::catalog::{
    AssetInfo, AssetSummary, CatalogClient, CatalogError, Result, max_file_resolution,
};
use crate::config::{HarvestConfig, Settings};
use crate::pacing::{FixedDelay, Pacer};
use crate::types::{AssetMetadata, MetadataCollection, display_name_from_id};
use indexmap::IndexMap;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// Type tag written into every harvested record
const HDRI_TYPE_TAG: i64 = 0;

/// Author entry used when the catalog lists none
const UNKNOWN_AUTHOR: (&str, &str) = ("Unknown", "All");

/// How many listed identifiers to echo after discovery
const SAMPLE_ID_COUNT: usize = 3;

/// Outcome of one harvester run
#[derive(Debug, Clone, Default)]
pub struct HarvestReport {
    /// HDRIs found in the listing
    pub listed: usize,
    /// Identifiers attempted
    pub attempted: usize,
    /// Records gathered, keyed by listed identifier
    pub collection: MetadataCollection,
    /// Identifiers that could not be resolved
    pub failed: Vec<String>,
    /// Whether the collection reached disk
    pub persisted: bool,
}

/// Collects per-asset metadata from the catalog into a single JSON document
pub struct MetadataHarvester {
    catalog: CatalogClient,
    config: HarvestConfig,
    thumbnail_base_url: String,
    pacer: Box<dyn Pacer>,
    retry_pacer: Box<dyn Pacer>,
}

impl MetadataHarvester {
    /// Create a harvester from run settings
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            catalog: CatalogClient::new(&settings.api)?,
            config: settings.harvest.clone(),
            thumbnail_base_url: settings
                .api
                .thumbnail_base_url
                .trim_end_matches('/')
                .to_string(),
            pacer: Box::new(FixedDelay::new(settings.harvest.pause())),
            retry_pacer: Box::new(FixedDelay::new(settings.harvest.retry_pause())),
        })
    }

    /// Replace the pause applied between assets
    #[must_use]
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Replace the pause applied between retry attempts
    #[must_use]
    pub fn with_retry_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.retry_pacer = Box::new(pacer);
        self
    }

    /// Identifiers of listed assets whose type is HDRI, in listing order.
    ///
    /// The catalog answers with an object keyed by identifier, so each one
    /// appears once. Every kept entry would map to the same `hdri` tag, so
    /// only the ordered keys are returned. Any failure is logged and yields an
    /// empty list.
    pub async fn list_hdri_assets(&self) -> Vec<String> {
        let assets = match self.catalog.assets().await {
            Ok(assets) => assets,
            Err(e) => {
                error!("Failed to list assets: {e}");
                if let CatalogError::Api { status, message } = &e {
                    error!("Response status code: {status}");
                    error!("Response text: {message}");
                }
                return Vec::new();
            }
        };

        let ids: Vec<String> = assets
            .into_iter()
            .filter(|(_, summary)| {
                serde_json::from_value::<AssetSummary>(summary.clone())
                    .is_ok_and(|s| s.is_hdri())
            })
            .map(|(id, _)| id)
            .collect();

        info!("Found {} HDRIs", ids.len());
        if !ids.is_empty() {
            let sample = &ids[..ids.len().min(SAMPLE_ID_COUNT)];
            info!("Sample HDRI IDs: {sample:?}");
        }

        ids
    }

    /// Fetch and assemble the metadata record for `id`.
    ///
    /// A 404 is retried once under `{id}{fallback_suffix}`; a second 404 is
    /// final. Transport failures and unexpected statuses are retried up to
    /// `max_retries` attempts in total with a pause between attempts.
    pub async fn fetch_asset_info(&self, id: &str) -> Result<AssetMetadata> {
        self.fetch_asset_info_with_retries(id, self.config.max_retries).await
    }

    /// Like [`Self::fetch_asset_info`] with an explicit attempt budget
    pub async fn fetch_asset_info_with_retries(
        &self,
        id: &str,
        max_retries: u32,
    ) -> Result<AssetMetadata> {
        let max_attempts = max_retries.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(id).await {
                Ok(record) => return Ok(record),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    info!("Retrying {id} (attempt {attempt}/{max_attempts}): {e}");
                    self.retry_pacer.pause().await;
                    attempt += 1;
                }
                Err(e) if e.is_retryable() => {
                    warn!("Failed to fetch {id} after {max_attempts} attempts: {e}");
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Write the collection as pretty-printed UTF-8 JSON.
    ///
    /// Returns `false` after logging if serialization or the write fails.
    pub async fn persist(collection: &MetadataCollection, path: &Path) -> bool {
        let json = match serde_json::to_string_pretty(collection) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize metadata: {e}");
                return false;
            }
        };

        match tokio::fs::write(path, json).await {
            Ok(()) => {
                info!("Saved metadata to {}", path.display());
                true
            }
            Err(e) => {
                error!("Failed to write {}: {e}", path.display());
                false
            }
        }
    }

    /// List, fetch up to `max_assets` records one by one, then persist once
    pub async fn run(&self) -> HarvestReport {
        info!("Starting HDRI metadata collection");

        let ids = self.list_hdri_assets().await;
        let mut report = HarvestReport {
            listed: ids.len(),
            ..Default::default()
        };

        if ids.is_empty() {
            error!("No HDRI assets found");
            return report;
        }

        let total = ids.len();
        for (idx, id) in ids.iter().take(self.config.max_assets).enumerate() {
            info!("Processing {}/{total}: {id}", idx + 1);
            report.attempted += 1;

            match self.fetch_asset_info(id).await {
                Ok(record) => {
                    info!("Fetched: {}", record.name);
                    report.collection.insert(id.clone(), record);
                }
                Err(e) => {
                    warn!("Failed to fetch {id}: {e}");
                    report.failed.push(id.clone());
                }
            }

            self.pacer.pause().await;
        }

        info!(
            "Successfully processed {} out of {total} HDRIs",
            report.collection.len()
        );

        if report.collection.is_empty() {
            error!("No data collected");
            return report;
        }

        report.persisted = Self::persist(&report.collection, &self.config.output).await;
        if report.persisted {
            info!("Collected metadata for {} HDRIs", report.collection.len());
            log_output_sample(&report.collection, &self.config.output);
        } else {
            error!("Failed to save metadata");
        }

        report
    }

    /// One attempt: info lookup with fallback, then the best-effort file listing
    async fn fetch_once(&self, id: &str) -> Result<AssetMetadata> {
        let (resolved_id, info) = match self.catalog.info(id).await {
            Ok(info) => (id.to_string(), info),
            Err(CatalogError::NotFound(_)) => {
                let fallback = format!("{id}{}", self.config.fallback_suffix);
                info!("Asset not found, trying {fallback}");

                match self.catalog.info(&fallback).await {
                    Ok(info) => (fallback, info),
                    Err(CatalogError::NotFound(url)) => {
                        warn!("Asset not found: {fallback}");
                        return Err(CatalogError::NotFound(url));
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };

        let files = match self.catalog.files(&resolved_id).await {
            Ok(files) => files,
            Err(e @ CatalogError::Network(_)) => return Err(e),
            Err(e) => {
                debug!("No file listing for {resolved_id}: {e}");
                Value::Object(serde_json::Map::new())
            }
        };

        Ok(self.assemble(&resolved_id, info, &files))
    }

    /// Build a record, filling every field the catalog left out
    fn assemble(&self, id: &str, info: AssetInfo, files: &Value) -> AssetMetadata {
        let authors = info
            .authors
            .filter(|authors| !authors.is_empty())
            .unwrap_or_else(|| {
                IndexMap::from([(UNKNOWN_AUTHOR.0.to_string(), UNKNOWN_AUTHOR.1.to_string())])
            });

        AssetMetadata {
            name: info.name.unwrap_or_else(|| display_name_from_id(id)),
            asset_type: HDRI_TYPE_TAG,
            date_published: info.date_published.unwrap_or(0),
            download_count: info.download_count.unwrap_or(0),
            files_hash: info.files_hash.unwrap_or_default(),
            authors,
            categories: info.categories.unwrap_or_default(),
            tags: info.tags.unwrap_or_default(),
            max_resolution: max_file_resolution(files)
                .unwrap_or(self.config.default_max_resolution),
            dimensions: self.config.placeholder_dimensions,
            thumbnail_url: info.thumbnail_url.unwrap_or_else(|| {
                format!("{}/{id}.png?width=256&height=256", self.thumbnail_base_url)
            }),
        }
    }
}

fn log_output_sample(collection: &MetadataCollection, output: &Path) {
    let shown = std::path::absolute(output).unwrap_or_else(|_| output.to_path_buf());
    info!("Output file: {}", shown.display());

    if let Some(sample) = collection.values().next()
        && let Ok(json) = serde_json::to_string_pretty(sample)
    {
        info!("Sample HDRI data:\n{json}");
    }
}
