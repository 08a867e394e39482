//! Command-line tools for the Poly Haven HDRI catalog: a binary downloader
//! and a metadata harvester that writes one JSON document per run.

pub mod catalog;
pub mod config;
pub mod downloader;
pub mod harvester;
pub mod logging;
pub mod pacing;
pub mod types;

pub use crate::catalog::{CatalogClient, CatalogError, HttpClient};
pub use crate::config::Settings;
pub use downloader::{AssetDownloader, DownloadReport, FetchOutcome, build_download_links};
pub use harvester::{HarvestReport, MetadataHarvester};
pub use pacing::{FixedDelay, Pacer};
pub use types::{AssetMetadata, FileFormat, MetadataCollection, Resolution};

#[cfg(test)]
mod test_support;
