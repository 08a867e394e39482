use anyhow::{Context, Result};
use hdri_harvest::{AssetDownloader, Settings, logging};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("hdri-download: invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let _guard = match logging::init_logging(&settings.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("hdri-download: {e:#}");
            return ExitCode::from(2);
        }
    };

    match run(&settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("hdri-download error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns false when the catalog listed nothing to download.
async fn run(settings: &Settings) -> Result<bool> {
    let downloader = AssetDownloader::new(settings).context("failed to build HTTP client")?;
    let report = downloader
        .run(settings)
        .await
        .with_context(|| format!("failed to prepare {}", settings.download.output_dir().display()))?;

    Ok(report.listed > 0)
}
