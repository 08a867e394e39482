use anyhow::{Context, Result};
use hdri_harvest::{MetadataHarvester, Settings, logging};
use std::process::ExitCode;
use std::time::Instant;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let started = Instant::now();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("hdri-metadata: invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let _guard = match logging::init_logging(&settings.log) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("hdri-metadata: {e:#}");
            return ExitCode::from(2);
        }
    };

    let code = match run(&settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("hdri-metadata error: {e:#}");
            ExitCode::FAILURE
        }
    };

    info!("Execution time: {:.2} seconds", started.elapsed().as_secs_f64());
    code
}

/// Returns false unless at least one record was collected and saved.
async fn run(settings: &Settings) -> Result<bool> {
    let harvester = MetadataHarvester::new(settings).context("failed to build HTTP client")?;
    let report = harvester.run().await;

    Ok(report.persisted)
}
