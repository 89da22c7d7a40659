// gcs-resizer - bucket walk and image resize over Cloud Storage

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use cli::{Cli, SourceArg};
use gcs_resizer::cfg::AppConfig;
use gcs_resizer::log::init_subscriber;
use gcs_resizer::oss::{create_object_store, ObjectStoreError};
use gcs_resizer::pipeline::{Driver, ImageSourceConfig, PipelineError, RunReport};
use gcs_resizer::transform::JpegResizer;

/// Fold command line overrides into the loaded configuration
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(ref bucket) = cli.bucket {
        config.store.set_bucket(bucket.clone());
    }
    if let Some(ref level) = cli.log_level {
        config.log.level = level.clone();
    }
    match cli.source {
        Some(SourceArg::Authenticated) => {
            config.pipeline.image_source = ImageSourceConfig::Authenticated;
        }
        Some(SourceArg::PublicUrl) => {
            if !matches!(config.pipeline.image_source, ImageSourceConfig::PublicUrl { .. }) {
                config.pipeline.image_source = ImageSourceConfig::default();
            }
        }
        None => {}
    }
    if cli.no_test_upload {
        config.pipeline.test_upload.enabled = false;
    }
}

async fn run(cli: Cli) -> Result<RunReport> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    apply_overrides(&mut config, &cli);
    config.check()?;

    init_subscriber(&config.log)?;

    let store = create_object_store(&config.store)
        .await
        .with_context(|| format!("Failed to create store for bucket {}", config.store.bucket()))?;
    let transformer = Arc::new(JpegResizer::new(config.pipeline.resize.jpeg.clone()));

    let driver = Driver::new(store, transformer, config.pipeline.clone());
    let report = driver.run().await?;

    info!(
        bucket = %report.bucket.name,
        listed = report.objects_listed,
        transformed = report.transformed.len(),
        "run finished"
    );
    Ok(report)
}

/// I/O-class failures are storage, network and filesystem errors; everything else is "other"
fn is_io_failure(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(err) = cause.downcast_ref::<PipelineError>() {
            return err.is_io_class();
        }
        if let Some(err) = cause.downcast_ref::<ObjectStoreError>() {
            return err.is_io_class();
        }
        cause.is::<std::io::Error>()
    })
}

/// 0 on success, 1 on any failure
fn exit_code(result: &Result<RunReport>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(1),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli).await;
    if let Err(ref err) = result {
        if is_io_failure(err) {
            eprintln!("I/O failure: {}", err);
        } else {
            eprintln!("failure: {}", err);
        }
        eprintln!("{:?}", err);
    }

    exit_code(&result)
}
