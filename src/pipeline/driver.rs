use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

use crate::oss::{BucketMeta, ObjectStore, PutOptions};
use crate::pipeline::{BucketLister, ImageSource, ObjectProcessor, PipelineConfig, PipelineError};
use crate::transform::ImageTransformer;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub bucket: BucketMeta,
    pub objects_listed: usize,
    /// Keys of the derived objects written
    pub transformed: Vec<String>,
    pub test_object: Option<String>,
    pub test_object_deleted: bool,
}

/// Runs bucket metadata, listing, per-object processing and the test upload in order.
///
/// Every step is awaited before the next starts. The first error ends the run;
/// derived objects already written stay in the bucket.
pub struct Driver {
    store: Arc<dyn ObjectStore>,
    processor: ObjectProcessor,
    config: PipelineConfig,
}

impl Driver {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        transformer: Arc<dyn ImageTransformer>,
        config: PipelineConfig,
    ) -> Self {
        let source = ImageSource::from_config(&config.image_source);
        let processor = ObjectProcessor::new(store.clone(), source, transformer, &config);
        Self {
            store,
            processor,
            config,
        }
    }

    /// Run with the human-readable summary on stdout
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut stdout = std::io::stdout();
        self.run_with_output(&mut stdout).await
    }

    pub async fn run_with_output<W: Write + Send>(
        &self,
        out: &mut W,
    ) -> Result<RunReport, PipelineError> {
        let bucket = self.store.get_bucket().await?;
        writeln!(out, "name: {}", bucket.name)?;
        writeln!(out, "location: {}", bucket.location)?;
        writeln!(
            out,
            "timeCreated: {}",
            bucket
                .created
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        )?;
        writeln!(out, "owner: {}", bucket.owner.as_deref().unwrap_or("-"))?;

        let objects = BucketLister::new(self.store.as_ref(), self.config.list.to_options())
            .list_all()
            .await?;
        info!(bucket = %bucket.name, count = objects.len(), "listed bucket");

        if objects.is_empty() {
            writeln!(
                out,
                "There were no objects in the given bucket; try adding some and re-running."
            )?;
        }

        let mut transformed = Vec::new();
        for meta in &objects {
            writeln!(out, "{} ({} bytes)", meta.key, meta.size)?;
            writeln!(
                out,
                "content type: {}",
                meta.content_type.as_deref().unwrap_or("-")
            )?;

            if let Some(derived_key) = self.processor.process(meta).await? {
                writeln!(out, "resized {} -> {}", meta.key, derived_key)?;
                transformed.push(derived_key);
            }
        }

        if transformed.is_empty() {
            warn!(
                target_object = %self.processor.policy().target_object,
                "no eligible object found"
            );
        }

        let (test_object, test_object_deleted) = if self.config.test_upload.enabled {
            let key = self.upload_test_object().await?;
            writeln!(out, "uploaded {}", key)?;

            let deleted = if self.config.test_upload.delete_after {
                self.store.delete_object(&key).await?;
                writeln!(out, "deleted {}", key)?;
                true
            } else {
                false
            };
            (Some(key), deleted)
        } else {
            (None, false)
        };

        Ok(RunReport {
            bucket,
            objects_listed: objects.len(),
            transformed,
            test_object,
            test_object_deleted,
        })
    }

    /// Write the sample content to a temp file and upload it; the file is removed on drop
    async fn upload_test_object(&self) -> Result<String, PipelineError> {
        let upload = &self.config.test_upload;

        let mut temp_file = tempfile::Builder::new()
            .prefix("gcs-resizer")
            .suffix(".txt")
            .tempfile()?;
        temp_file.write_all(upload.content.as_bytes())?;
        temp_file.flush()?;

        self.store
            .put_file(
                &upload.object_name,
                temp_file.path(),
                PutOptions::with_content_type(upload.content_type.clone())
                    .with_predefined_acl(self.config.upload_acl.clone()),
            )
            .await?;

        info!(key = %upload.object_name, "uploaded test object");
        Ok(upload.object_name.clone())
    }
}
