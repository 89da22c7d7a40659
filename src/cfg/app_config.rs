use anyhow::{anyhow, Context, Result};
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::path::PathBuf;

use crate::cfg::load_file;
use crate::log::LogConfig;
use crate::oss::StoreConfig;
use crate::pipeline::PipelineConfig;

/// Top-level configuration
///
/// ```yaml
/// store:
///   type: gcs
///   bucket: laykart-165108.appspot.com
///   service_account_key_path: ${HOME}/keys/storage.json
/// pipeline:
///   target_object: leyKart-images/B1/G1.png
///   resize: { width: 100, height: 50, quality: 85 }
///   image_source: { type: authenticated }
/// log:
///   level: debug
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, SmartDefault, Validate, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    #[garde(skip)]
    pub store: StoreConfig,

    #[garde(dive)]
    pub pipeline: PipelineConfig,

    #[garde(skip)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from file.
    ///
    /// An explicit path must exist. The default path (~/.gcs-resizer/config.yaml)
    /// is optional and built-in defaults apply when it is missing.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let config = match config_path {
            Some(p) => {
                let path = PathBuf::from(shellexpand::tilde(p).to_string());
                if !path.exists() {
                    return Err(anyhow!("Config file not found: {}", path.display()));
                }
                load_file(&path)?
            }
            None => {
                let path = Self::default_config_path()?;
                if path.exists() {
                    load_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.check()?;
        Ok(config)
    }

    /// Get default config path (~/.gcs-resizer/config.yaml)
    pub fn default_config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".gcs-resizer").join("config.yaml"))
    }

    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|errors| anyhow!("Invalid configuration: {}", errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oss::MemoryObjectStoreConfig;
    use crate::pipeline::ImageSourceConfig;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.store.bucket(), "laykart-165108.appspot.com");
        assert_eq!(config.log.level, "info");
        assert!(config.check().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_yaml_with_env() {
        std::env::set_var("GCS_RESIZER_TEST_BUCKET", "env-bucket");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            r#"
store:
  type: memory
  bucket: ${GCS_RESIZER_TEST_BUCKET}
  page_size: 5
pipeline:
  target_object: images/a.png
  required_content_type: null
  resize:
    width: 125
    height: 75
  derived_prefix: resizedImage_125X75
  image_source:
    type: authenticated
  test_upload:
    delete_after: true
log:
  level: debug
  format: json
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        std::env::remove_var("GCS_RESIZER_TEST_BUCKET");

        assert_eq!(
            config.store,
            StoreConfig::Memory(MemoryObjectStoreConfig {
                bucket: "env-bucket".to_string(),
                page_size: 5,
                ..Default::default()
            })
        );
        assert_eq!(config.pipeline.target_object, "images/a.png");
        assert!(config.pipeline.required_content_type.is_none());
        assert_eq!((config.pipeline.resize.width, config.pipeline.resize.height), (125, 75));
        assert_eq!(config.pipeline.derived_prefix, "resizedImage_125X75");
        assert_eq!(config.pipeline.image_source, ImageSourceConfig::Authenticated);
        assert!(config.pipeline.test_upload.delete_after);
        assert!(config.pipeline.test_upload.enabled);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[store]
type = "gcs"
bucket = "toml-bucket"
anonymous = true

[pipeline.list]
prefix = "leyKart-images/"
page_size = 100
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.store.bucket(), "toml-bucket");
        assert_eq!(config.pipeline.list.prefix.as_deref(), Some("leyKart-images/"));
        assert_eq!(config.pipeline.list.page_size, Some(100));
    }

    #[test]
    fn test_load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ pipeline: { resize: { width: 0 } } }"#).unwrap();

        let err = AppConfig::load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let err = AppConfig::load(Some("/nonexistent/gcs-resizer.yaml")).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
