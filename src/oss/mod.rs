mod error;
mod gcp_gcs_object_store;
mod memory_object_store;
mod object_store;
mod object_store_types;

pub use error::ObjectStoreError;
pub use gcp_gcs_object_store::{GcpGcsObjectStore, GcpGcsObjectStoreConfig};
pub use memory_object_store::{MemoryObjectStore, MemoryObjectStoreConfig};
pub use object_store::ObjectStore;
pub use object_store_types::{BucketMeta, ListOptions, ListPage, ObjectMeta, PageToken, PutOptions};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Storage backend selection, tagged by `type`
///
/// ```yaml
/// store:
///   type: gcs
///   bucket: my-bucket
///   service_account_key_path: ~/keys/sa.json
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Gcs(GcpGcsObjectStoreConfig),
    Memory(MemoryObjectStoreConfig),
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Gcs(GcpGcsObjectStoreConfig::default())
    }
}

impl StoreConfig {
    pub fn bucket(&self) -> &str {
        match self {
            StoreConfig::Gcs(config) => &config.bucket,
            StoreConfig::Memory(config) => &config.bucket,
        }
    }

    pub fn set_bucket(&mut self, bucket: impl Into<String>) {
        let bucket = bucket.into();
        match self {
            StoreConfig::Gcs(config) => config.bucket = bucket,
            StoreConfig::Memory(config) => config.bucket = bucket,
        }
    }
}

/// Build the configured store
pub async fn create_object_store(
    config: &StoreConfig,
) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
    let store: Arc<dyn ObjectStore> = match config {
        StoreConfig::Gcs(config) => Arc::new(GcpGcsObjectStore::new(config.clone()).await?),
        StoreConfig::Memory(config) => Arc::new(MemoryObjectStore::new(config.clone()).await?),
    };
    Ok(store)
}
