use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

use crate::oss::{
    BucketMeta, ListOptions, ListPage, ObjectMeta, ObjectStore, ObjectStoreError, PageToken,
    PutOptions,
};

/// In-process bucket configuration
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct MemoryObjectStoreConfig {
    /// Name reported by `get_bucket`
    #[garde(length(min = 1))]
    #[default = "memory"]
    pub bucket: String,

    /// Location reported by `get_bucket`
    #[garde(skip)]
    #[default = "LOCAL"]
    pub location: String,

    /// Objects per page when the caller gives no page size
    #[garde(range(min = 1))]
    #[default = 1000]
    pub page_size: u32,

    /// Local directory copied into the bucket on startup, keyed by relative path
    #[garde(skip)]
    pub seed_dir: Option<String>,
}

struct StoredObject {
    data: Bytes,
    meta: ObjectMeta,
}

/// Bucket kept in a sorted map; listing order is key order
pub struct MemoryObjectStore {
    config: MemoryObjectStoreConfig,
    created: DateTime<Utc>,
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub async fn new(config: MemoryObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        if let Err(errors) = config.validate() {
            return Err(ObjectStoreError::Configuration(format!("{}", errors)));
        }

        let store = Self {
            config,
            created: Utc::now(),
            objects: RwLock::new(BTreeMap::new()),
        };

        if let Some(ref seed_dir) = store.config.seed_dir {
            let seed_dir = shellexpand::tilde(seed_dir).to_string();
            let count = store.seed(Path::new(&seed_dir)).await?;
            debug!(bucket = %store.config.bucket, seed_dir = %seed_dir, count, "seeded memory bucket");
        }

        Ok(store)
    }

    /// Number of objects currently stored
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    async fn seed(&self, dir: &Path) -> Result<usize, ObjectStoreError> {
        let metadata = tokio::fs::metadata(dir).await.map_err(|_| {
            ObjectStoreError::Configuration(format!("seed directory not found: {}", dir.display()))
        })?;
        if !metadata.is_dir() {
            return Err(ObjectStoreError::Configuration(format!(
                "seed path is not a directory: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        collect_files_recursive(dir, dir, &mut files).await?;

        for rel_path in &files {
            self.put_file(rel_path, &dir.join(rel_path), PutOptions::default())
                .await?;
        }

        Ok(files.len())
    }
}

/// Collect relative paths of all regular files, using `/` as separator
async fn collect_files_recursive(
    base_dir: &Path,
    current_dir: &Path,
    files: &mut Vec<String>,
) -> Result<(), ObjectStoreError> {
    let mut entries = tokio::fs::read_dir(current_dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let metadata = entry.metadata().await?;

        if metadata.is_file() {
            let rel_path = path
                .strip_prefix(base_dir)
                .map_err(|e| ObjectStoreError::InvalidInput(e.to_string()))?
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            files.push(rel_path);
        } else if metadata.is_dir() {
            Box::pin(collect_files_recursive(base_dir, &path, files)).await?;
        }
    }

    Ok(())
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn get_bucket(&self) -> Result<BucketMeta, ObjectStoreError> {
        Ok(BucketMeta {
            name: self.config.bucket.clone(),
            location: self.config.location.clone(),
            created: Some(self.created),
            owner: None,
        })
    }

    async fn list_page(
        &self,
        options: &ListOptions,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage, ObjectStoreError> {
        let page_size = options.page_size.unwrap_or(self.config.page_size).max(1) as usize;
        let prefix = options.prefix.as_deref().unwrap_or("");

        let lower = match page_token {
            Some(token) => Bound::Excluded(token.as_str().to_string()),
            None => Bound::Unbounded,
        };

        let objects = self.objects.read().await;
        let mut matching = objects
            .range::<String, _>((lower, Bound::Unbounded))
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, stored)| stored.meta.clone());

        let page: Vec<ObjectMeta> = matching.by_ref().take(page_size).collect();
        let has_more = matching.next().is_some();

        let next_page_token = if has_more {
            PageToken::from_response(page.last().map(|meta| meta.key.clone()))
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            next_page_token,
        })
    }

    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutOptions,
    ) -> Result<(), ObjectStoreError> {
        if key.is_empty() {
            return Err(ObjectStoreError::InvalidInput("empty object key".to_string()));
        }

        let meta = ObjectMeta {
            key: key.to_string(),
            size: value.len() as u64,
            content_type: options.content_type,
            last_modified: Some(Utc::now()),
            etag: None,
        };

        self.objects
            .write()
            .await
            .insert(key.to_string(), StoredObject { data: value, meta });
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        self.objects
            .read()
            .await
            .get(key)
            .map(|stored| stored.data.clone())
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ObjectStoreError::NotFound {
                key: key.to_string(),
            })
    }
}
