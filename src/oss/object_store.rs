use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

use crate::oss::{BucketMeta, ListOptions, ListPage, ObjectStoreError, PageToken, PutOptions};

/// Storage interface bound to a single bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the bucket this store talks to
    fn bucket(&self) -> &str;

    /// Fetch bucket metadata
    async fn get_bucket(&self) -> Result<BucketMeta, ObjectStoreError>;

    /// Fetch one page of the listing, starting at `page_token` (`None` for the first page)
    async fn list_page(
        &self,
        options: &ListOptions,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage, ObjectStoreError>;

    /// Upload an object, replacing any existing one with the same key
    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutOptions,
    ) -> Result<(), ObjectStoreError>;

    /// Read the full object through the authenticated API
    async fn get_object(&self, key: &str) -> Result<Bytes, ObjectStoreError>;

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Upload a local file.
    ///
    /// Without an explicit content type one is guessed from the file extension.
    async fn put_file(
        &self,
        key: &str,
        local_path: &Path,
        options: PutOptions,
    ) -> Result<(), ObjectStoreError> {
        let data = tokio::fs::read(local_path).await?;

        let mut options = options;
        if options.content_type.is_none() {
            options.content_type = Some(
                mime_guess::from_path(local_path)
                    .first_or_octet_stream()
                    .to_string(),
            );
        }

        self.put_object(key, Bytes::from(data), options).await
    }
}
