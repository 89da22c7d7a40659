use tracing::debug;

use crate::oss::{ListOptions, ObjectMeta, ObjectStore, ObjectStoreError};

/// Full-bucket enumeration over `ObjectStore::list_page`.
///
/// The result is a point-in-time view: objects written or deleted while the
/// listing runs may or may not show up. The first failing page aborts the
/// listing; nothing is retried.
pub struct BucketLister<'a> {
    store: &'a dyn ObjectStore,
    options: ListOptions,
}

impl<'a> BucketLister<'a> {
    pub fn new(store: &'a dyn ObjectStore, options: ListOptions) -> Self {
        Self { store, options }
    }

    /// All objects in listing order, each exactly once
    pub async fn list_all(&self) -> Result<Vec<ObjectMeta>, ObjectStoreError> {
        let mut result = Vec::new();
        let mut page_token = None;
        let mut page_number = 0usize;

        loop {
            let page = self
                .store
                .list_page(&self.options, page_token.as_ref())
                .await?;
            page_number += 1;

            debug!(
                bucket = %self.store.bucket(),
                page = page_number,
                count = page.objects.len(),
                last = page.is_last(),
                "listed page"
            );

            let last = page.is_last();
            result.extend(page.objects);
            if last {
                break;
            }
            page_token = page.next_page_token;
        }

        Ok(result)
    }
}
