// API reference:
// google-cloud-storage crate: https://docs.rs/google-cloud-storage/latest/google_cloud_storage/
// GCP docs: https://cloud.google.com/storage/docs
// GCP Rust SDK: https://docs.cloud.google.com/rust

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use garde::Validate;
use google_cloud_auth::credentials::{anonymous, service_account, Credentials};
use google_cloud_gax::error::rpc::Code;
use google_cloud_storage::client::{Storage, StorageControl};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::fmt;
use tracing::debug;

use crate::oss::{
    BucketMeta, ListOptions, ListPage, ObjectMeta, ObjectStore, ObjectStoreError, PageToken,
    PutOptions,
};

const PROVIDER: &str = "GCP GCS";

/// GCP GCS configuration
///
/// Credentials are resolved in this order:
/// 1. `service_account_key_json` - inline service account JSON
/// 2. `service_account_key_path` - path to a service account key file
/// 3. `anonymous` - no credentials, for public buckets and emulators
/// 4. application default credentials:
///    - the file named by `GOOGLE_APPLICATION_CREDENTIALS`
///    - `~/.config/gcloud/application_default_credentials.json`
///    - the GCE/GKE metadata server
#[derive(Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct GcpGcsObjectStoreConfig {
    /// Bucket name without the `gs://` scheme
    #[garde(length(min = 1))]
    #[default = "laykart-165108.appspot.com"]
    pub bucket: String,

    /// Path to a service account key file; `~` is expanded
    #[garde(skip)]
    pub service_account_key_path: Option<String>,

    /// Service account key JSON content, usually `${GCS_KEY_JSON}`; never logged
    #[garde(skip)]
    pub service_account_key_json: Option<String>,

    /// Send requests without credentials
    #[garde(skip)]
    #[default = false]
    pub anonymous: bool,

    /// Custom endpoint, e.g. fake-gcs-server
    #[garde(skip)]
    pub endpoint: Option<String>,
}

impl fmt::Debug for GcpGcsObjectStoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpGcsObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("service_account_key_path", &self.service_account_key_path)
            .field(
                "service_account_key_json",
                &self.service_account_key_json.as_ref().map(|_| "..."),
            )
            .field("anonymous", &self.anonymous)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// GCP GCS implementation
///
/// Object data goes through `Storage`, metadata and listing through `StorageControl`.
pub struct GcpGcsObjectStore {
    storage: Storage,
    control: StorageControl,
    config: GcpGcsObjectStoreConfig,
}

impl GcpGcsObjectStore {
    pub async fn new(config: GcpGcsObjectStoreConfig) -> Result<Self, ObjectStoreError> {
        if let Err(errors) = config.validate() {
            return Err(ObjectStoreError::Configuration(format!("{}", errors)));
        }

        let credentials = Self::credentials(&config)?;

        let mut storage_builder = Storage::builder();
        let mut control_builder = StorageControl::builder();
        if let Some(credentials) = credentials {
            storage_builder = storage_builder.with_credentials(credentials.clone());
            control_builder = control_builder.with_credentials(credentials);
        }
        if let Some(ref endpoint) = config.endpoint {
            storage_builder = storage_builder.with_endpoint(endpoint.clone());
            control_builder = control_builder.with_endpoint(endpoint.clone());
        }

        let storage = storage_builder
            .build()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "build storage client"))?;
        let control = control_builder
            .build()
            .await
            .map_err(|e| ObjectStoreError::from_provider(e, PROVIDER, "build control client"))?;

        debug!(bucket = %config.bucket, "gcs client ready");

        Ok(Self {
            storage,
            control,
            config,
        })
    }

    /// `None` falls back to application default credentials
    fn credentials(
        config: &GcpGcsObjectStoreConfig,
    ) -> Result<Option<Credentials>, ObjectStoreError> {
        let key_json = if let Some(ref json_content) = config.service_account_key_json {
            Some(json_content.clone())
        } else if let Some(ref key_path) = config.service_account_key_path {
            let key_path = shellexpand::tilde(key_path).to_string();
            let json_content = std::fs::read_to_string(&key_path).map_err(|e| {
                ObjectStoreError::Configuration(format!(
                    "failed to read service account key {}: {}",
                    key_path, e
                ))
            })?;
            Some(json_content)
        } else {
            None
        };

        if let Some(json_content) = key_json {
            let key: serde_json::Value = serde_json::from_str(&json_content).map_err(|e| {
                ObjectStoreError::Configuration(format!(
                    "failed to parse service account key: {}",
                    e
                ))
            })?;
            let credentials = service_account::Builder::new(key).build().map_err(|e| {
                ObjectStoreError::Authentication(format!(
                    "failed to build service account credentials: {}",
                    e
                ))
            })?;
            return Ok(Some(credentials));
        }

        if config.anonymous {
            return Ok(Some(anonymous::Builder::new().build()));
        }

        Ok(None)
    }

    /// Resource name the v2 API expects for the bucket
    fn bucket_path(&self) -> String {
        format!("projects/_/buckets/{}", self.config.bucket)
    }
}

/// JSON/HTTP calls report a missing resource as 404, control-plane gRPC calls as `NotFound`
fn is_not_found(err: &google_cloud_storage::Error) -> bool {
    err.http_status_code() == Some(404)
        || err
            .status()
            .is_some_and(|status| matches!(status.code, Code::NotFound))
}

fn map_error(err: google_cloud_storage::Error, context: &str, key: &str) -> ObjectStoreError {
    if is_not_found(&err) {
        return ObjectStoreError::NotFound {
            key: key.to_string(),
        };
    }
    ObjectStoreError::from_provider(err, PROVIDER, context)
}

fn to_datetime(ts: &google_cloud_wkt::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts.seconds(), ts.nanos().max(0) as u32)
}

fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|v| !v.is_empty())
}

fn to_object_meta(object: google_cloud_storage::model::Object) -> ObjectMeta {
    let last_modified = object.update_time.as_ref().and_then(to_datetime);
    ObjectMeta {
        key: object.name,
        size: object.size.max(0) as u64,
        content_type: non_empty(object.content_type),
        last_modified,
        etag: non_empty(object.etag),
    }
}

#[async_trait]
impl ObjectStore for GcpGcsObjectStore {
    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    async fn get_bucket(&self) -> Result<BucketMeta, ObjectStoreError> {
        let bucket = self
            .control
            .get_bucket()
            .set_name(self.bucket_path())
            .send()
            .await
            .map_err(|e| map_error(e, "get_bucket", &self.config.bucket))?;

        Ok(BucketMeta {
            name: self.config.bucket.clone(),
            location: bucket.location,
            created: bucket.create_time.as_ref().and_then(to_datetime),
            owner: bucket.owner.and_then(|owner| non_empty(owner.entity)),
        })
    }

    async fn list_page(
        &self,
        options: &ListOptions,
        page_token: Option<&PageToken>,
    ) -> Result<ListPage, ObjectStoreError> {
        let mut request = self.control.list_objects().set_parent(self.bucket_path());
        if let Some(ref prefix) = options.prefix {
            request = request.set_prefix(prefix.clone());
        }
        if let Some(page_size) = options.page_size {
            request = request.set_page_size(i32::try_from(page_size).unwrap_or(i32::MAX));
        }
        if let Some(token) = page_token {
            request = request.set_page_token(token.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| map_error(e, "list_objects", &self.config.bucket))?;

        Ok(ListPage {
            objects: response.objects.into_iter().map(to_object_meta).collect(),
            next_page_token: PageToken::from_response(Some(response.next_page_token)),
        })
    }

    async fn put_object(
        &self,
        key: &str,
        value: Bytes,
        options: PutOptions,
    ) -> Result<(), ObjectStoreError> {
        let content_type = options
            .content_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut request = self
            .storage
            .write_object(self.bucket_path(), key, value)
            .set_content_type(content_type);
        if let Some(acl) = options.predefined_acl {
            request = request.set_predefined_acl(acl);
        }

        request
            .send_buffered()
            .await
            .map_err(|e| map_error(e, "write_object", key))?;

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let mut reader = self
            .storage
            .read_object(self.bucket_path(), key)
            .send()
            .await
            .map_err(|e| map_error(e, "read_object", key))?;

        let mut content = Vec::new();
        while let Some(chunk) = reader
            .next()
            .await
            .transpose()
            .map_err(|e| map_error(e, "read_object", key))?
        {
            content.extend_from_slice(&chunk);
        }

        Ok(Bytes::from(content))
    }

    async fn delete_object(&self, key: &str) -> Result<(), ObjectStoreError> {
        self.control
            .delete_object()
            .set_bucket(self.bucket_path())
            .set_object(key)
            .send()
            .await
            .map_err(|e| map_error(e, "delete_object", key))?;

        Ok(())
    }
}
