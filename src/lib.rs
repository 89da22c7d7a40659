//! gcs-resizer - walk a Cloud Storage bucket and write resized copies of an image
//!
//! ## Modules
//!
//! - **oss**: object storage interface (GCP GCS, in-memory)
//! - **transform**: image decode/resize/encode
//! - **pipeline**: bucket listing, per-object processing and the run driver
//! - **cfg**: configuration loading
//! - **log**: tracing subscriber setup

pub mod cfg;
pub mod log;
pub mod oss;
pub mod pipeline;
pub mod transform;

pub use cfg::AppConfig;
pub use oss::{create_object_store, ObjectMeta, ObjectStore, ObjectStoreError, StoreConfig};
pub use pipeline::{Driver, PipelineConfig, PipelineError, RunReport};
pub use transform::{ImageTransformer, JpegResizer, TransformError};
