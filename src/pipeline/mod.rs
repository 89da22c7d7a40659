//! Bucket walk and resize pipeline
//!
//! `Driver` fetches bucket metadata, lists every object through `BucketLister`,
//! hands each record to `ObjectProcessor` and finally uploads a small test object.

mod config;
mod driver;
mod error;
mod lister;
mod processor;
mod source;

pub use config::{
    ImageSourceConfig, ListConfig, PipelineConfig, ResizeConfig, TestUploadConfig,
    DEFAULT_PUBLIC_BASE_URL,
};
pub use driver::{Driver, RunReport};
pub use error::PipelineError;
pub use lister::BucketLister;
pub use processor::{EligibilityPolicy, ObjectProcessor};
pub use source::ImageSource;
