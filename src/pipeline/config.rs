use garde::Validate;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

use crate::oss::ListOptions;
use crate::transform::JpegResizerConfig;

pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

/// Where the eligible image's bytes are read from
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSourceConfig {
    /// Unauthenticated GET on `{base_url}/{bucket}/{key}`; needs a publicly readable object
    PublicUrl {
        #[serde(default = "default_public_base_url")]
        base_url: String,
    },
    /// Read through the storage API with the store's credentials
    Authenticated,
}

fn default_public_base_url() -> String {
    DEFAULT_PUBLIC_BASE_URL.to_string()
}

impl Default for ImageSourceConfig {
    fn default() -> Self {
        ImageSourceConfig::PublicUrl {
            base_url: default_public_base_url(),
        }
    }
}

/// Output size and encoding of the derived image
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct ResizeConfig {
    /// Target width in pixels; the aspect ratio is not preserved
    #[garde(range(min = 1))]
    #[default = 100]
    pub width: u32,

    /// Target height in pixels
    #[garde(range(min = 1))]
    #[default = 50]
    pub height: u32,

    /// JPEG settings, read from the same level (`quality: 85`)
    #[serde(flatten)]
    #[garde(dive)]
    pub jpeg: JpegResizerConfig,
}

/// Bucket listing options
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct ListConfig {
    /// Only list keys starting with this prefix; `None` lists the whole bucket
    #[garde(skip)]
    pub prefix: Option<String>,

    /// Objects per list request; `None` leaves it to the service (1000 on GCS)
    #[garde(range(min = 1))]
    pub page_size: Option<u32>,
}

impl ListConfig {
    pub fn to_options(&self) -> ListOptions {
        ListOptions {
            prefix: self.prefix.clone(),
            page_size: self.page_size,
        }
    }
}

/// Small text object written at the end of a run
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct TestUploadConfig {
    /// `false` skips the upload entirely
    #[garde(skip)]
    #[default = true]
    pub enabled: bool,

    /// Destination key in the bucket
    #[garde(length(min = 1))]
    #[default = "json-test.txt"]
    pub object_name: String,

    /// Written to a temp file first, then uploaded from disk
    #[garde(skip)]
    #[default = "Sample file"]
    pub content: String,

    /// Content type sent with the upload
    #[garde(length(min = 1))]
    #[default = "text/plain"]
    pub content_type: String,

    /// Remove the object again once uploaded
    #[garde(skip)]
    #[default = false]
    pub delete_after: bool,
}

/// What gets resized, how, and where the result goes
#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Exact key of the only object that gets resized
    #[garde(length(min = 1))]
    #[default = "leyKart-images/B1/G1.png"]
    pub target_object: String,

    /// `None` disables the content type check
    #[garde(skip)]
    #[default(Some("image/png".to_string()))]
    pub required_content_type: Option<String>,

    /// Output size and JPEG quality
    #[garde(dive)]
    pub resize: ResizeConfig,

    /// Derived key is `derived_prefix + original key`
    #[garde(length(min = 1))]
    #[default = "resizedImage_100X50"]
    pub derived_prefix: String,

    /// Canned ACL for every object this run writes, e.g. "publicRead" so the
    /// derived image is reachable via its public URL.
    /// `None` keeps the bucket default; buckets with uniform bucket-level access reject any value.
    #[garde(pattern(
        r"^(authenticatedRead|bucketOwnerFullControl|bucketOwnerRead|private|projectPrivate|publicRead)$"
    ))]
    pub upload_acl: Option<String>,

    /// Public URL download or authenticated read
    #[garde(skip)]
    pub image_source: ImageSourceConfig,

    /// Listing prefix and page size
    #[garde(dive)]
    pub list: ListConfig,

    /// Test object written after the walk
    #[garde(dive)]
    pub test_upload: TestUploadConfig,
}
