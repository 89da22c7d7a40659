use chrono::{DateTime, Utc};
use smart_default::SmartDefault;
use std::fmt;

/// Bucket metadata snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketMeta {
    pub name: String,
    pub location: String,
    pub created: Option<DateTime<Utc>>,
    pub owner: Option<String>,
}

/// Object metadata as returned by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub content_type: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub etag: Option<String>,
}

impl ObjectMeta {
    pub fn new(key: impl Into<String>, size: u64, content_type: Option<&str>) -> Self {
        Self {
            key: key.into(),
            size,
            content_type: content_type.map(str::to_string),
            last_modified: None,
            etag: None,
        }
    }
}

/// Continuation cursor of a listing; never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageToken(String);

impl PageToken {
    /// Normalize a raw token from a list response.
    ///
    /// The JSON API reports the last page with an absent token while the
    /// gRPC API uses an empty string. Both map to `None`.
    pub fn from_response<S: Into<String>>(raw: Option<S>) -> Option<Self> {
        raw.map(Into::into)
            .filter(|token| !token.is_empty())
            .map(PageToken)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListPage {
    pub objects: Vec<ObjectMeta>,
    pub next_page_token: Option<PageToken>,
}

impl ListPage {
    /// No further page follows this one
    pub fn is_last(&self) -> bool {
        self.next_page_token.is_none()
    }
}

/// Listing options
#[derive(Debug, Clone, SmartDefault)]
pub struct ListOptions {
    pub prefix: Option<String>,
    /// Page size hint; `None` leaves it to the service
    pub page_size: Option<u32>,
}

/// Upload options
#[derive(Debug, Clone, SmartDefault)]
pub struct PutOptions {
    pub content_type: Option<String>,
    /// Canned ACL applied to the new object, e.g. "publicRead".
    /// `None` keeps the bucket's default object ACL.
    pub predefined_acl: Option<String>,
}

impl PutOptions {
    pub fn with_content_type(content_type: impl Into<String>) -> Self {
        Self {
            content_type: Some(content_type.into()),
            ..Default::default()
        }
    }

    pub fn with_predefined_acl(mut self, acl: Option<String>) -> Self {
        self.predefined_acl = acl;
        self
    }
}
