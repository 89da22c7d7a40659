use thiserror::Error;

use crate::oss::ObjectStoreError;
use crate::transform::TransformError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] ObjectStoreError),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Network, auth and filesystem failures, as opposed to decode or input failures
    pub fn is_io_class(&self) -> bool {
        match self {
            PipelineError::Storage(err) => err.is_io_class(),
            PipelineError::Fetch { .. } | PipelineError::FetchStatus { .. } => true,
            PipelineError::Io(_) => true,
            PipelineError::Transform(_) => false,
        }
    }
}
