mod error;
mod jpeg_resizer;

pub use error::TransformError;
pub use jpeg_resizer::{JpegResizer, JpegResizerConfig};

use bytes::Bytes;

/// Raw bytes of one object plus the size it should be resized to
#[derive(Debug, Clone)]
pub struct TransformRequest {
    pub name: String,
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

/// Output of a transform
#[derive(Debug, Clone)]
pub struct TransformedImage {
    pub data: Bytes,
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Decode, resize and re-encode image bytes
pub trait ImageTransformer: Send + Sync {
    fn resize(&self, request: &TransformRequest) -> Result<TransformedImage, TransformError>;
}
