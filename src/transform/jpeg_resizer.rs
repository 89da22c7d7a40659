use bytes::Bytes;
use garde::Validate;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use std::io::Cursor;

use crate::transform::{ImageTransformer, TransformError, TransformRequest, TransformedImage};

#[derive(Debug, Deserialize, Serialize, SmartDefault, Clone, Validate, PartialEq)]
#[serde(default)]
pub struct JpegResizerConfig {
    /// JPEG quality, 1-100
    #[garde(range(min = 1, max = 100))]
    #[default = 85]
    pub quality: u8,
}

/// Resizes to exact dimensions with Lanczos3 and encodes as JPEG.
///
/// Aspect ratio is not preserved; the output is exactly `width` x `height`.
#[derive(Debug, Clone)]
pub struct JpegResizer {
    config: JpegResizerConfig,
}

impl JpegResizer {
    pub fn new(config: JpegResizerConfig) -> Self {
        Self { config }
    }
}

impl Default for JpegResizer {
    fn default() -> Self {
        Self::new(JpegResizerConfig::default())
    }
}

impl ImageTransformer for JpegResizer {
    fn resize(&self, request: &TransformRequest) -> Result<TransformedImage, TransformError> {
        if request.width == 0 || request.height == 0 {
            return Err(TransformError::InvalidDimensions {
                width: request.width,
                height: request.height,
            });
        }

        let img = image::load_from_memory(&request.data).map_err(|source| {
            TransformError::Decode {
                name: request.name.clone(),
                source,
            }
        })?;

        let resized = img.resize_exact(request.width, request.height, FilterType::Lanczos3);

        // JPEG has no alpha channel
        let mut buf = Cursor::new(Vec::new());
        let encoder = JpegEncoder::new_with_quality(&mut buf, self.config.quality);
        resized
            .to_rgb8()
            .write_with_encoder(encoder)
            .map_err(|source| TransformError::Encode {
                name: request.name.clone(),
                source,
            })?;

        Ok(TransformedImage {
            data: Bytes::from(buf.into_inner()),
            content_type: "image/jpeg",
            width: request.width,
            height: request.height,
        })
    }
}
