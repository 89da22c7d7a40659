use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("failed to decode image {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("failed to encode image {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
