use thiserror::Error;

/// Storage error shared by every `ObjectStore` implementation
#[derive(Error, Debug)]
pub enum ObjectStoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("provider error [{provider}]: {message}")]
    Provider {
        provider: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObjectStoreError {
    /// Wrap an SDK error together with the operation that produced it
    pub fn from_provider<E>(err: E, provider: &str, context: &str) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ObjectStoreError::Provider {
            provider: provider.to_string(),
            message: context.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Whether the failure came from talking to the service or the local disk,
    /// as opposed to bad input or configuration
    pub fn is_io_class(&self) -> bool {
        matches!(
            self,
            ObjectStoreError::Authentication(_)
                | ObjectStoreError::Network(_)
                | ObjectStoreError::Provider { .. }
                | ObjectStoreError::Io(_)
                | ObjectStoreError::NotFound { .. }
        )
    }
}
