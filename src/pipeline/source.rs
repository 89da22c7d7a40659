use bytes::Bytes;
use tracing::debug;

use crate::oss::ObjectStore;
use crate::pipeline::{ImageSourceConfig, PipelineError};

/// Where object bytes are fetched from before transforming
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Plain HTTPS GET on the object's public URL, no credentials attached
    PublicUrl {
        client: reqwest::Client,
        base_url: String,
    },
    /// Authenticated read through the store
    Authenticated,
}

impl ImageSource {
    pub fn from_config(config: &ImageSourceConfig) -> Self {
        match config {
            ImageSourceConfig::PublicUrl { base_url } => ImageSource::PublicUrl {
                client: reqwest::Client::new(),
                base_url: base_url.clone(),
            },
            ImageSourceConfig::Authenticated => ImageSource::Authenticated,
        }
    }

    /// `{base_url}/{bucket}/{key}` with each key segment percent-encoded
    pub fn public_url(base_url: &str, bucket: &str, key: &str) -> String {
        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(bucket),
            encoded_key
        )
    }

    pub async fn fetch(&self, store: &dyn ObjectStore, key: &str) -> Result<Bytes, PipelineError> {
        match self {
            ImageSource::PublicUrl { client, base_url } => {
                let url = Self::public_url(base_url, store.bucket(), key);
                debug!(url = %url, "fetching public object");

                let response = client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|source| PipelineError::Fetch {
                        url: url.clone(),
                        source,
                    })?;

                let status = response.status();
                if !status.is_success() {
                    return Err(PipelineError::FetchStatus {
                        url,
                        status: status.as_u16(),
                    });
                }

                response
                    .bytes()
                    .await
                    .map_err(|source| PipelineError::Fetch { url, source })
            }
            ImageSource::Authenticated => {
                debug!(bucket = %store.bucket(), key = %key, "reading object through storage api");
                Ok(store.get_object(key).await?)
            }
        }
    }
}
