use std::sync::Arc;
use tracing::{debug, info};

use crate::oss::{ObjectMeta, ObjectStore, PutOptions};
use crate::pipeline::{ImageSource, PipelineConfig, PipelineError};
use crate::transform::{ImageTransformer, TransformRequest};

/// Which listed objects get transformed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    pub target_object: String,
    pub required_content_type: Option<String>,
}

impl EligibilityPolicy {
    pub fn is_eligible(&self, meta: &ObjectMeta) -> bool {
        if meta.key != self.target_object {
            return false;
        }
        match self.required_content_type {
            Some(ref required) => meta.content_type.as_deref() == Some(required.as_str()),
            None => true,
        }
    }
}

/// Fetch, resize and re-upload for each eligible object
pub struct ObjectProcessor {
    store: Arc<dyn ObjectStore>,
    source: ImageSource,
    transformer: Arc<dyn ImageTransformer>,
    policy: EligibilityPolicy,
    width: u32,
    height: u32,
    derived_prefix: String,
    upload_acl: Option<String>,
}

impl ObjectProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        source: ImageSource,
        transformer: Arc<dyn ImageTransformer>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            store,
            source,
            transformer,
            policy: EligibilityPolicy {
                target_object: config.target_object.clone(),
                required_content_type: config.required_content_type.clone(),
            },
            width: config.resize.width,
            height: config.resize.height,
            derived_prefix: config.derived_prefix.clone(),
            upload_acl: config.upload_acl.clone(),
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    pub fn derived_key(&self, key: &str) -> String {
        format!("{}{}", self.derived_prefix, key)
    }

    /// Returns the key of the uploaded derivative, or `None` when the object was skipped
    pub async fn process(&self, meta: &ObjectMeta) -> Result<Option<String>, PipelineError> {
        if !self.policy.is_eligible(meta) {
            debug!(key = %meta.key, "skipping object");
            return Ok(None);
        }

        let data = self.source.fetch(self.store.as_ref(), &meta.key).await?;

        let request = TransformRequest {
            name: meta.key.clone(),
            data,
            width: self.width,
            height: self.height,
        };
        let output = self.transformer.resize(&request)?;

        let derived_key = self.derived_key(&meta.key);
        let size = output.data.len();
        self.store
            .put_object(
                &derived_key,
                output.data,
                PutOptions::with_content_type(output.content_type)
                    .with_predefined_acl(self.upload_acl.clone()),
            )
            .await?;

        info!(
            source = %meta.key,
            target = %derived_key,
            width = output.width,
            height = output.height,
            size,
            "uploaded resized image"
        );

        Ok(Some(derived_key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(content_type: Option<&str>) -> EligibilityPolicy {
        EligibilityPolicy {
            target_object: "leyKart-images/B1/G1.png".to_string(),
            required_content_type: content_type.map(str::to_string),
        }
    }

    #[test]
    fn test_eligibility_requires_exact_key_and_type() {
        let policy = policy(Some("image/png"));

        assert!(policy.is_eligible(&ObjectMeta::new(
            "leyKart-images/B1/G1.png",
            10,
            Some("image/png")
        )));
        assert!(!policy.is_eligible(&ObjectMeta::new(
            "leyKart-images/B1/G1.png",
            10,
            Some("image/jpeg")
        )));
        assert!(!policy.is_eligible(&ObjectMeta::new("leyKart-images/B1/G1.png", 10, None)));
        assert!(!policy.is_eligible(&ObjectMeta::new(
            "leyKart-images/B1/G1.png.bak",
            10,
            Some("image/png")
        )));
        assert!(!policy.is_eligible(&ObjectMeta::new(
            "leykart-images/b1/g1.png",
            10,
            Some("image/png")
        )));
    }

    #[test]
    fn test_eligibility_without_type_check() {
        let policy = policy(None);

        assert!(policy.is_eligible(&ObjectMeta::new("leyKart-images/B1/G1.png", 10, None)));
        assert!(policy.is_eligible(&ObjectMeta::new(
            "leyKart-images/B1/G1.png",
            10,
            Some("application/octet-stream")
        )));
        assert!(!policy.is_eligible(&ObjectMeta::new("other.png", 10, Some("image/png"))));
    }
}
