//! CloudFront distributions and cache invalidation.

use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::primitives::DateTimeFormat;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use chrono::Utc;
use tracing::{info, instrument};

use super::{CdnService, CloudError, DistributionSummary, InvalidationSummary};

const INVALIDATE: &str = "CloudFront invalidation";

#[derive(Debug, Clone)]
pub struct CloudFrontCdn {
    client: Client,
}

impl CloudFrontCdn {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CdnService for CloudFrontCdn {
    #[instrument(skip(self))]
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>, CloudError> {
        let output = self
            .client
            .list_distributions()
            .send()
            .await
            .map_err(|e| CloudError::sdk("CloudFront list distributions", &e))?;

        let Some(list) = output.distribution_list() else {
            return Ok(Vec::new());
        };

        Ok(list
            .items()
            .iter()
            .map(|item| DistributionSummary {
                id: item.id().to_string(),
                domain_name: item.domain_name().to_string(),
                enabled: item.enabled(),
                status: item.status().to_string(),
                origins: item
                    .origins()
                    .map(|origins| {
                        origins
                            .items()
                            .iter()
                            .map(|origin| origin.domain_name().to_string())
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect())
    }

    #[instrument(skip(self, paths), fields(paths = paths.len()))]
    async fn invalidate_cache(
        &self,
        distribution_id: &str,
        paths: &[String],
    ) -> Result<InvalidationSummary, CloudError> {
        let quantity = i32::try_from(paths.len())
            .map_err(|_| CloudError::new(INVALIDATE, "too many paths"))?;
        let batch_paths = Paths::builder()
            .quantity(quantity)
            .set_items(Some(paths.to_vec()))
            .build()
            .map_err(|e| CloudError::sdk(INVALIDATE, &e))?;
        let batch = InvalidationBatch::builder()
            .caller_reference(Utc::now().timestamp_millis().to_string())
            .paths(batch_paths)
            .build()
            .map_err(|e| CloudError::sdk(INVALIDATE, &e))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(distribution_id)
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| CloudError::sdk(INVALIDATE, &e))?;

        let Some(invalidation) = output.invalidation() else {
            return Err(CloudError::new(INVALIDATE, "response had no invalidation"));
        };

        info!(
            distribution_id,
            invalidation_id = invalidation.id(),
            "Cache invalidation created"
        );

        Ok(InvalidationSummary {
            id: invalidation.id().to_string(),
            status: invalidation.status().to_string(),
            create_time: invalidation
                .create_time()
                .fmt(DateTimeFormat::DateTime)
                .ok(),
            paths: paths.to_vec(),
        })
    }
}
