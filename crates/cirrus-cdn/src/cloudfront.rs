//! CloudFront control plane adapter.

use async_trait::async_trait;
use aws_sdk_cloudfront::Client;
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{InvalidationBatch, Paths};
use cirrus_core::cdn::{DistributionSummary, InvalidationReceipt, InvalidationRequest};
use cirrus_core::ports::CdnControlPlane;
use cirrus_core::{Error, Result};
use tracing::debug;

/// CDN control plane backed by Amazon CloudFront.
#[derive(Clone)]
pub struct CloudFrontControlPlane {
    client: Client,
}

impl CloudFrontControlPlane {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential and region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl CdnControlPlane for CloudFrontControlPlane {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
        let mut summaries = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let output = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| {
                    Error::Cdn(format!(
                        "Failed to list distributions: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let Some(list) = output.distribution_list() else {
                break;
            };

            for distribution in list.items() {
                let origins = distribution
                    .origins()
                    .map(|origins| {
                        origins
                            .items()
                            .iter()
                            .map(|origin| origin.domain_name().to_string())
                            .collect()
                    })
                    .unwrap_or_default();
                summaries.push(DistributionSummary {
                    id: distribution.id().to_string(),
                    origin_domain_names: origins,
                });
            }

            match list.next_marker() {
                Some(next) if !next.is_empty() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(count = summaries.len(), "Listed distributions");
        Ok(summaries)
    }

    async fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt> {
        let paths = Paths::builder()
            .quantity(request.paths.quantity)
            .set_items(Some(request.paths.items.clone()))
            .build()
            .map_err(|e| Error::Cdn(format!("Invalid invalidation paths: {}", e)))?;

        let batch = InvalidationBatch::builder()
            .paths(paths)
            .caller_reference(request.caller_reference.as_str())
            .build()
            .map_err(|e| Error::Cdn(format!("Invalid invalidation batch: {}", e)))?;

        let output = self
            .client
            .create_invalidation()
            .distribution_id(request.distribution_id.as_str())
            .invalidation_batch(batch)
            .send()
            .await
            .map_err(|e| {
                Error::Cdn(format!(
                    "Failed to create invalidation for {}: {}",
                    request.distribution_id,
                    DisplayErrorContext(&e)
                ))
            })?;

        let invalidation = output.invalidation();
        Ok(InvalidationReceipt {
            invalidation_id: invalidation
                .map(|i| i.id().to_string())
                .unwrap_or_default(),
            status: invalidation
                .map(|i| i.status().to_string())
                .unwrap_or_default(),
        })
    }
}
