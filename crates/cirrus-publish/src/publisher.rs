//! Content publisher.

use crate::compression::{CodecCompressor, Compressor};
use crate::config::PublisherConfig;
use crate::keys::KeyBuilder;
use crate::types::{CompressionType, RenderOutcome};
use cirrus_core::object::PutObjectRequest;
use cirrus_core::ports::{Invalidator, ObjectStore};
use cirrus_core::{Error, Result};
use std::sync::Arc;
use tracing::{Instrument, debug, info};

/// Uploads rendered content to the object store and reports changed keys to
/// an invalidator.
pub struct ContentPublisher {
    config: PublisherConfig,
    store: Arc<dyn ObjectStore>,
    key_builder: Arc<dyn KeyBuilder>,
    compressor: Option<Arc<dyn Compressor>>,
    invalidator: Option<Arc<dyn Invalidator>>,
}

impl ContentPublisher {
    /// Create a publisher from a validated configuration.
    pub fn new(config: PublisherConfig, store: Arc<dyn ObjectStore>) -> Result<Self> {
        config.validate()?;
        let key_builder: Arc<dyn KeyBuilder> = Arc::new(config.key_builder.clone());
        let compressor: Option<Arc<dyn Compressor>> = match config.compression {
            CompressionType::None => None,
            algorithm => Some(Arc::new(CodecCompressor::new(algorithm))),
        };
        Ok(Self {
            config,
            store,
            key_builder,
            compressor,
            invalidator: None,
        })
    }

    /// Notify `invalidator` after every successful upload.
    pub fn with_invalidator(mut self, invalidator: Arc<dyn Invalidator>) -> Self {
        self.invalidator = Some(invalidator);
        self
    }

    /// Replace the configured key layout.
    pub fn with_key_builder(mut self, key_builder: Arc<dyn KeyBuilder>) -> Self {
        self.key_builder = key_builder;
        self
    }

    /// Replace the configured codec.
    pub fn with_compressor(mut self, compressor: Arc<dyn Compressor>) -> Self {
        self.compressor = Some(compressor);
        self
    }

    pub fn config(&self) -> &PublisherConfig {
        &self.config
    }

    pub fn invalidator(&self) -> Option<&Arc<dyn Invalidator>> {
        self.invalidator.as_ref()
    }

    /// Publish `content` at the key derived from `output_path`.
    ///
    /// Fails with `InvalidInput` before any remote call when the content or
    /// path is empty, or when the path maps to an empty key. Skips the upload
    /// when overwrite is disabled and the key already exists. Remote errors abort the call; the invalidator is only notified
    /// after a successful upload.
    pub async fn render(&self, content: &str, output_path: &str) -> Result<RenderOutcome> {
        if content.is_empty() || output_path.is_empty() {
            return Err(Error::InvalidInput(
                "Can't publish with missing key or content".into(),
            ));
        }

        let span = cirrus_trace::publish_span(&self.config.bucket, output_path);
        self.publish(content, output_path).instrument(span).await
    }

    async fn publish(&self, content: &str, output_path: &str) -> Result<RenderOutcome> {
        let key = self.key_builder.key_for(output_path);
        if key.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Output path {} does not map to a storage key",
                output_path
            )));
        }
        tracing::Span::current().record("storage.key", key.as_str());

        if !self.config.overwrite && self.exists(&key).await? {
            debug!(bucket = %self.config.bucket, key = %key, "Object exists, skipping upload");
            return Ok(RenderOutcome::Skipped { key });
        }

        let bytes = self.upload(&key, content).await?;

        if let Some(invalidator) = &self.invalidator {
            invalidator
                .invalidate_object(&self.config.bucket, &key)
                .await?;
        }

        Ok(RenderOutcome::Uploaded { key, bytes })
    }

    async fn upload(&self, key: &str, content: &str) -> Result<usize> {
        let mut headers = self.config.headers.clone();
        let body = match &self.compressor {
            Some(compressor) => {
                let compressed = compressor.compress(content.as_bytes())?;
                headers.extend(&compressed.headers);
                compressed.body
            }
            None => content.as_bytes().to_vec(),
        };
        let bytes = body.len();

        let request = PutObjectRequest {
            bucket: self.config.bucket.clone(),
            key: key.to_string(),
            body,
            acl: self.config.acl,
            headers,
        };

        let span = cirrus_trace::upload_span(&self.config.bucket, key, self.compressor.is_some());
        self.store.put_object(request).instrument(span).await?;

        info!(
            bucket = %self.config.bucket,
            key = %key,
            bytes,
            source_bytes = content.len(),
            "Uploaded object"
        );
        Ok(bytes)
    }

    /// Whether an object exists at `key`. "Not found" is an answer, not an error.
    async fn exists(&self, key: &str) -> Result<bool> {
        match self.store.head_object(&self.config.bucket, key).await {
            Ok(_) => Ok(true),
            Err(Error::ObjectNotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Flush the invalidator, if one is configured.
    pub async fn flush(&self) -> Result<()> {
        match &self.invalidator {
            Some(invalidator) => invalidator.flush().await,
            None => Ok(()),
        }
    }
}
