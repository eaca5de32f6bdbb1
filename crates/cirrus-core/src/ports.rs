//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the publishing core and the
//! remote services it talks to.

use crate::Result;
use crate::cdn::{DistributionSummary, InvalidationReceipt, InvalidationRequest};
use crate::object::{ObjectMetadata, PutObjectRequest};
use async_trait::async_trait;

/// Bucket-style object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload an object, replacing any existing one at the same key.
    async fn put_object(&self, request: PutObjectRequest) -> Result<()>;

    /// Probe an object's metadata.
    ///
    /// Returns `Error::ObjectNotFound` when nothing exists at `key`; any other
    /// error is a remote failure.
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata>;
}

/// CDN control plane.
#[async_trait]
pub trait CdnControlPlane: Send + Sync {
    /// List every distribution visible to the caller.
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>>;

    /// Submit one batched purge.
    async fn create_invalidation(&self, request: &InvalidationRequest)
    -> Result<InvalidationReceipt>;
}

/// Receiver of "this key changed" notifications.
#[async_trait]
pub trait Invalidator: Send + Sync {
    /// Queue `key` in `bucket` for invalidation.
    async fn invalidate_object(&self, bucket: &str, key: &str) -> Result<()>;

    /// Send everything queued so far.
    async fn flush(&self) -> Result<()>;
}
