//! In-memory backends for local development and tests.
//!
//! Both record every call they receive and can be switched into a failing
//! mode to exercise error paths.

use crate::cdn::{DistributionSummary, InvalidationReceipt, InvalidationRequest};
use crate::object::{ObjectMetadata, PutObjectRequest};
use crate::ports::{CdnControlPlane, ObjectStore};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Object store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: Mutex<HashMap<(String, String), PutObjectRequest>>,
    puts: Mutex<Vec<PutObjectRequest>>,
    heads: AtomicUsize,
    fail_puts: AtomicBool,
    fail_heads: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without recording an upload.
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Vec<u8>>) {
        let request = PutObjectRequest {
            bucket: bucket.to_string(),
            key: key.to_string(),
            body: body.into(),
            acl: Default::default(),
            headers: Default::default(),
        };
        lock(&self.objects).insert((bucket.to_string(), key.to_string()), request);
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<PutObjectRequest> {
        lock(&self.objects)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Every upload received, in arrival order.
    pub fn puts(&self) -> Vec<PutObjectRequest> {
        lock(&self.puts).clone()
    }

    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn fail_puts(&self, fail: bool) {
        self.fail_puts.store(fail, Ordering::SeqCst);
    }

    pub fn fail_heads(&self, fail: bool) {
        self.fail_heads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!(
                "Simulated upload failure for {}/{}",
                request.bucket, request.key
            )));
        }
        lock(&self.puts).push(request.clone());
        lock(&self.objects).insert((request.bucket.clone(), request.key.clone()), request);
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        if self.fail_heads.load(Ordering::SeqCst) {
            return Err(Error::Storage(format!(
                "Simulated metadata failure for {}/{}",
                bucket, key
            )));
        }
        let objects = lock(&self.objects);
        let object = objects
            .get(&(bucket.to_string(), key.to_string()))
            .ok_or_else(|| Error::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })?;
        Ok(ObjectMetadata {
            content_length: Some(object.body.len() as i64),
            content_type: object.headers.get("content-type").map(str::to_string),
            content_encoding: object.headers.get("content-encoding").map(str::to_string),
            e_tag: None,
        })
    }
}

/// CDN control plane with a fixed distribution list.
#[derive(Debug, Default)]
pub struct InMemoryCdn {
    distributions: Mutex<Vec<DistributionSummary>>,
    invalidations: Mutex<Vec<InvalidationRequest>>,
    attempts: Mutex<Vec<InvalidationRequest>>,
    list_calls: AtomicUsize,
    fail_invalidations: AtomicBool,
    failing_distributions: Mutex<HashSet<String>>,
    fail_listing: AtomicBool,
}

impl InMemoryCdn {
    pub fn new(distributions: Vec<DistributionSummary>) -> Self {
        Self {
            distributions: Mutex::new(distributions),
            ..Default::default()
        }
    }

    /// Invalidations accepted so far, in arrival order.
    pub fn invalidations(&self) -> Vec<InvalidationRequest> {
        lock(&self.invalidations).clone()
    }

    /// Every invalidation request received, including rejected ones.
    pub fn attempts(&self) -> Vec<InvalidationRequest> {
        lock(&self.attempts).clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fail_invalidations(&self, fail: bool) {
        self.fail_invalidations.store(fail, Ordering::SeqCst);
    }

    /// Reject invalidations for one distribution while others succeed.
    pub fn fail_distribution(&self, distribution_id: &str, fail: bool) {
        let mut failing = lock(&self.failing_distributions);
        if fail {
            failing.insert(distribution_id.to_string());
        } else {
            failing.remove(distribution_id);
        }
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CdnControlPlane for InMemoryCdn {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::Cdn("Simulated listing failure".into()));
        }
        Ok(lock(&self.distributions).clone())
    }

    async fn create_invalidation(
        &self,
        request: &InvalidationRequest,
    ) -> Result<InvalidationReceipt> {
        lock(&self.attempts).push(request.clone());
        if self.fail_invalidations.load(Ordering::SeqCst)
            || lock(&self.failing_distributions).contains(&request.distribution_id)
        {
            return Err(Error::Cdn(format!(
                "Simulated invalidation failure for {}",
                request.distribution_id
            )));
        }
        let mut invalidations = lock(&self.invalidations);
        invalidations.push(request.clone());
        Ok(InvalidationReceipt {
            invalidation_id: format!("I{}", invalidations.len()),
            status: "InProgress".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::InvalidationPaths;

    #[tokio::test]
    async fn test_store_head_reports_not_found() {
        let store = InMemoryObjectStore::new();
        let err = store.head_object("assets", "missing.css").await.unwrap_err();
        assert!(err.is_not_found());

        store.insert("assets", "present.css", "body");
        let metadata = store.head_object("assets", "present.css").await.unwrap();
        assert_eq!(metadata.content_length, Some(4));
        assert_eq!(store.head_count(), 2);
    }

    #[tokio::test]
    async fn test_cdn_records_invalidations() {
        let cdn = InMemoryCdn::new(vec![DistributionSummary::new(
            "E123",
            ["assets.s3.amazonaws.com"],
        )]);
        let request = InvalidationRequest {
            distribution_id: "E123".into(),
            caller_reference: "ref".into(),
            paths: InvalidationPaths::new(vec!["/a".into()]),
        };

        let receipt = cdn.create_invalidation(&request).await.unwrap();
        assert_eq!(receipt.invalidation_id, "I1");
        assert_eq!(cdn.invalidations(), vec![request.clone()]);

        cdn.fail_invalidations(true);
        assert!(cdn.create_invalidation(&request).await.is_err());
        assert_eq!(cdn.invalidations().len(), 1);
        assert_eq!(cdn.attempts().len(), 2);
    }

    #[tokio::test]
    async fn test_cdn_fails_single_distribution() {
        let cdn = InMemoryCdn::default();
        let request = |id: &str| InvalidationRequest {
            distribution_id: id.into(),
            caller_reference: "ref".into(),
            paths: InvalidationPaths::new(vec!["/a".into()]),
        };

        cdn.fail_distribution("E456", true);
        assert!(cdn.create_invalidation(&request("E123")).await.is_ok());
        assert!(cdn.create_invalidation(&request("E456")).await.is_err());

        cdn.fail_distribution("E456", false);
        assert!(cdn.create_invalidation(&request("E456")).await.is_ok());
        assert_eq!(cdn.invalidations().len(), 2);
    }
}
