//! Invalidation batching.
//!
//! Keys registered through [`InvalidationBatcher::invalidate_object`] are
//! collected per distribution and sent as one purge request per distribution
//! on [`InvalidationBatcher::flush`].

use crate::config::CdnConfig;
use crate::directory::DistributionDirectory;
use crate::metrics::{InvalidationMetrics, LatencyTimer};
use async_trait::async_trait;
use chrono::Utc;
use cirrus_core::cdn::{InvalidationPaths, InvalidationRequest, invalidation_path};
use cirrus_core::ports::{CdnControlPlane, Invalidator};
use cirrus_core::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, error, info, warn};

const CALLER_REFERENCE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Shared by every batcher in the process so two batches created in the same
/// millisecond never carry the same reference.
static CALLER_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Paths waiting to be purged from one distribution.
#[derive(Debug)]
struct PendingBatch {
    caller_reference: String,
    paths: InvalidationPaths,
    /// A purge with the current caller reference was attempted and failed.
    attempted: bool,
}

/// Coalesces invalidations into batched purge calls.
///
/// Queueing and flushing share one lock, and the lock is held for the
/// duration of each purge call. A batch is removed only after the control
/// plane accepts it, so a failed flush leaves it pending for the next one.
pub struct InvalidationBatcher {
    cdn: Arc<dyn CdnControlPlane>,
    directory: DistributionDirectory,
    pending: Mutex<BTreeMap<String, PendingBatch>>,
    metrics: Arc<InvalidationMetrics>,
}

impl InvalidationBatcher {
    /// Create a batcher with the default configuration.
    pub fn new(cdn: Arc<dyn CdnControlPlane>) -> Self {
        Self::with_config(cdn, CdnConfig::default())
    }

    pub fn with_config(cdn: Arc<dyn CdnControlPlane>, config: CdnConfig) -> Self {
        Self {
            cdn,
            directory: DistributionDirectory::new(&config),
            pending: Mutex::new(BTreeMap::new()),
            metrics: InvalidationMetrics::new(),
        }
    }

    /// Queue `key` for invalidation on the distribution fronting `bucket`.
    ///
    /// Buckets without a distribution are skipped silently. Listing failures
    /// while building the directory are returned to the caller.
    pub async fn invalidate_object(&self, bucket: &str, key: &str) -> Result<()> {
        let span = cirrus_trace::invalidation_span(bucket, key);
        self.queue(bucket, key).instrument(span).await
    }

    async fn queue(&self, bucket: &str, key: &str) -> Result<()> {
        let Some(distribution_id) = self.directory.lookup(self.cdn.as_ref(), bucket).await? else {
            debug!(bucket = %bucket, "No distribution fronts bucket, skipping invalidation");
            self.metrics.record_skipped();
            return Ok(());
        };
        tracing::Span::current().record("cdn.distribution_id", distribution_id.as_str());

        let path = invalidation_path(key);
        let mut pending = self.pending.lock().await;
        let created = match pending.get_mut(&distribution_id) {
            Some(batch) => {
                if batch.attempted {
                    batch.caller_reference = self.next_caller_reference();
                    batch.attempted = false;
                }
                batch.paths.push(path);
                false
            }
            None => {
                pending.insert(
                    distribution_id.clone(),
                    PendingBatch {
                        caller_reference: self.next_caller_reference(),
                        paths: InvalidationPaths::new(vec![path]),
                        attempted: false,
                    },
                );
                true
            }
        };
        self.metrics.record_queued(created);
        debug!(distribution_id = %distribution_id, created, "Queued invalidation");
        Ok(())
    }

    /// Send one purge per pending distribution and clear what was accepted.
    ///
    /// With nothing pending no remote call is made. On failure the failed
    /// batch and any batch not yet sent stay pending.
    pub async fn flush(&self) -> Result<()> {
        let mut pending = self.pending.lock().await;
        if pending.is_empty() {
            return Ok(());
        }

        let span = cirrus_trace::flush_span(pending.len());
        self.drain(&mut pending).instrument(span).await
    }

    async fn drain(&self, pending: &mut BTreeMap<String, PendingBatch>) -> Result<()> {
        while let Some(mut entry) = pending.first_entry() {
            let request = InvalidationRequest {
                distribution_id: entry.key().clone(),
                caller_reference: entry.get().caller_reference.clone(),
                paths: entry.get().paths.clone(),
            };
            let timer = LatencyTimer::start();

            match self.cdn.create_invalidation(&request).await {
                Ok(receipt) => {
                    entry.remove();
                    self.metrics.record_flushed(request.paths.len() as u64);
                    info!(
                        distribution_id = %request.distribution_id,
                        invalidation_id = %receipt.invalidation_id,
                        paths = request.paths.len(),
                        duration_ms = timer.elapsed_ms(),
                        "Invalidation submitted"
                    );
                }
                Err(e) => {
                    entry.get_mut().attempted = true;
                    self.metrics.record_flush_failure();
                    error!(
                        distribution_id = %request.distribution_id,
                        paths = request.paths.len(),
                        error = %e,
                        "Invalidation failed, batch kept pending"
                    );
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Flush and release the batcher.
    pub async fn shutdown(self) -> Result<()> {
        self.flush().await
    }

    /// Paths pending for `distribution_id`, in insertion order.
    pub async fn pending_paths(&self, distribution_id: &str) -> Vec<String> {
        self.pending
            .lock()
            .await
            .get(distribution_id)
            .map(|batch| batch.paths.items.clone())
            .unwrap_or_default()
    }

    /// Total number of pending paths across all distributions.
    pub async fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .await
            .values()
            .map(|batch| batch.paths.len())
            .sum()
    }

    pub fn metrics(&self) -> &Arc<InvalidationMetrics> {
        &self.metrics
    }

    fn next_caller_reference(&self) -> String {
        let sequence = CALLER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        format!(
            "{} #{}",
            Utc::now().format(CALLER_REFERENCE_FORMAT),
            sequence
        )
    }
}

impl Drop for InvalidationBatcher {
    fn drop(&mut self) {
        let pending = self.pending.get_mut();
        let paths: usize = pending.values().map(|batch| batch.paths.len()).sum();
        if paths > 0 {
            warn!(
                distributions = pending.len(),
                paths, "Invalidation batcher dropped with unflushed paths"
            );
        }
    }
}

#[async_trait]
impl Invalidator for InvalidationBatcher {
    async fn invalidate_object(&self, bucket: &str, key: &str) -> Result<()> {
        InvalidationBatcher::invalidate_object(self, bucket, key).await
    }

    async fn flush(&self) -> Result<()> {
        InvalidationBatcher::flush(self).await
    }
}
