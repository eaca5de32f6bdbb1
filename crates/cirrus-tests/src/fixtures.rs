//! Test fixtures wiring publishers and batchers to in-memory backends.

use cirrus_cdn::InvalidationBatcher;
use cirrus_core::cdn::DistributionSummary;
use cirrus_core::memory::{InMemoryCdn, InMemoryObjectStore};
use cirrus_publish::{ContentPublisher, PublisherConfig};
use std::sync::Arc;

/// Bucket fronted by [`ASSETS_DISTRIBUTION`].
pub const ASSETS_BUCKET: &str = "assets";
pub const ASSETS_DISTRIBUTION: &str = "E123";
/// Bucket with no distribution.
pub const PRIVATE_BUCKET: &str = "private";

/// Distribution listing used by most tests.
pub fn distributions() -> Vec<DistributionSummary> {
    vec![
        DistributionSummary::new(ASSETS_DISTRIBUTION, ["assets.s3.amazonaws.com"]),
        DistributionSummary::new("E456", ["media.s3.eu-west-1.amazonaws.com"]),
        DistributionSummary::new("E789", ["www.example.com"]),
    ]
}

/// A publisher with its store, control plane and batcher exposed.
pub struct PublishFixture {
    pub store: Arc<InMemoryObjectStore>,
    pub cdn: Arc<InMemoryCdn>,
    pub batcher: Arc<InvalidationBatcher>,
    pub publisher: ContentPublisher,
}

impl PublishFixture {
    /// Publisher for [`ASSETS_BUCKET`] with default settings.
    pub fn new() -> Self {
        Self::with_config(PublisherConfig::new(ASSETS_BUCKET))
    }

    pub fn with_config(config: PublisherConfig) -> Self {
        let store = Arc::new(InMemoryObjectStore::new());
        let cdn = Arc::new(InMemoryCdn::new(distributions()));
        let batcher = Arc::new(InvalidationBatcher::new(cdn.clone()));
        let publisher = ContentPublisher::new(config, store.clone())
            .expect("valid publisher config")
            .with_invalidator(batcher.clone());
        Self {
            store,
            cdn,
            batcher,
            publisher,
        }
    }
}

impl Default for PublishFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// A standalone batcher over the fixture distributions.
pub fn batcher() -> (Arc<InvalidationBatcher>, Arc<InMemoryCdn>) {
    let cdn = Arc::new(InMemoryCdn::new(distributions()));
    (Arc::new(InvalidationBatcher::new(cdn.clone())), cdn)
}
