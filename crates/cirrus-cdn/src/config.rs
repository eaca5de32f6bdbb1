//! Configuration for CDN invalidation.

use serde::{Deserialize, Serialize};

/// Configuration for the invalidation batcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnConfig {
    /// Storage-domain suffixes stripped from origin hosts to recover the
    /// bucket name. Regional S3 endpoints are recognized in addition.
    #[serde(default = "default_storage_domain_suffixes")]
    pub storage_domain_suffixes: Vec<String>,
}

fn default_storage_domain_suffixes() -> Vec<String> {
    vec![".s3.amazonaws.com".to_string()]
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            storage_domain_suffixes: default_storage_domain_suffixes(),
        }
    }
}

impl CdnConfig {
    /// Add a storage-domain suffix, e.g. for an S3-compatible store.
    pub fn with_storage_domain_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.storage_domain_suffixes.push(suffix.into());
        self
    }
}
