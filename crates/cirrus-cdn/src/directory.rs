//! Bucket to distribution lookup.

use crate::config::CdnConfig;
use cirrus_core::Result;
use cirrus_core::cdn::DistributionSummary;
use cirrus_core::ports::CdnControlPlane;
use std::collections::HashMap;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

const AWS_DOMAIN_SUFFIX: &str = ".amazonaws.com";

/// Maps bucket names to the distribution fronting them.
///
/// Built from one distribution listing on first lookup and never refreshed.
/// Concurrent first lookups share a single listing call; a failed listing is
/// not cached, so the next lookup tries again.
pub struct DistributionDirectory {
    suffixes: Vec<String>,
    entries: OnceCell<HashMap<String, String>>,
}

impl DistributionDirectory {
    pub fn new(config: &CdnConfig) -> Self {
        Self {
            suffixes: config
                .storage_domain_suffixes
                .iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            entries: OnceCell::new(),
        }
    }

    /// Distribution id for `bucket`, or `None` if no distribution fronts it.
    ///
    /// Bucket names compare case-insensitively, like the origin hosts they
    /// are recovered from.
    pub async fn lookup(&self, cdn: &dyn CdnControlPlane, bucket: &str) -> Result<Option<String>> {
        let entries = self.entries.get_or_try_init(|| self.build(cdn)).await?;
        Ok(entries.get(&bucket.to_ascii_lowercase()).cloned())
    }

    /// Whether the listing has already been loaded.
    pub fn is_loaded(&self) -> bool {
        self.entries.initialized()
    }

    async fn build(&self, cdn: &dyn CdnControlPlane) -> Result<HashMap<String, String>> {
        let distributions = cdn.list_distributions().await?;
        let entries = self.index(&distributions);
        info!(
            distributions = distributions.len(),
            buckets = entries.len(),
            "Loaded distribution directory"
        );
        Ok(entries)
    }

    fn index(&self, distributions: &[DistributionSummary]) -> HashMap<String, String> {
        let mut entries: HashMap<String, String> = HashMap::new();
        for distribution in distributions {
            for origin in &distribution.origin_domain_names {
                let bucket = self.bucket_for_origin(origin);
                if bucket.is_empty() {
                    continue;
                }
                match entries.get(&bucket) {
                    Some(existing) if existing != &distribution.id => {
                        warn!(
                            bucket = %bucket,
                            kept = %existing,
                            ignored = %distribution.id,
                            "Bucket is fronted by more than one distribution"
                        );
                    }
                    Some(_) => {}
                    None => {
                        debug!(bucket = %bucket, distribution_id = %distribution.id, "Indexed origin");
                        entries.insert(bucket, distribution.id.clone());
                    }
                }
            }
        }
        entries
    }

    /// Recover the bucket identity from an origin domain name.
    ///
    /// Takes the host portion, strips a configured storage suffix or an S3
    /// endpoint (regional, dual-stack or website), and otherwise returns the
    /// host unchanged. The result is lowercased.
    pub fn bucket_for_origin(&self, origin: &str) -> String {
        let host = origin
            .trim()
            .trim_start_matches("https://")
            .trim_start_matches("http://");
        let host = host.split(['/', ':']).next().unwrap_or(host);
        let host = host.trim_end_matches('.').to_ascii_lowercase();

        for suffix in &self.suffixes {
            if let Some(bucket) = host.strip_suffix(suffix.as_str()) {
                return bucket.to_string();
            }
        }

        regional_bucket(&host).unwrap_or(host)
    }
}

/// Bucket part of a virtual-hosted S3 endpoint host, if `host` is one.
fn regional_bucket(host: &str) -> Option<String> {
    let rest = host.strip_suffix(AWS_DOMAIN_SUFFIX)?;
    let start = [".s3.", ".s3-"]
        .iter()
        .filter_map(|marker| rest.rfind(marker))
        .max()?;
    let (bucket, endpoint) = (&rest[..start], &rest[start + 1..]);
    if bucket.is_empty() || !is_s3_endpoint(endpoint) {
        return None;
    }
    Some(bucket.to_string())
}

/// Recognized forms, with `.amazonaws.com` already removed:
/// `s3.<region>`, `s3-<region>`, `s3.dualstack.<region>`,
/// `s3-website.<region>` and `s3-website-<region>`.
fn is_s3_endpoint(endpoint: &str) -> bool {
    let labels: Vec<&str> = endpoint.split('.').collect();
    if labels.iter().any(|label| label.is_empty()) {
        return false;
    }
    match labels.as_slice() {
        ["s3"] | ["s3", _] | ["s3", "dualstack", _] | ["s3-website", _] => true,
        [service] => service.strip_prefix("s3-").is_some_and(|region| !region.is_empty()),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::memory::InMemoryCdn;
    use std::sync::Arc;

    fn directory() -> DistributionDirectory {
        DistributionDirectory::new(&CdnConfig::default())
    }

    #[test]
    fn test_bucket_for_origin() {
        let dir = directory();
        assert_eq!(dir.bucket_for_origin("assets.s3.amazonaws.com"), "assets");
        assert_eq!(dir.bucket_for_origin("Assets.S3.AmazonAWS.com"), "assets");
        assert_eq!(dir.bucket_for_origin("assets.s3.eu-west-1.amazonaws.com"), "assets");
        assert_eq!(dir.bucket_for_origin("assets.s3-us-west-2.amazonaws.com"), "assets");
        assert_eq!(dir.bucket_for_origin("my.site.s3.amazonaws.com"), "my.site");
        assert_eq!(dir.bucket_for_origin("https://www.example.com:443/"), "www.example.com");
    }

    #[test]
    fn test_dualstack_and_website_endpoints() {
        let dir = directory();
        assert_eq!(
            dir.bucket_for_origin("assets.s3.dualstack.us-east-1.amazonaws.com"),
            "assets"
        );
        assert_eq!(
            dir.bucket_for_origin("assets.s3-website.eu-west-1.amazonaws.com"),
            "assets"
        );
        assert_eq!(
            dir.bucket_for_origin("assets.s3-website-us-east-1.amazonaws.com"),
            "assets"
        );
        assert_eq!(
            dir.bucket_for_origin("my.site.s3.dualstack.eu-west-1.amazonaws.com"),
            "my.site"
        );
        assert_eq!(
            dir.bucket_for_origin("api.ec2.us-east-1.amazonaws.com"),
            "api.ec2.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_custom_suffix() {
        let config = CdnConfig::default().with_storage_domain_suffix(".r2.example.net");
        let dir = DistributionDirectory::new(&config);
        assert_eq!(dir.bucket_for_origin("media.r2.example.net"), "media");
    }

    #[tokio::test]
    async fn test_lookup_hits_and_misses() {
        let cdn = InMemoryCdn::new(vec![
            DistributionSummary::new("E123", ["assets.s3.amazonaws.com"]),
            DistributionSummary::new("E456", ["media.s3.amazonaws.com", "thumbs.s3.amazonaws.com"]),
        ]);
        let dir = directory();

        assert_eq!(dir.lookup(&cdn, "assets").await.unwrap(), Some("E123".into()));
        assert_eq!(dir.lookup(&cdn, "thumbs").await.unwrap(), Some("E456".into()));
        assert_eq!(dir.lookup(&cdn, "private").await.unwrap(), None);
        assert_eq!(cdn.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_ignores_bucket_case() {
        let cdn = InMemoryCdn::new(vec![DistributionSummary::new(
            "E1",
            ["MyAssets.s3.amazonaws.com"],
        )]);
        let dir = directory();

        assert_eq!(dir.lookup(&cdn, "MyAssets").await.unwrap(), Some("E1".into()));
        assert_eq!(dir.lookup(&cdn, "myassets").await.unwrap(), Some("E1".into()));
    }

    #[tokio::test]
    async fn test_first_distribution_wins() {
        let cdn = InMemoryCdn::new(vec![
            DistributionSummary::new("E1", ["assets.s3.amazonaws.com"]),
            DistributionSummary::new("E2", ["assets.s3.amazonaws.com"]),
        ]);
        let dir = directory();
        assert_eq!(dir.lookup(&cdn, "assets").await.unwrap(), Some("E1".into()));
    }

    #[tokio::test]
    async fn test_failed_listing_is_retried() {
        let cdn = InMemoryCdn::new(vec![DistributionSummary::new(
            "E123",
            ["assets.s3.amazonaws.com"],
        )]);
        let dir = directory();

        cdn.fail_listing(true);
        assert!(dir.lookup(&cdn, "assets").await.is_err());
        assert!(!dir.is_loaded());

        cdn.fail_listing(false);
        assert_eq!(dir.lookup(&cdn, "assets").await.unwrap(), Some("E123".into()));
        assert_eq!(cdn.list_calls(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_lookups_list_once() {
        let cdn = Arc::new(InMemoryCdn::new(vec![DistributionSummary::new(
            "E123",
            ["assets.s3.amazonaws.com"],
        )]));
        let dir = Arc::new(directory());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let cdn = cdn.clone();
            let dir = dir.clone();
            handles.push(tokio::spawn(async move {
                dir.lookup(cdn.as_ref(), "assets").await.unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some("E123".to_string()));
        }
        assert_eq!(cdn.list_calls(), 1);
    }
}
