//! CDN invalidation batching for Cirrus.
//!
//! Collects changed keys per distribution and purges them in one request per
//! flush. The CloudFront adapter implements the control plane port.

mod batcher;
pub mod cloudfront;
pub mod config;
pub mod directory;
pub mod metrics;

pub use batcher::InvalidationBatcher;
pub use cloudfront::CloudFrontControlPlane;
pub use config::CdnConfig;
pub use directory::DistributionDirectory;
pub use metrics::{InvalidationMetrics, MetricsSnapshot};
