//! Cirrus Core
//!
//! Shared vocabulary for Cirrus: the error taxonomy, remote service ports,
//! object store and CDN types, plus in-memory backends.
//! This crate has minimal dependencies and is used by every other crate.

pub mod cdn;
pub mod error;
pub mod memory;
pub mod object;
pub mod ports;

pub use cdn::{
    DistributionSummary, InvalidationPaths, InvalidationReceipt, InvalidationRequest,
    invalidation_path,
};
pub use error::{Error, Result};
pub use object::{CannedAcl, ObjectHeaders, ObjectMetadata, PutObjectRequest};
pub use ports::{CdnControlPlane, Invalidator, ObjectStore};
