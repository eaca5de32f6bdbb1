//! Content publishing for Cirrus.
//!
//! Uploads rendered artifacts to an object store, optionally compressed,
//! skipping keys that already exist unless overwrite is enabled, and hands
//! every uploaded key to an invalidator.

pub mod compression;
pub mod config;
pub mod keys;
mod publisher;
pub mod s3;
mod session;
pub mod types;

pub use compression::{CodecCompressor, CompressedContent, Compressor};
pub use config::PublisherConfig;
pub use keys::{DefaultKeyBuilder, KeyBuilder};
pub use publisher::ContentPublisher;
pub use s3::S3ObjectStore;
pub use types::{CompressionType, RenderOutcome};
