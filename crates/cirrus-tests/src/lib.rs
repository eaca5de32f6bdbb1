//! Integration test infrastructure for Cirrus.
//!
//! Fixtures wire publishers and batchers to the in-memory backends; the
//! MinIO container backs the S3 adapter tests behind the `integration`
//! feature.
//!
//! # Usage
//!
//! ```ignore
//! use cirrus_tests::PublishFixture;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let fx = PublishFixture::new();
//!     fx.publisher.render("body", "/css/a.css").await.unwrap();
//! }
//! ```

pub mod containers;
pub mod fixtures;

pub use fixtures::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    cirrus_trace::init_test_tracing();
}
