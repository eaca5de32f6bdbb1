//! S3 adapter tests against MinIO.
//!
//! Run with: `cargo test -p cirrus-tests --test s3_tests --features integration`

#![cfg(feature = "integration")]

use cirrus_core::ports::ObjectStore;
use cirrus_publish::{ContentPublisher, PublisherConfig, RenderOutcome, S3ObjectStore};
use cirrus_tests::containers::MinioContainer;
use std::sync::Arc;

#[tokio::test]
async fn test_head_object_reports_not_found() {
    let minio = MinioContainer::start().await.expect("start minio");
    minio.create_bucket("assets").await.expect("create bucket");
    let store = S3ObjectStore::new(minio.s3_client());

    let err = store.head_object("assets", "missing.css").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_render_uploads_and_skips_existing() {
    let minio = MinioContainer::start().await.expect("start minio");
    minio.create_bucket("assets").await.expect("create bucket");
    let store = Arc::new(S3ObjectStore::new(minio.s3_client()));

    let config = PublisherConfig::new("assets")
        .with_gzip()
        .with_header("Content-Type", "text/css")
        .with_header("x-amz-meta-build", "42");
    let publisher = ContentPublisher::new(config, store.clone()).expect("publisher");

    let first = publisher.render("body {}", "css/a.css").await.expect("upload");
    assert!(first.is_uploaded());

    let metadata = store.head_object("assets", "css/a.css").await.expect("head");
    assert_eq!(metadata.content_type.as_deref(), Some("text/css"));
    assert_eq!(metadata.content_encoding.as_deref(), Some("gzip"));

    let second = publisher.render("body {}", "css/a.css").await.expect("skip");
    assert_eq!(second, RenderOutcome::Skipped { key: "css/a.css".into() });
}
