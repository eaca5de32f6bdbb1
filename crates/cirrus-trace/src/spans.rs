//! Span creation for publishing operations.

use tracing::{Level, Span, span};

/// Create a span for one `render` call.
pub fn publish_span(bucket: &str, output_path: &str) -> Span {
    span!(
        Level::INFO,
        "publish.render",
        storage.bucket = bucket,
        publish.output_path = output_path,
        storage.key = tracing::field::Empty,
    )
}

/// Create a span for an object upload.
pub fn upload_span(bucket: &str, key: &str, compressed: bool) -> Span {
    span!(
        Level::DEBUG,
        "storage.put_object",
        storage.bucket = bucket,
        storage.key = key,
        upload.compressed = compressed,
    )
}

/// Create a span for queueing a key for invalidation.
pub fn invalidation_span(bucket: &str, key: &str) -> Span {
    span!(
        Level::DEBUG,
        "cdn.invalidate_object",
        storage.bucket = bucket,
        storage.key = key,
        cdn.distribution_id = tracing::field::Empty,
    )
}

/// Create a span for draining pending invalidations.
pub fn flush_span(pending_batches: usize) -> Span {
    span!(
        Level::INFO,
        "cdn.flush",
        cdn.pending_batches = pending_batches,
    )
}
