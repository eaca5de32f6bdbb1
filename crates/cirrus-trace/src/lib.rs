//! Tracing setup for Cirrus.
//!
//! Installs the `tracing` subscriber (env filter, pretty or JSON output,
//! optional OTLP export) and provides span helpers for publishing and
//! invalidation work.

pub mod spans;
pub mod tracer;

pub use spans::{flush_span, invalidation_span, publish_span, upload_span};
pub use tracer::{
    LogFormat, OtlpConfig, TracerError, TracingConfig, init_test_tracing, init_tracer,
    shutdown_tracer,
};
