//! Publishing types.

use serde::{Deserialize, Serialize};

/// Transport compression applied before upload.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl CompressionType {
    /// `Content-Encoding` value announced for this codec.
    pub fn content_encoding(&self) -> Option<&'static str> {
        match self {
            CompressionType::None => None,
            CompressionType::Gzip => Some("gzip"),
            CompressionType::Zstd => Some("zstd"),
        }
    }
}

/// Result of one `render` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The object was uploaded.
    Uploaded { key: String, bytes: usize },
    /// An object already existed and overwrite is disabled.
    Skipped { key: String },
}

impl RenderOutcome {
    pub fn key(&self) -> &str {
        match self {
            RenderOutcome::Uploaded { key, .. } | RenderOutcome::Skipped { key } => key,
        }
    }

    pub fn is_uploaded(&self) -> bool {
        matches!(self, RenderOutcome::Uploaded { .. })
    }
}
