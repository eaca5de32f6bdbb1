//! Publisher configuration.

use crate::keys::DefaultKeyBuilder;
use crate::types::CompressionType;
use cirrus_core::object::{CannedAcl, ObjectHeaders};
use cirrus_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a content publisher.
///
/// Assembled once, then moved into [`crate::ContentPublisher::new`]; it
/// cannot change while the publisher is in service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Target bucket.
    pub bucket: String,
    /// ACL applied to every upload.
    #[serde(default)]
    pub acl: CannedAcl,
    /// Extra headers sent with every upload.
    #[serde(default)]
    pub headers: ObjectHeaders,
    /// Upload even if an object already exists at the key.
    #[serde(default)]
    pub overwrite: bool,
    /// Transport compression.
    #[serde(default)]
    pub compression: CompressionType,
    /// Layout used to derive storage keys.
    #[serde(default)]
    pub key_builder: DefaultKeyBuilder,
}

impl PublisherConfig {
    /// Create a config targeting `bucket` with defaults for everything else.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration before use.
    pub fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            return Err(Error::InvalidInput("Bucket name must not be empty".into()));
        }
        Ok(())
    }

    pub fn with_acl(mut self, acl: CannedAcl) -> Self {
        self.acl = acl;
        self
    }

    pub fn with_headers(mut self, headers: ObjectHeaders) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_gzip(self) -> Self {
        self.with_compression(CompressionType::Gzip)
    }

    /// Derive keys from a physical root and a virtual directory.
    pub fn with_key_layout(
        mut self,
        physical_root: impl Into<String>,
        virtual_directory: impl Into<String>,
    ) -> Self {
        self.key_builder = DefaultKeyBuilder::new(physical_root, virtual_directory);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_methods() {
        let config = PublisherConfig::new("assets")
            .with_acl(CannedAcl::PublicRead)
            .with_header("Cache-Control", "max-age=31536000")
            .with_overwrite(true)
            .with_gzip()
            .with_key_layout("/srv/site", "static");

        assert_eq!(config.bucket, "assets");
        assert_eq!(config.acl, CannedAcl::PublicRead);
        assert_eq!(config.headers.get("cache-control"), Some("max-age=31536000"));
        assert!(config.overwrite);
        assert_eq!(config.compression, CompressionType::Gzip);
        assert_eq!(config.key_builder.virtual_directory, "static");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bucket: assets\nacl: public-read\ncompression: zstd\nheaders:\n  Cache-Control: max-age=60\nkey_builder:\n  physical_root: /srv/site\n"
        )
        .unwrap();

        let config = PublisherConfig::from_file(file.path()).unwrap();

        assert_eq!(config.bucket, "assets");
        assert_eq!(config.acl, CannedAcl::PublicRead);
        assert_eq!(config.compression, CompressionType::Zstd);
        assert!(!config.overwrite);
        assert_eq!(config.headers.get("cache-control"), Some("max-age=60"));
        assert_eq!(config.key_builder.physical_root, "/srv/site");
        assert_eq!(config.key_builder.virtual_directory, "");
    }

    #[test]
    fn test_empty_bucket_is_rejected() {
        let err = PublisherConfig::new("  ").validate().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = PublisherConfig::from_file(Path::new("/nonexistent/cirrus.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
