//! Object store types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Predefined access-control policy applied to an uploaded object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CannedAcl {
    /// Leave the ACL unset and inherit the bucket default.
    #[default]
    NoAcl,
    Private,
    PublicRead,
    PublicReadWrite,
    AuthenticatedRead,
    BucketOwnerRead,
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// Wire name of the ACL, or `None` when no ACL should be sent.
    pub fn as_header_value(&self) -> Option<&'static str> {
        match self {
            CannedAcl::NoAcl => None,
            CannedAcl::Private => Some("private"),
            CannedAcl::PublicRead => Some("public-read"),
            CannedAcl::PublicReadWrite => Some("public-read-write"),
            CannedAcl::AuthenticatedRead => Some("authenticated-read"),
            CannedAcl::BucketOwnerRead => Some("bucket-owner-read"),
            CannedAcl::BucketOwnerFullControl => Some("bucket-owner-full-control"),
        }
    }
}

/// HTTP headers stored with an object.
///
/// Names are case-insensitive and kept lowercased; inserting a name twice
/// replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct ObjectHeaders(BTreeMap<String, String>);

impl ObjectHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().trim().to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Merge `other` into `self`; values from `other` win.
    pub fn extend(&mut self, other: &ObjectHeaders) {
        for (name, value) in &other.0 {
            self.0.insert(name.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, String>> for ObjectHeaders {
    fn from(map: BTreeMap<String, String>) -> Self {
        let mut headers = ObjectHeaders::new();
        for (name, value) in map {
            headers.insert(name, value);
        }
        headers
    }
}

impl From<ObjectHeaders> for BTreeMap<String, String> {
    fn from(headers: ObjectHeaders) -> Self {
        headers.0
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ObjectHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = ObjectHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A single upload to the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectRequest {
    pub bucket: String,
    pub key: String,
    pub body: Vec<u8>,
    pub acl: CannedAcl,
    pub headers: ObjectHeaders,
}

/// Metadata returned by an existence probe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_length: Option<i64>,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub e_tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = ObjectHeaders::new();
        headers.insert("Content-Encoding", "gzip");
        headers.insert("content-encoding", "zstd");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-ENCODING"), Some("zstd"));
    }

    #[test]
    fn test_headers_extend_overrides() {
        let mut base = ObjectHeaders::new()
            .with("Cache-Control", "max-age=60")
            .with("Content-Type", "text/css");
        let overrides = ObjectHeaders::new().with("cache-control", "max-age=3600");

        base.extend(&overrides);

        assert_eq!(base.get("cache-control"), Some("max-age=3600"));
        assert_eq!(base.get("content-type"), Some("text/css"));
    }

    #[test]
    fn test_canned_acl_wire_names() {
        assert_eq!(CannedAcl::NoAcl.as_header_value(), None);
        assert_eq!(CannedAcl::PublicRead.as_header_value(), Some("public-read"));
        let parsed: CannedAcl = serde_json::from_str("\"bucket-owner-full-control\"").unwrap();
        assert_eq!(parsed, CannedAcl::BucketOwnerFullControl);
    }
}
