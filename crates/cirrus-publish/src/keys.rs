//! Storage key construction.

use serde::{Deserialize, Serialize};

/// Maps an output path to a storage key.
pub trait KeyBuilder: Send + Sync {
    fn key_for(&self, output_path: &str) -> String;
}

impl<F> KeyBuilder for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn key_for(&self, output_path: &str) -> String {
        self(output_path)
    }
}

/// Key builder that mirrors the application's directory layout.
///
/// The physical root is stripped from the output path and the remainder is
/// placed under the virtual directory. Keys use `/` separators and never
/// start with one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultKeyBuilder {
    /// Filesystem root of the application, e.g. `/srv/site`.
    #[serde(default)]
    pub physical_root: String,
    /// Prefix placed in front of every key, e.g. `static`.
    #[serde(default)]
    pub virtual_directory: String,
}

impl DefaultKeyBuilder {
    pub fn new(physical_root: impl Into<String>, virtual_directory: impl Into<String>) -> Self {
        Self {
            physical_root: physical_root.into(),
            virtual_directory: virtual_directory.into(),
        }
    }
}

impl KeyBuilder for DefaultKeyBuilder {
    fn key_for(&self, output_path: &str) -> String {
        let path = normalize(output_path);
        let root = normalize(&self.physical_root);

        let relative = if root.is_empty() {
            path.as_str()
        } else {
            match path.strip_prefix(root.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => path.as_str(),
            }
        };

        normalize(&format!("{}/{}", normalize(&self.virtual_directory), relative))
    }
}

/// Convert separators to `/`, drop empty and `.` segments, and trim the
/// leading and trailing separator.
fn normalize(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}
