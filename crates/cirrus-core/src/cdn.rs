//! CDN control plane types.

use serde::{Deserialize, Serialize};

/// A distribution as reported by the control plane listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub id: String,
    /// Domain names of every origin, in the order the control plane lists them.
    pub origin_domain_names: Vec<String>,
}

impl DistributionSummary {
    pub fn new(id: impl Into<String>, origins: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            id: id.into(),
            origin_domain_names: origins.into_iter().map(Into::into).collect(),
        }
    }
}

/// Paths purged by one invalidation batch.
///
/// `quantity` always equals `items.len()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidationPaths {
    pub quantity: i32,
    pub items: Vec<String>,
}

impl InvalidationPaths {
    pub fn new(items: Vec<String>) -> Self {
        Self {
            quantity: items.len() as i32,
            items,
        }
    }

    pub fn push(&mut self, path: String) {
        self.items.push(path);
        self.quantity = self.items.len() as i32;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A batched purge request for one distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationRequest {
    pub distribution_id: String,
    /// Client-supplied idempotency token, unique per batch.
    pub caller_reference: String,
    pub paths: InvalidationPaths,
}

/// Acknowledgement of an accepted invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationReceipt {
    pub invalidation_id: String,
    pub status: String,
}

/// Normalize a storage key into an absolute invalidation path.
///
/// Leading separators collapse into exactly one, so `x`, `/x` and `//x`
/// all become `/x`.
pub fn invalidation_path(key: &str) -> String {
    format!("/{}", key.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidation_path_normalization() {
        assert_eq!(invalidation_path("x"), "/x");
        assert_eq!(invalidation_path("/x"), "/x");
        assert_eq!(invalidation_path("//css/a.css"), "/css/a.css");
        assert_eq!(invalidation_path(&invalidation_path("a/b")), "/a/b");
    }

    #[test]
    fn test_paths_quantity_tracks_items() {
        let mut paths = InvalidationPaths::new(vec!["/a".into()]);
        paths.push("/b".into());
        paths.push("/a".into());

        assert_eq!(paths.quantity, 3);
        assert_eq!(paths.items, vec!["/a", "/b", "/a"]);
    }
}
