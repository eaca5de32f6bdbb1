//! Error types for Cirrus.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Caller errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Object store errors
    #[error("Object not found: {bucket}/{key}")]
    ObjectNotFound { bucket: String, key: String },

    #[error("Object store error: {0}")]
    Storage(String),

    // CDN control plane errors
    #[error("CDN error: {0}")]
    Cdn(String),

    // Content errors
    #[error("Compression failed: {0}")]
    Compression(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error came from a remote service rather than local input.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Storage(_) | Error::Cdn(_))
    }

    /// Whether this is the "object absent" outcome of an existence probe.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ObjectNotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::Storage("denied".into()).is_remote());
        assert!(Error::Cdn("throttled".into()).is_remote());
        assert!(!Error::InvalidInput("empty".into()).is_remote());

        let missing = Error::ObjectNotFound {
            bucket: "assets".into(),
            key: "css/a.css".into(),
        };
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "Object not found: assets/css/a.css");
    }
}
