//! Transport compression for uploaded content.

use crate::types::CompressionType;
use cirrus_core::object::ObjectHeaders;
use cirrus_core::{Error, Result};
use std::io::Write;

/// Content ready to upload together with the headers describing its encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedContent {
    pub body: Vec<u8>,
    pub headers: ObjectHeaders,
}

/// Encodes content for transport.
pub trait Compressor: Send + Sync {
    /// Compress `content`.
    fn compress(&self, content: &[u8]) -> Result<CompressedContent>;

    /// Headers every object produced by this compressor must carry.
    fn headers(&self) -> ObjectHeaders;
}

/// Compressor for one of the built-in codecs.
#[derive(Debug, Clone, Copy)]
pub struct CodecCompressor {
    algorithm: CompressionType,
    level: i32,
}

impl CodecCompressor {
    pub fn new(algorithm: CompressionType) -> Self {
        let level = match algorithm {
            CompressionType::Zstd => 3,
            _ => flate2::Compression::default().level() as i32,
        };
        Self { algorithm, level }
    }

    pub fn gzip() -> Self {
        Self::new(CompressionType::Gzip)
    }

    pub fn zstd() -> Self {
        Self::new(CompressionType::Zstd)
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    pub fn algorithm(&self) -> CompressionType {
        self.algorithm
    }
}

impl Compressor for CodecCompressor {
    fn compress(&self, content: &[u8]) -> Result<CompressedContent> {
        let body = match self.algorithm {
            CompressionType::None => content.to_vec(),
            CompressionType::Gzip => compress_gzip(content, self.level)?,
            CompressionType::Zstd => compress_zstd(content, self.level)?,
        };
        Ok(CompressedContent {
            body,
            headers: self.headers(),
        })
    }

    fn headers(&self) -> ObjectHeaders {
        let mut headers = ObjectHeaders::new();
        if let Some(encoding) = self.algorithm.content_encoding() {
            headers.insert("Content-Encoding", encoding);
        }
        headers
    }
}

fn compress_gzip(data: &[u8], level: i32) -> Result<Vec<u8>> {
    let level = flate2::Compression::new(level.clamp(0, 9) as u32);
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), level);
    encoder
        .write_all(data)
        .map_err(|e| Error::Compression(format!("Gzip write failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| Error::Compression(format!("Gzip finish failed: {}", e)))
}

fn compress_zstd(data: &[u8], level: i32) -> Result<Vec<u8>> {
    zstd::encode_all(data, level)
        .map_err(|e| Error::Compression(format!("Zstd compression failed: {}", e)))
}
