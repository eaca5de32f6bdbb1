//! S3 object store adapter.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use cirrus_core::object::{ObjectMetadata, PutObjectRequest};
use cirrus_core::ports::ObjectStore;
use cirrus_core::{Error, Result};
use tracing::debug;

const USER_METADATA_PREFIX: &str = "x-amz-meta-";

/// Where an object header ends up on a `PutObject` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderTarget<'a> {
    ContentType,
    ContentEncoding,
    CacheControl,
    ContentDisposition,
    ContentLanguage,
    Metadata(&'a str),
}

fn header_target(name: &str) -> HeaderTarget<'_> {
    match name {
        "content-type" => HeaderTarget::ContentType,
        "content-encoding" => HeaderTarget::ContentEncoding,
        "cache-control" => HeaderTarget::CacheControl,
        "content-disposition" => HeaderTarget::ContentDisposition,
        "content-language" => HeaderTarget::ContentLanguage,
        other => HeaderTarget::Metadata(other.strip_prefix(USER_METADATA_PREFIX).unwrap_or(other)),
    }
}

/// Object store backed by Amazon S3 or an S3-compatible service.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential and region chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, request: PutObjectRequest) -> Result<()> {
        let PutObjectRequest {
            bucket,
            key,
            body,
            acl,
            headers,
        } = request;

        let mut call = self
            .client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(body));

        if let Some(acl) = acl.as_header_value() {
            call = call.acl(ObjectCannedAcl::from(acl));
        }

        for (name, value) in headers.iter() {
            call = match header_target(name) {
                HeaderTarget::ContentType => call.content_type(value),
                HeaderTarget::ContentEncoding => call.content_encoding(value),
                HeaderTarget::CacheControl => call.cache_control(value),
                HeaderTarget::ContentDisposition => call.content_disposition(value),
                HeaderTarget::ContentLanguage => call.content_language(value),
                HeaderTarget::Metadata(meta) => call.metadata(meta, value),
            };
        }

        call.send().await.map_err(|e| {
            Error::Storage(format!(
                "Failed to upload {}/{}: {}",
                bucket,
                key,
                DisplayErrorContext(&e)
            ))
        })?;

        debug!(bucket = %bucket, key = %key, "PutObject completed");
        Ok(())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata> {
        match self.client.head_object().bucket(bucket).key(key).send().await {
            Ok(output) => Ok(ObjectMetadata {
                content_length: output.content_length(),
                content_type: output.content_type().map(str::to_string),
                content_encoding: output.content_encoding().map(str::to_string),
                e_tag: output.e_tag().map(str::to_string),
            }),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => {
                Err(Error::ObjectNotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => Err(Error::Storage(format!(
                "Failed to read metadata for {}/{}: {}",
                bucket,
                key,
                DisplayErrorContext(&e)
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_targets() {
        assert_eq!(header_target("content-type"), HeaderTarget::ContentType);
        assert_eq!(header_target("content-encoding"), HeaderTarget::ContentEncoding);
        assert_eq!(header_target("cache-control"), HeaderTarget::CacheControl);
        assert_eq!(header_target("x-amz-meta-build"), HeaderTarget::Metadata("build"));
        assert_eq!(header_target("x-origin"), HeaderTarget::Metadata("x-origin"));
    }
}
