//! Testcontainer configurations for integration tests.

use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::minio::MinIO;

/// MinIO container standing in for S3.
pub struct MinioContainer {
    #[allow(dead_code)] // Kept to maintain container lifetime
    container: ContainerAsync<MinIO>,
    endpoint: String,
    access_key: String,
    secret_key: String,
}

impl MinioContainer {
    pub async fn start() -> anyhow::Result<Self> {
        let container = MinIO::default().with_tag("latest").start().await?;

        let host = container.get_host().await?;
        let port = container.get_host_port_ipv4(9000).await?;
        let endpoint = format!("http://{}:{}", host, port);
        tracing::debug!(endpoint = %endpoint, "Started MinIO container");

        Ok(Self {
            container,
            endpoint,
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// S3 client pointed at this container with path-style addressing.
    pub fn s3_client(&self) -> aws_sdk_s3::Client {
        let credentials = Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            "minio",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(&self.endpoint)
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();
        aws_sdk_s3::Client::from_conf(config)
    }

    /// Create `bucket` on the container.
    pub async fn create_bucket(&self, bucket: &str) -> anyhow::Result<()> {
        self.s3_client().create_bucket().bucket(bucket).send().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn test_minio_container_starts() {
        let minio = MinioContainer::start().await.unwrap();
        assert!(minio.endpoint().contains("http://"));
    }
}
