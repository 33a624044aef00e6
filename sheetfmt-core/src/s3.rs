//! S3 blob storage for the two-phase upload/process/download flow.
//!
//! Clients upload the source workbook straight to the bucket through a
//! presigned PUT URL, the service formats it in place, and the result is
//! fetched through a presigned GET URL.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;

use crate::error::{Result, SheetfmtError};
use crate::XLSX_CONTENT_TYPE;

/// Configuration for S3 operations.
#[derive(Clone, Debug, Default)]
pub struct S3Config {
    /// AWS region (e.g., "us-east-1"). If None, uses default region.
    pub region: Option<String>,
    /// Custom endpoint URL (for S3-compatible services like MinIO).
    pub endpoint_url: Option<String>,
    /// Force path-style addressing (required for some S3-compatible services).
    pub force_path_style: bool,
}

impl S3Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint URL (for S3-compatible services).
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_path_style(mut self) -> Self {
        self.force_path_style = true;
        self
    }
}

/// Create an S3 client with the given configuration.
async fn create_s3_client(config: &S3Config) -> Client {
    let mut aws_config_loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(ref region) = config.region {
        aws_config_loader = aws_config_loader.region(aws_sdk_s3::config::Region::new(region.clone()));
    }
    let aws_config = aws_config_loader.load().await;

    let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);
    if let Some(ref endpoint) = config.endpoint_url {
        s3_config_builder = s3_config_builder.endpoint_url(endpoint);
    }
    if config.force_path_style {
        s3_config_builder = s3_config_builder.force_path_style(true);
    }

    Client::from_conf(s3_config_builder.build())
}

/// A single bucket plus the client used to reach it.
#[derive(Clone, Debug)]
pub struct BlobStore {
    client: Client,
    bucket: String,
    presign_expiry: Duration,
}

impl BlobStore {
    /// Build a store for `bucket`. Presigned URLs stay valid for `presign_expiry`.
    pub async fn connect(bucket: impl Into<String>, config: &S3Config, presign_expiry: Duration) -> Self {
        BlobStore {
            client: create_s3_client(config).await,
            bucket: bucket.into(),
            presign_expiry,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn presigning(&self) -> Result<PresigningConfig> {
        PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| SheetfmtError::S3Error(format!("Invalid presign expiry: {}", e)))
    }

    /// URL a client can PUT an xlsx body to.
    pub async fn presign_upload(&self, key: &str) -> Result<String> {
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(XLSX_CONTENT_TYPE)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| SheetfmtError::S3Error(format!("Failed to presign upload: {}", e)))?;
        Ok(request.uri().to_string())
    }

    /// URL a client can GET an object from.
    pub async fn presign_download(&self, key: &str) -> Result<String> {
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(self.presigning()?)
            .await
            .map_err(|e| SheetfmtError::S3Error(format!("Failed to presign download: {}", e)))?;
        Ok(request.uri().to_string())
    }

    /// Fetch an object's bytes.
    pub async fn get_bytes(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| SheetfmtError::S3Error(format!("Failed to get object from S3: {}", e)))?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| SheetfmtError::S3Error(format!("Failed to read S3 response body: {}", e)))?;
        Ok(data.into_bytes().to_vec())
    }

    /// Store an xlsx body under `key`.
    pub async fn put_bytes(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(data.into())
            .content_type(XLSX_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| SheetfmtError::S3Error(format!("Failed to put object to S3: {}", e)))?;
        Ok(())
    }
}
