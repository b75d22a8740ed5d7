use crate::traits::{StorageError, StorageResult, VideoStorage};
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use clipvault_core::constants::UPLOAD_PART_URL_TTL;
use clipvault_core::PartInfo;
use std::time::{Duration, Instant};

/// S3 storage implementation
///
/// Two clients share one SDK config: `client` talks to the endpoint reachable from the
/// service, `presign_client` signs URLs against the endpoint reachable from browsers.
/// They only differ when an S3-compatible provider is published under another host.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    presign_client: Client,
    bucket: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint for S3-compatible providers
    ///   (e.g., "http://minio:9000")
    /// * `public_url` - Optional endpoint used when presigning, when clients reach
    ///   storage through a different host than the service (e.g., "http://localhost:9000")
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        public_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        let client = Self::build_client(&config, endpoint_url.as_deref());
        let presign_client =
            Self::build_client(&config, public_url.as_deref().or(endpoint_url.as_deref()));

        tracing::info!(
            bucket = %bucket,
            region = %region,
            endpoint = ?endpoint_url,
            public_url = ?public_url,
            "S3 storage client configured"
        );

        Ok(S3Storage {
            client,
            presign_client,
            bucket,
        })
    }

    fn build_client(config: &SdkConfig, endpoint_url: Option<&str>) -> Client {
        match endpoint_url {
            // S3-compatible providers (MinIO, etc.) need path-style addressing
            Some(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
            None => Client::new(config),
        }
    }

    /// Create the bucket if it does not exist yet. An already existing bucket is fine.
    pub async fn ensure_bucket(&self) -> StorageResult<()> {
        match self.client.create_bucket().bucket(&self.bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket = %self.bucket, "S3 bucket created");
                Ok(())
            }
            Err(e) => {
                let already_there = e
                    .as_service_error()
                    .map(|se| se.is_bucket_already_owned_by_you() || se.is_bucket_already_exists())
                    .unwrap_or(false);
                if already_there {
                    tracing::debug!(bucket = %self.bucket, "S3 bucket already exists");
                    Ok(())
                } else {
                    Err(StorageError::ConfigError(format!(
                        "Failed to create bucket {}: {}",
                        self.bucket,
                        DisplayErrorContext(&e)
                    )))
                }
            }
        }
    }

    fn presigning_config(expires_in: Duration) -> StorageResult<PresigningConfig> {
        PresigningConfig::builder()
            .expires_in(expires_in)
            .build()
            .map_err(|e| StorageError::PresignFailed(e.to_string()))
    }
}

#[async_trait]
impl VideoStorage for S3Storage {
    async fn start_upload_session(&self, key: &str) -> StorageResult<String> {
        let start = Instant::now();

        let output = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Failed to create multipart upload"
                );
                StorageError::SessionFailed(DisplayErrorContext(&e).to_string())
            })?;

        let upload_id = output.upload_id().ok_or_else(|| {
            StorageError::SessionFailed("No upload ID returned from S3".to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            upload_id = %upload_id,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload started"
        );

        Ok(upload_id.to_string())
    }

    async fn generate_upload_part_url(
        &self,
        key: &str,
        session_id: &str,
        part_number: i32,
    ) -> StorageResult<String> {
        let presigning_config = Self::presigning_config(UPLOAD_PART_URL_TTL)?;

        let presigned_request = self
            .presign_client
            .upload_part()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(session_id)
            .part_number(part_number)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn commit_upload_session(
        &self,
        key: &str,
        session_id: &str,
        parts: &[PartInfo],
    ) -> StorageResult<()> {
        let start = Instant::now();

        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|part| {
                CompletedPart::builder()
                    .part_number(part.part_number)
                    .e_tag(&part.id)
                    .build()
            })
            .collect();

        let completed_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(session_id)
            .multipart_upload(completed_upload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    upload_id = %session_id,
                    part_count = parts.len(),
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Failed to complete multipart upload"
                );
                StorageError::SessionFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            upload_id = %session_id,
            part_count = parts.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload completed"
        );

        Ok(())
    }

    async fn generate_temporary_access_url(
        &self,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let presigning_config = Self::presigning_config(expires_in)?;

        let presigned_request = self
            .presign_client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::PresignFailed(DisplayErrorContext(&e).to_string()))?;

        Ok(presigned_request.uri().to_string())
    }

    async fn delete_source(&self, key: &str) -> StorageResult<()> {
        let start = Instant::now();

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %DisplayErrorContext(&e),
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(DisplayErrorContext(&e).to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }
}
