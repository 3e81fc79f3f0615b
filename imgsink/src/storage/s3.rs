//! S3-compatible object store backed by `aws-sdk-s3`
//!
//! Credentials come from the standard AWS provider chain (environment, profile, instance
//! metadata). Setting `endpoint_url` points the client at any S3-compatible service, e.g. MinIO or
//! the Google Cloud Storage interoperability endpoint.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, retry::RetryConfig, timeout::TimeoutConfig};
use aws_sdk_s3::{
    config::{Region, RequestChecksumCalculation, ResponseChecksumValidation},
    error::{DisplayErrorContext, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use bytes::Bytes;
use tracing::{debug, instrument};

use crate::config::{ChecksumCalculation, S3Config};
use crate::storage::{ObjectStore, Result, StorageError};

/// Object store that issues one `PutObject` per write
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    /// Wrap an already configured client
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from configuration and the ambient AWS environment
    pub async fn from_config(config: &S3Config) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts));

        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url.as_str());
        }
        if let Some(timeout) = config.operation_timeout {
            loader = loader.timeout_config(TimeoutConfig::builder().operation_timeout(timeout).build());
        }

        let shared_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(config.force_path_style)
            .request_checksum_calculation(request_checksums(config.checksum_calculation))
            .response_checksum_validation(response_checksums(config.checksum_calculation))
            .build();

        debug!(
            endpoint_url = ?config.endpoint_url,
            region = ?shared_config.region(),
            checksum_calculation = ?config.checksum_calculation,
            "Created S3 object store client"
        );

        Self::new(aws_sdk_s3::Client::from_conf(s3_config))
    }
}

fn request_checksums(policy: ChecksumCalculation) -> RequestChecksumCalculation {
    match policy {
        ChecksumCalculation::WhenSupported => RequestChecksumCalculation::WhenSupported,
        ChecksumCalculation::WhenRequired => RequestChecksumCalculation::WhenRequired,
    }
}

fn response_checksums(policy: ChecksumCalculation) -> ResponseChecksumValidation {
    match policy {
        ChecksumCalculation::WhenSupported => ResponseChecksumValidation::WhenSupported,
        ChecksumCalculation::WhenRequired => ResponseChecksumValidation::WhenRequired,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    #[instrument(skip(self, content), fields(size = content.len()), err)]
    async fn write(&self, bucket: &str, key: &str, content: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(content))
            .send()
            .await?;

        Ok(())
    }
}

impl From<SdkError<PutObjectError>> for StorageError {
    fn from(err: SdkError<PutObjectError>) -> Self {
        let message = DisplayErrorContext(&err).to_string();
        match err {
            SdkError::ServiceError(_) | SdkError::ConstructionFailure(_) => StorageError::Rejected(message),
            _ => StorageError::Unavailable(message),
        }
    }
}
