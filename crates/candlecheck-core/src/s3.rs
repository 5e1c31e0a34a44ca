//! S3-compatible artifact store.

use std::path::Path;

use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::store::{ArtifactStore, StoreFuture};
use crate::TransferError;

pub const DEFAULT_REGION: &str = "us-east-1";

/// Connection settings for an S3-compatible endpoint with static credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .finish_non_exhaustive()
    }
}

/// One bucket on an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ArtifactStore {
    client: Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(settings: &S3Settings, bucket: impl Into<String>) -> Self {
        let credentials = Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "candlecheck-static",
        );

        let mut builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true);
        if let Some(endpoint) = &settings.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Self::with_client(Client::from_conf(builder.build()), bucket)
    }

    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Same connection, different bucket.
    pub fn for_bucket(&self, bucket: impl Into<String>) -> Self {
        Self::with_client(self.client.clone(), bucket)
    }
}

impl ArtifactStore for S3ArtifactStore {
    fn exists<'a>(&'a self, key: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let result = self
                .client
                .head_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await;

            match result {
                Ok(_) => Ok(true),
                Err(error) if error.as_service_error().is_some_and(|e| e.is_not_found()) => {
                    Ok(false)
                }
                Err(error) => Err(TransferError::request(key, DisplayErrorContext(&error))),
            }
        })
    }

    fn download<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Vec<u8>> {
        Box::pin(async move {
            let output = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(key)
                .send()
                .await
                .map_err(|error| TransferError::request(key, DisplayErrorContext(&error)))?;

            let body = output
                .body
                .collect()
                .await
                .map_err(|error| TransferError::request(key, error))?;
            Ok(body.into_bytes().to_vec())
        })
    }

    fn upload<'a>(&'a self, local_path: &'a Path, destination_key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let body = tokio::fs::read(local_path)
                .await
                .map_err(|error| TransferError::local_file(local_path, error))?;

            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(destination_key)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|error| TransferError::request(destination_key, DisplayErrorContext(&error)))?;

            tracing::info!(bucket = %self.bucket, key = destination_key, "uploaded to store");
            Ok(())
        })
    }
}
