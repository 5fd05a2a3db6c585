//! Cloud resource adapters.
//!
//! Each adapter method makes exactly one call to the managed service and
//! reshapes the answer into a plain serializable value. Failures are logged
//! and returned as [`CloudError`] with the failing operation as prefix. There
//! are no retries beyond what the SDK does on its own.
//!
//! Handlers only see the [`ObjectStore`], [`CdnService`] and
//! [`FunctionService`] traits, bundled in [`CloudAdapters`]. The AWS
//! implementations live in the submodules; tests substitute their own.

pub mod cloudfront;
pub mod error;
pub mod lambda;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use serde::Serialize;

use crate::config::AwsConfig;

pub use cloudfront::CloudFrontCdn;
pub use error::CloudError;
pub use lambda::LambdaFunctions;
pub use s3::S3Storage;

/// Object storage (S3).
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key` and return its public URL.
    async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError>;

    /// Keys starting with `prefix`.
    async fn list_files(&self, prefix: &str) -> Result<Vec<String>, CloudError>;

    async fn delete_file(&self, key: &str) -> Result<(), CloudError>;

    /// Public URL for `key` in the default bucket.
    fn file_url(&self, key: &str) -> String;
}

/// A CDN distribution as listed by [`CdnService::list_distributions`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionSummary {
    pub id: String,
    pub domain_name: String,
    pub enabled: bool,
    pub status: String,
    /// Origin domain names.
    pub origins: Vec<String>,
}

/// A started cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationSummary {
    pub id: String,
    pub status: String,
    pub create_time: Option<String>,
    pub paths: Vec<String>,
}

/// Content delivery network (CloudFront).
#[async_trait]
pub trait CdnService: Send + Sync {
    async fn list_distributions(&self) -> Result<Vec<DistributionSummary>, CloudError>;

    async fn invalidate_cache(
        &self,
        distribution_id: &str,
        paths: &[String],
    ) -> Result<InvalidationSummary, CloudError>;
}

/// A deployed serverless function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionSummary {
    pub name: Option<String>,
    pub arn: Option<String>,
    pub runtime: Option<String>,
    pub description: Option<String>,
    pub last_modified: Option<String>,
    pub memory_size: Option<i32>,
    pub timeout: Option<i32>,
}

/// Serverless functions (Lambda).
#[async_trait]
pub trait FunctionService: Send + Sync {
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, CloudError>;

    /// Invoke synchronously with a JSON payload.
    ///
    /// The response payload is parsed as JSON when possible, otherwise
    /// returned as a string. A missing payload is `null`.
    async fn invoke(
        &self,
        function_name: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, CloudError>;
}

/// All cloud adapters used by the HTTP layer.
#[derive(Clone)]
pub struct CloudAdapters {
    pub storage: Arc<dyn ObjectStore>,
    pub cdn: Arc<dyn CdnService>,
    pub functions: Arc<dyn FunctionService>,
}

impl CloudAdapters {
    /// Build AWS clients for the configured region.
    ///
    /// Explicit credentials from the config take precedence. Without them
    /// the SDK's default provider chain applies, so the clients are always
    /// constructed and only fail when a call is made.
    pub async fn from_config(aws: &AwsConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));

        if let (Some(key_id), Some(secret)) =
            (aws.access_key_id.as_deref(), aws.expose_secret_access_key())
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "storefront-config",
            ));
        }

        let sdk_config = loader.load().await;

        Self {
            storage: Arc::new(S3Storage::new(
                aws_sdk_s3::Client::new(&sdk_config),
                aws.bucket.clone(),
                aws.region.clone(),
            )),
            cdn: Arc::new(CloudFrontCdn::new(aws_sdk_cloudfront::Client::new(
                &sdk_config,
            ))),
            functions: Arc::new(LambdaFunctions::new(aws_sdk_lambda::Client::new(
                &sdk_config,
            ))),
        }
    }
}

impl std::fmt::Debug for CloudAdapters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudAdapters").finish_non_exhaustive()
    }
}

/// Public URL of an object in a bucket.
#[must_use]
pub fn s3_object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

/// URL of `path` served through a CloudFront distribution domain.
#[must_use]
pub fn cloudfront_url(distribution_domain: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("https://{distribution_domain}{path}")
    } else {
        format!("https://{distribution_domain}/{path}")
    }
}
