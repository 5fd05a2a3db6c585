//! Cloud adapter error type.

use aws_sdk_s3::error::DisplayErrorContext;
use thiserror::Error;

/// A failed managed-service call.
///
/// The message is prefixed with the operation that failed, e.g.
/// `S3 upload failed: NoSuchBucket`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {detail}")]
pub struct CloudError {
    operation: String,
    detail: String,
}

impl CloudError {
    pub fn new(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: detail.into(),
        }
    }

    /// Wrap an SDK error and log it.
    pub(crate) fn sdk<E: std::error::Error>(operation: &str, err: &E) -> Self {
        let error = Self::new(operation, DisplayErrorContext(err).to_string());
        tracing::error!(operation, error = %error, "Cloud request failed");
        error
    }

    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}
