//! S3 object storage.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{info, instrument};

use super::{CloudError, ObjectStore, s3_object_url};

/// [`ObjectStore`] backed by a single S3 bucket.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
}

impl S3Storage {
    #[must_use]
    pub const fn new(client: Client, bucket: String, region: String) -> Self {
        Self {
            client,
            bucket,
            region,
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    #[instrument(skip(self, body), fields(bucket = %self.bucket, size = body.len()))]
    async fn upload_file(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, CloudError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| CloudError::sdk("S3 upload", &e))?;

        info!(key, "Uploaded file to S3");
        Ok(self.file_url(key))
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn list_files(&self, prefix: &str) -> Result<Vec<String>, CloudError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .send()
            .await
            .map_err(|e| CloudError::sdk("S3 list", &e))?;

        Ok(output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect())
    }

    #[instrument(skip(self), fields(bucket = %self.bucket))]
    async fn delete_file(&self, key: &str) -> Result<(), CloudError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| CloudError::sdk("S3 delete", &e))?;

        info!(key, "Deleted file from S3");
        Ok(())
    }

    fn file_url(&self, key: &str) -> String {
        s3_object_url(&self.bucket, &self.region, key)
    }
}
