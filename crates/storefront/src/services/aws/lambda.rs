//! Lambda listing and invocation.

use async_trait::async_trait;
use aws_sdk_lambda::Client;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use tracing::{instrument, warn};

use super::{CloudError, FunctionService, FunctionSummary};

const INVOKE: &str = "Lambda invoke";

#[derive(Debug, Clone)]
pub struct LambdaFunctions {
    client: Client,
}

impl LambdaFunctions {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

/// JSON when the bytes parse as JSON, otherwise the text itself.
pub(crate) fn decode_payload(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| {
        serde_json::Value::String(String::from_utf8_lossy(bytes).into_owned())
    })
}

#[async_trait]
impl FunctionService for LambdaFunctions {
    #[instrument(skip(self))]
    async fn list_functions(&self) -> Result<Vec<FunctionSummary>, CloudError> {
        let output = self
            .client
            .list_functions()
            .send()
            .await
            .map_err(|e| CloudError::sdk("Lambda list functions", &e))?;

        Ok(output
            .functions()
            .iter()
            .map(|f| FunctionSummary {
                name: f.function_name().map(str::to_string),
                arn: f.function_arn().map(str::to_string),
                runtime: f.runtime().map(|r| r.as_str().to_string()),
                description: f.description().map(str::to_string),
                last_modified: f.last_modified().map(str::to_string),
                memory_size: f.memory_size(),
                timeout: f.timeout(),
            })
            .collect())
    }

    #[instrument(skip(self, payload))]
    async fn invoke(
        &self,
        function_name: &str,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, CloudError> {
        let body = serde_json::to_vec(payload).map_err(|e| CloudError::sdk(INVOKE, &e))?;

        let output = self
            .client
            .invoke()
            .function_name(function_name)
            .invocation_type(InvocationType::RequestResponse)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| CloudError::sdk(INVOKE, &e))?;

        if let Some(function_error) = output.function_error() {
            warn!(function_name, function_error, "Function returned an error");
        }

        Ok(output
            .payload()
            .map_or(serde_json::Value::Null, |blob| decode_payload(blob.as_ref())))
    }
}
