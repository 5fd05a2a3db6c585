//! Admin routes for the cloud resource adapters.
//!
//! Each handler forwards to one adapter call. Upstream failures surface as
//! `AppError::Upstream` (500 with the prefixed message).

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::services::aws::{DistributionSummary, FunctionSummary, InvalidationSummary};
use crate::state::AppState;
use crate::validation::{RequestSchema, ValidatedJson};

/// Multipart field carrying the upload.
const UPLOAD_FIELD: &str = "file";

/// Key prefix for uploaded files.
const UPLOAD_PREFIX: &str = "uploads";

#[derive(Debug, Serialize)]
pub struct AwsStatus {
    pub configured: bool,
    pub region: String,
}

/// Whether credentials are configured, and for which region.
#[instrument(skip(state))]
pub async fn config(State(state): State<AppState>) -> Json<AwsStatus> {
    let aws = &state.config().aws;
    Json(AwsStatus {
        configured: aws.is_configured(),
        region: aws.region.clone(),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub message: &'static str,
    pub file_key: String,
    pub file_url: String,
}

/// Object key for an upload: `uploads/<millis>-<file name>`.
///
/// Only the last path component of the client-supplied name is kept.
fn upload_key(millis: i64, file_name: &str) -> String {
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .filter(|n| !n.is_empty())
        .unwrap_or("upload");
    format!("{UPLOAD_PREFIX}/{millis}-{name}")
}

/// Upload the `file` field of a multipart form to object storage.
#[instrument(skip(state, multipart))]
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;

        let file_key = upload_key(Utc::now().timestamp_millis(), &file_name);
        let file_url = state
            .cloud()
            .storage
            .upload_file(&file_key, data.to_vec(), &content_type)
            .await?;

        tracing::info!(file_key = %file_key, size = data.len(), "File uploaded");
        return Ok(Json(UploadResponse {
            success: true,
            message: "File uploaded successfully",
            file_key,
            file_url,
        }));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub prefix: String,
}

#[derive(Debug, Serialize)]
pub struct FileList {
    pub success: bool,
    pub files: Vec<String>,
}

/// Keys in the default bucket, optionally under a prefix.
#[instrument(skip(state))]
pub async fn list_files(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<FileList>> {
    let files = state.cloud().storage.list_files(&params.prefix).await?;
    Ok(Json(FileList {
        success: true,
        files,
    }))
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

/// Delete one object. The key may contain slashes.
#[instrument(skip(state))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ActionResponse>> {
    state.cloud().storage.delete_file(&key).await?;
    Ok(Json(ActionResponse {
        success: true,
        message: format!("File {key} deleted successfully"),
    }))
}

#[derive(Debug, Serialize)]
pub struct DistributionList {
    pub success: bool,
    pub distributions: Vec<DistributionSummary>,
}

#[instrument(skip(state))]
pub async fn list_distributions(State(state): State<AppState>) -> Result<Json<DistributionList>> {
    let distributions = state.cloud().cdn.list_distributions().await?;
    Ok(Json(DistributionList {
        success: true,
        distributions,
    }))
}

/// Body of `POST /api/aws/cloudfront/invalidate`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvalidateRequest {
    #[validate(required, length(min = 1))]
    pub distribution_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub paths: Option<Vec<String>>,
}

impl RequestSchema for InvalidateRequest {
    const INVALID_MESSAGE: &'static str =
        "Invalid data. Provide a distributionId and an array of paths";
}

#[derive(Debug, Serialize)]
pub struct InvalidationResponse {
    pub success: bool,
    pub message: &'static str,
    pub invalidation: InvalidationSummary,
}

/// Start a cache invalidation for the given paths.
#[instrument(skip(state, body))]
pub async fn invalidate(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<InvalidateRequest>,
) -> Result<Json<InvalidationResponse>> {
    let distribution_id = body.distribution_id.unwrap_or_default();
    let paths = body.paths.unwrap_or_default();

    let invalidation = state
        .cloud()
        .cdn
        .invalidate_cache(&distribution_id, &paths)
        .await?;

    Ok(Json(InvalidationResponse {
        success: true,
        message: "Cache invalidation started",
        invalidation,
    }))
}

#[derive(Debug, Serialize)]
pub struct FunctionList {
    pub success: bool,
    pub functions: Vec<FunctionSummary>,
}

#[instrument(skip(state))]
pub async fn list_functions(State(state): State<AppState>) -> Result<Json<FunctionList>> {
    let functions = state.cloud().functions.list_functions().await?;
    Ok(Json(FunctionList {
        success: true,
        functions,
    }))
}

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    pub success: bool,
    pub message: String,
    pub result: serde_json::Value,
}

/// Invoke a function synchronously with the request body as payload. An
/// empty body sends `{}`.
#[instrument(skip(state, payload))]
pub async fn invoke_function(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
    payload: Option<Json<serde_json::Value>>,
) -> Result<Json<InvokeResponse>> {
    let payload = payload.map_or_else(|| serde_json::json!({}), |Json(value)| value);

    let result = state
        .cloud()
        .functions
        .invoke(&function_name, &payload)
        .await?;

    Ok(Json(InvokeResponse {
        success: true,
        message: format!("Function {function_name} invoked successfully"),
        result,
    }))
}
