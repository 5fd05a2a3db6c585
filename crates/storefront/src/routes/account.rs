//! Account profile route handlers.
//!
//! There is no customer login yet, so these routes serve a single fixed
//! profile. Updates are validated and echoed back but not stored.

use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::error::Result;
use crate::validation::{RequestSchema, ValidatedJson};

/// The profile shown on the account page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Id of the only profile.
const PROFILE_ID: &str = "1";

fn demo_profile() -> Profile {
    Profile {
        id: PROFILE_ID.to_string(),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        phone: Some("(555) 123-4567".to_string()),
        address: Some("123 Adventure Ave".to_string()),
        city: Some("New York".to_string()),
        state: Some("NY".to_string()),
        zip_code: Some("10001".to_string()),
        country: Some("United States".to_string()),
    }
}

/// Current profile.
#[instrument]
pub async fn show() -> Json<Profile> {
    Json(demo_profile())
}

/// Body of `PUT /api/profile`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(required, length(min = 2))]
    pub first_name: Option<String>,
    #[validate(required, length(min = 2))]
    pub last_name: Option<String>,
    #[validate(required, email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl RequestSchema for UpdateProfileRequest {
    const INVALID_MESSAGE: &'static str = "Invalid profile data";
}

/// Validate a profile update and return the resulting profile.
#[instrument(skip(body))]
pub async fn update(ValidatedJson(body): ValidatedJson<UpdateProfileRequest>) -> Result<Json<Profile>> {
    Ok(Json(Profile {
        id: PROFILE_ID.to_string(),
        first_name: body.first_name.unwrap_or_default(),
        last_name: body.last_name.unwrap_or_default(),
        email: body.email.unwrap_or_default(),
        phone: body.phone,
        address: body.address,
        city: body.city,
        state: body.state,
        zip_code: body.zip_code,
        country: body.country,
    }))
}

/// Body of `PUT /api/profile/password`.
#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(required, length(min = 6))]
    pub current_password: Option<String>,
    #[validate(required, length(min = 8))]
    pub new_password: Option<String>,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest")
            .field("current_password", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

impl RequestSchema for ChangePasswordRequest {
    const INVALID_MESSAGE: &'static str = "Invalid password data";
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Validate a password change. Nothing is stored.
#[instrument(skip(_body))]
pub async fn change_password(
    ValidatedJson(_body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_request_debug_is_redacted() {
        let request = ChangePasswordRequest {
            current_password: Some("hunter22".into()),
            new_password: Some("correct horse".into()),
        };
        let debug = format!("{request:?}");
        assert!(!debug.contains("hunter22"));
        assert!(!debug.contains("correct horse"));
    }

    #[test]
    fn test_demo_profile_shape() {
        let json = serde_json::to_value(demo_profile()).unwrap_or_default();
        assert_eq!(json["id"], "1");
        assert_eq!(json["zipCode"], "10001");
        assert_eq!(json["email"], "john.doe@example.com");
    }
}
