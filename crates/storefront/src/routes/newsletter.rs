//! Newsletter subscription route handlers.
//!
//! Signing up from the footer form or the exit-intent popup stores an email
//! subscription and hands back the welcome discount code. Subscribing an
//! address that is already on the list succeeds the same way, so the form
//! never reveals whether an email is known.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use aviator_core::{Email, NewEmailSubscription};

use crate::db::RepositoryError;
use crate::error::{AppError, FieldViolation, Result, ValidationFailure};
use crate::state::AppState;
use crate::validation::{RequestSchema, ValidatedJson};

/// Body of `POST /api/subscribe`.
#[derive(Debug, Deserialize, Validate)]
pub struct SubscribeRequest {
    #[validate(required, email)]
    pub email: Option<String>,
    /// Where the sign-up came from, e.g. `footer` or `exit-popup`.
    #[validate(required, length(min = 1))]
    pub source: Option<String>,
}

impl RequestSchema for SubscribeRequest {
    const INVALID_MESSAGE: &'static str = "Invalid email";
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub message: &'static str,
    pub discount_code: String,
}

/// Subscribe an email to the newsletter.
#[instrument(skip(state, body), fields(source = ?body.source))]
pub async fn subscribe(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<SubscribeRequest>,
) -> Result<(StatusCode, Json<SubscribeResponse>)> {
    let raw = body.email.unwrap_or_default();
    let email = Email::parse(&raw).map_err(|e| {
        AppError::Validation(ValidationFailure::new(
            SubscribeRequest::INVALID_MESSAGE,
            vec![FieldViolation::new("email", "email", e.to_string())],
        ))
    })?;
    let source = body.source.unwrap_or_default();

    let store = state.store();
    if store.get_email_subscription(&email).await?.is_some() {
        tracing::info!(email = %email, "Email already subscribed - treating as success");
    } else {
        match store
            .create_email_subscription(NewEmailSubscription {
                email: email.clone(),
                source,
                is_active: true,
            })
            .await
        {
            Ok(_) => tracing::info!(email = %email, "Newsletter subscription successful"),
            // Lost a race with a concurrent sign-up for the same address
            Err(RepositoryError::Conflict(_)) => {
                tracing::info!(email = %email, "Email already subscribed - treating as success");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(SubscribeResponse {
            message: "Successfully subscribed",
            discount_code: state.config().discount_code.clone(),
        }),
    ))
}
