//! JSON request bodies checked against a schema before they reach a handler.
//!
//! Request types derive [`validator::Validate`] and implement
//! [`RequestSchema`]. The [`ValidatedJson`] extractor deserializes the body,
//! runs the validation rules and turns every failure into an
//! [`AppError::Validation`] listing each offending field.
//!
//! Required fields are modelled as `Option` with `#[validate(required)]` so
//! that a missing field is reported against its own name instead of failing
//! deserialization for the whole body.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, FieldViolation, ValidationFailure};

/// Upper bound for any price or amount in a request body. Matches
/// `aviator_core::Price::MAX` and the `NUMERIC(10, 2)` money columns.
pub const MAX_PRICE: f64 = 99_999_999.99;

/// A request body with validation rules.
pub trait RequestSchema: DeserializeOwned + Validate {
    /// Top-level message returned alongside the field errors.
    const INVALID_MESSAGE: &'static str;
}

/// Extractor for a JSON body that passed [`Validate`].
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: RequestSchema,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| body_rejected::<T>(&rejection))?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(failure::<T>(&errors)))?;

        Ok(Self(value))
    }
}

fn body_rejected<T: RequestSchema>(rejection: &JsonRejection) -> AppError {
    AppError::Validation(ValidationFailure::new(
        T::INVALID_MESSAGE,
        vec![FieldViolation::new("body", "invalid_json", rejection.body_text())],
    ))
}

fn failure<T: RequestSchema>(errors: &ValidationErrors) -> ValidationFailure {
    ValidationFailure::new(T::INVALID_MESSAGE, flatten_errors(errors))
}

/// Flatten nested validation errors into one violation per rule, sorted by
/// field path.
#[must_use]
pub fn flatten_errors(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<FieldViolation>) {
    for (name, kind) in errors.errors() {
        let path = join_path(prefix, &camel_case(name));
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| default_message(&error.code), |m| m.to_string());
                    FieldViolation::new(path.clone(), error.code.to_string(), message)
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// `zip_code` -> `zipCode`, matching the JSON field names clients send.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn default_message(code: &str) -> String {
    match code {
        "required" => "is required".to_string(),
        "email" => "must be a valid email address".to_string(),
        "length" => "has an invalid length".to_string(),
        "range" => "is out of range".to_string(),
        other => format!("failed `{other}` check"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{self, StatusCode},
        routing::post,
    };
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Line {
        #[validate(required, range(min = 1))]
        quantity: Option<i64>,
    }

    #[derive(Debug, Deserialize, Validate)]
    #[serde(rename_all = "camelCase")]
    struct Payload {
        #[validate(required, email)]
        contact_email: Option<String>,
        #[validate(nested)]
        #[serde(default)]
        lines: Vec<Line>,
    }

    impl RequestSchema for Payload {
        const INVALID_MESSAGE: &'static str = "Invalid payload";
    }

    async fn handler(ValidatedJson(payload): ValidatedJson<Payload>) -> String {
        payload.contact_email.unwrap_or_default()
    }

    async fn send(body: &str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/", post(handler));
        let response = app
            .oneshot(
                http::Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("zip_code"), "zipCode");
        assert_eq!(camel_case("email"), "email");
        assert_eq!(camel_case("first_name"), "firstName");
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let (status, _) = send(r#"{"contactEmail":"crew@aviator.store","lines":[{"quantity":2}]}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_fields_are_itemized() {
        let (status, body) = send(r#"{"lines":[{"quantity":1},{"quantity":0}]}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid payload");
        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, ["contactEmail", "lines[1].quantity"]);
        assert_eq!(body["errors"][0]["code"], "required");
    }

    #[tokio::test]
    async fn test_bad_email_reported_on_field() {
        let (status, body) = send(r#"{"contactEmail":"not-an-email"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "contactEmail");
        assert_eq!(body["errors"][0]["code"], "email");
    }

    #[tokio::test]
    async fn test_malformed_json_is_a_body_violation() {
        let (status, body) = send("{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "body");
        assert_eq!(body["errors"][0]["code"], "invalid_json");
    }
}
