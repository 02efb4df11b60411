use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{DomainError, FieldError};

/// Uniform error body sent for every failed request:
/// `{statusCode, error, message, timestamp, path}`, plus per-field
/// `details` for validation failures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
    pub timestamp: String,
    pub path: String,
}

#[derive(Debug, Clone)]
struct ErrorParts {
    status: StatusCode,
    error: &'static str,
    message: String,
    details: Option<Vec<FieldError>>,
}

/// Boundary error type. Handlers return this; the [`error_envelope`]
/// middleware fills in the request path and timestamp.
#[derive(Debug)]
pub struct ApiError {
    parts: ErrorParts,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            parts: ErrorParts {
                status,
                error,
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn status(&self) -> StatusCode {
        self.parts.status
    }
}

/// The exhaustive mapping from the domain taxonomy to HTTP status codes.
/// No handler carries authorization or status-code logic of its own.
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(fields) => {
                let mut api = Self::new(
                    StatusCode::BAD_REQUEST,
                    "Validation Error",
                    "Input validation failed",
                );
                api.parts.details = Some(fields);
                api
            }
            DomainError::Authentication(message) => {
                Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
            }
            DomainError::NotFound(message) => {
                Self::new(StatusCode::NOT_FOUND, "Not Found", message)
            }
            DomainError::Forbidden(message) => {
                Self::new(StatusCode::FORBIDDEN, "Forbidden", message)
            }
            DomainError::Conflict(message) => {
                Self::new(StatusCode::CONFLICT, "Conflict", message)
            }
            DomainError::Database(source) => {
                tracing::error!("Database error: {source:?}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal server error",
                )
            }
            DomainError::Internal(detail) => {
                tracing::error!("Internal error: {detail}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error",
                    "Internal server error",
                )
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // The envelope proper is rendered by the middleware, which knows the
        // request path; stash the parts in the response extensions.
        let mut response = self.parts.status.into_response();
        response.extensions_mut().insert(self.parts);
        response
    }
}

/// Outermost middleware rendering [`ApiError`] responses into the uniform
/// envelope, stamped with the request path and an RFC 3339 timestamp.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let Some(parts) = response.extensions().get::<ErrorParts>().cloned() else {
        return response;
    };

    let envelope = ErrorEnvelope {
        status_code: parts.status.as_u16(),
        error: parts.error.to_string(),
        message: parts.message,
        details: parts.details,
        timestamp: OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default(),
        path,
    };

    (parts.status, Json(envelope)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_variants_map_exhaustively() {
        let cases = [
            (
                DomainError::validation("name", "required"),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::authentication("nope"),
                StatusCode::UNAUTHORIZED,
            ),
            (DomainError::not_found("gone"), StatusCode::NOT_FOUND),
            (DomainError::forbidden("no"), StatusCode::FORBIDDEN),
            (DomainError::conflict("dup"), StatusCode::CONFLICT),
            (
                DomainError::internal("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn internal_errors_hide_details_from_the_client() {
        let api = ApiError::from(DomainError::internal("connection refused to 10.0.0.3"));
        assert_eq!(api.parts.message, "Internal server error");
    }

    #[test]
    fn envelope_serializes_expected_fields() {
        let envelope = ErrorEnvelope {
            status_code: 404,
            error: "Not Found".to_string(),
            message: "Project not found".to_string(),
            details: None,
            timestamp: "2024-06-12T00:00:00Z".to_string(),
            path: "/projects/7".to_string(),
        };

        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["statusCode"], 404);
        assert_eq!(json["error"], "Not Found");
        assert_eq!(json["message"], "Project not found");
        assert_eq!(json["path"], "/projects/7");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn validation_envelope_carries_field_details() {
        let api = ApiError::from(DomainError::validation("email", "must be a valid address"));
        let details = api.parts.details.unwrap();
        assert_eq!(details.len(), 1);
        assert_eq!(details[0].field, "email");
    }
}
