use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use compass_auth::error::AuthError;
use compass_billing::error::BillingError;
use compass_core::error::CoreError;
use compass_export::error::ExportError;
use compass_instruments::error::InstrumentError;
use compass_mail::MailError;
use compass_mbti::ExtractError;
use compass_storage::error::StorageError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    /// An integration is not configured.
    Unavailable(String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound { .. } => ApiError::NotFound("not found".to_string()),
            StorageError::EmailTaken { .. } => {
                ApiError::Conflict("email is already registered".to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<InstrumentError> for ApiError {
    fn from(e: InstrumentError) -> Self {
        match e {
            InstrumentError::UnknownInstrument(_) => ApiError::NotFound(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::InvalidStatusTransition { .. } => ApiError::Conflict(e.to_string()),
            CoreError::InvalidAssessmentType(_) => ApiError::NotFound(e.to_string()),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                ApiError::Unauthorized(e.to_string())
            }
            AuthError::WeakPassword { .. } => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<BillingError> for ApiError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::NotConfigured => ApiError::Unavailable(e.to_string()),
            BillingError::MalformedSignature
            | BillingError::InvalidSignature
            | BillingError::StaleTimestamp
            | BillingError::MalformedEvent(_) => ApiError::BadRequest(e.to_string()),
            BillingError::Storage(inner) => inner.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::NoTypeFound => ApiError::Unprocessable(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(e: ExportError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_errors_map_to_statuses() {
        let cases: Vec<(ApiError, StatusCode)> = vec![
            (
                StorageError::NotFound { key: "k".into() }.into(),
                StatusCode::NOT_FOUND,
            ),
            (
                StorageError::EmailTaken { email: "a@b.c".into() }.into(),
                StatusCode::CONFLICT,
            ),
            (AuthError::InvalidCredentials.into(), StatusCode::UNAUTHORIZED),
            (AuthError::WeakPassword { min: 8 }.into(), StatusCode::BAD_REQUEST),
            (BillingError::NotConfigured.into(), StatusCode::SERVICE_UNAVAILABLE),
            (BillingError::StaleTimestamp.into(), StatusCode::BAD_REQUEST),
            (ExtractError::NoTypeFound.into(), StatusCode::UNPROCESSABLE_ENTITY),
            (InstrumentError::NoAnswers.into(), StatusCode::BAD_REQUEST),
            (
                CoreError::InvalidStatusTransition {
                    from: "completed".into(),
                    to: "started".into(),
                }
                .into(),
                StatusCode::CONFLICT,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let response = ApiError::Internal("S3 PutObject error: boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
