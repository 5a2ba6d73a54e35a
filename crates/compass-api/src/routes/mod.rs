pub mod admin_questions;
pub mod admin_users;
pub mod assessments;
pub mod auth;
pub mod billing;
pub mod evaluations;
pub mod evaluators;
pub mod health;
pub mod instruments;
pub mod mbti;
pub mod me;
pub mod reports;
pub mod results;
pub mod three_sixty;

use compass_core::models::assessment_type::AssessmentType;

use crate::error::ApiError;

/// Parse an `{type}` path segment.
pub(crate) fn parse_type(segment: &str) -> Result<AssessmentType, ApiError> {
    segment
        .parse()
        .map_err(|_| ApiError::NotFound(format!("unknown assessment type: {segment}")))
}

/// Minimal shape check; delivery is the real test.
pub(crate) fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(ApiError::BadRequest(format!("invalid email address: {email}"))),
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{field} must not be empty")));
    }
    Ok(())
}
