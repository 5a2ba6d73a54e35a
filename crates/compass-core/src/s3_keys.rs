//! S3 key/path conventions.
//!
//! Pure string functions with no AWS SDK dependency. These define the canonical
//! layout of objects in the Compass S3 bucket.

use uuid::Uuid;

use crate::models::assessment_type::AssessmentType;

pub const USERS_PREFIX: &str = "users/";

pub fn user(id: Uuid) -> String {
    format!("users/{id}.json")
}

/// Email uniqueness index. Emails are compared case-insensitively.
pub fn user_email(email: &str) -> String {
    format!("user_emails/{}.json", normalize_email(email))
}

pub fn subscription(user_id: Uuid) -> String {
    format!("subscriptions/{user_id}.json")
}

pub fn stripe_customer(customer_id: &str) -> String {
    format!("stripe_customers/{customer_id}.json")
}

pub fn questions_prefix(assessment_type: AssessmentType) -> String {
    format!("questions/{}/", assessment_type.as_str())
}

pub fn question(assessment_type: AssessmentType, id: Uuid) -> String {
    format!("questions/{}/{id}.json", assessment_type.as_str())
}

/// One result per (user, assessment type). Writing the same key again
/// replaces the previous result.
pub fn result(user_id: Uuid, assessment_type: AssessmentType) -> String {
    format!("results/{user_id}/{}.json", assessment_type.as_str())
}

pub fn results_prefix(user_id: Uuid) -> String {
    format!("results/{user_id}/")
}

pub fn evaluator(user_id: Uuid, id: Uuid) -> String {
    format!("evaluators/{user_id}/{id}.json")
}

pub fn evaluators_prefix(user_id: Uuid) -> String {
    format!("evaluators/{user_id}/")
}

pub fn evaluator_token(token: &str) -> String {
    format!("evaluator_tokens/{token}.json")
}

pub fn report_pdf(user_id: Uuid, assessment_type: AssessmentType) -> String {
    format!("reports/{user_id}/{}.pdf", assessment_type.as_str())
}

pub fn report_docx(user_id: Uuid, assessment_type: AssessmentType) -> String {
    format!("reports/{user_id}/{}.docx", assessment_type.as_str())
}

pub fn reports_prefix(user_id: Uuid) -> String {
    format!("reports/{user_id}/")
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
