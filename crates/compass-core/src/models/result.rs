use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::assessment_type::AssessmentType;

/// The scored outcome of one assessment for one user.
///
/// Stored under a key derived from `(user_id, assessment_type)`, so a user
/// has at most one result per assessment; resubmitting replaces it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssessmentResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assessment_type: AssessmentType,
    pub answers: serde_json::Value,
    pub scores: BTreeMap<String, f64>,
    pub overall_score: Option<f64>,
    pub dominant_result: String,
    pub completed_at: jiff::Timestamp,
}
