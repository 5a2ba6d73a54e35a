use axum::Json;
use axum::extract::State;
use serde::Serialize;
use uuid::Uuid;

use compass_core::models::assessment_type::AssessmentType;
use compass_instruments::instrument_for;
use compass_instruments::scoring::{CategoryComparison, compare_three_sixty, parse_likert_answers};
use compass_storage::{evaluators, results};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::assessments::active_questions;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ComparisonRow {
    pub name: String,
    #[serde(flatten)]
    pub comparison: CategoryComparison,
}

#[derive(Serialize)]
pub struct ComparisonResponse {
    pub completed_evaluators: usize,
    pub categories: Vec<ComparisonRow>,
}

/// Self ratings against completed evaluator ratings, per category.
pub(crate) async fn comparison_for(
    state: &AppState,
    user_id: Uuid,
) -> Result<(usize, Vec<CategoryComparison>), ApiError> {
    let questions = active_questions(state.store(), AssessmentType::ThreeSixty).await?;
    let self_answers = results::get_result(state.store(), user_id, AssessmentType::ThreeSixty)
        .await?
        .and_then(|r| parse_likert_answers(&r.answers).ok());
    let others: Vec<_> = evaluators::list_evaluators(state.store(), user_id)
        .await?
        .into_iter()
        .filter(|e| e.is_completed())
        .filter_map(|e| e.answers)
        .collect();

    let comparison = compare_three_sixty(&questions, self_answers.as_ref(), &others);
    Ok((others.len(), comparison))
}

pub async fn get_comparison(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ComparisonResponse>, ApiError> {
    let (completed_evaluators, comparison) = comparison_for(&state, auth.id).await?;
    let instrument = instrument_for(AssessmentType::ThreeSixty);
    let categories = comparison
        .into_iter()
        .map(|c| ComparisonRow {
            name: instrument
                .categories()
                .iter()
                .find(|cat| cat.id == c.category)
                .map(|cat| cat.name.clone())
                .unwrap_or_else(|| c.category.clone()),
            comparison: c,
        })
        .collect();
    Ok(Json(ComparisonResponse {
        completed_evaluators,
        categories,
    }))
}
