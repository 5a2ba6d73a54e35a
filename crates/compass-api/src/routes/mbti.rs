use axum::Json;
use axum::extract::{Multipart, State};
use serde::Serialize;

use compass_audit::{AuditAction, AuditEvent};
use compass_core::models::assessment_type::AssessmentType;
use compass_instruments::instrument_for;
use compass_instruments::instruments::mbti::score_type;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::routes::assessments::{notify_completed, store_result};
use crate::state::AppState;

/// Largest accepted report.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub mbti_type: String,
    pub stage: &'static str,
}

/// Accept an MBTI report PDF, run the extraction chain and store the type.
pub async fn upload_report(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("report.pdf").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("could not read upload: {e}")))?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("missing 'file' field".to_string()))?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("uploaded file is empty".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::BadRequest("file exceeds 10 MiB".to_string()));
    }
    if !bytes.starts_with(b"%PDF") {
        return Err(ApiError::BadRequest("file is not a PDF".to_string()));
    }

    tracing::info!(user_id = %auth.id, filename, size = bytes.len(), "mbti upload received");
    let extraction = state.chain.run(bytes.to_vec(), &filename).await?;

    let answers = serde_json::json!({
        "mbti_type": extraction.mbti_type.as_str(),
        "source_file": filename,
        "stage": extraction.stage,
    });
    let scored = score_type(&extraction.mbti_type);
    let result = store_result(&state, auth.id, AssessmentType::Mbti, answers, scored).await?;

    AuditEvent::new(AuditAction::UploadMbti, "result", "mbti", Some(auth.id))
        .with_details(serde_json::json!({
            "mbti_type": extraction.mbti_type.as_str(),
            "stage": extraction.stage,
        }))
        .emit();

    notify_completed(&state, instrument_for(AssessmentType::Mbti).as_ref(), &result).await;

    Ok(Json(UploadResponse {
        mbti_type: extraction.mbti_type.to_string(),
        stage: extraction.stage,
    }))
}
