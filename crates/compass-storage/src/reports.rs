use uuid::Uuid;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::store::ObjectStore;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Keep the most recent PDF export.
pub async fn save_pdf(
    store: &dyn ObjectStore,
    user_id: Uuid,
    assessment_type: AssessmentType,
    bytes: Vec<u8>,
) -> Result<String, StorageError> {
    let key = s3_keys::report_pdf(user_id, assessment_type);
    store.put(&key, bytes, PDF_CONTENT_TYPE).await?;
    Ok(key)
}

/// Keep the most recent DOCX export.
pub async fn save_docx(
    store: &dyn ObjectStore,
    user_id: Uuid,
    assessment_type: AssessmentType,
    bytes: Vec<u8>,
) -> Result<String, StorageError> {
    let key = s3_keys::report_docx(user_id, assessment_type);
    store.put(&key, bytes, DOCX_CONTENT_TYPE).await?;
    Ok(key)
}
