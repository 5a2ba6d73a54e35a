use uuid::Uuid;

use compass_core::models::assessment_type::AssessmentType;
use compass_core::models::result::AssessmentResult;
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::state::{load_all, load_optional, save_state};
use crate::store::ObjectStore;

/// Write a result. The key is derived from (user, type), so this replaces
/// any earlier result of the same type.
pub async fn upsert_result(
    store: &dyn ObjectStore,
    result: &AssessmentResult,
) -> Result<(), StorageError> {
    save_state(
        store,
        &s3_keys::result(result.user_id, result.assessment_type),
        result,
    )
    .await
}

pub async fn get_result(
    store: &dyn ObjectStore,
    user_id: Uuid,
    assessment_type: AssessmentType,
) -> Result<Option<AssessmentResult>, StorageError> {
    load_optional(store, &s3_keys::result(user_id, assessment_type)).await
}

pub async fn list_results(
    store: &dyn ObjectStore,
    user_id: Uuid,
) -> Result<Vec<AssessmentResult>, StorageError> {
    load_all(store, &s3_keys::results_prefix(user_id)).await
}

/// Returns whether a result existed.
pub async fn delete_result(
    store: &dyn ObjectStore,
    user_id: Uuid,
    assessment_type: AssessmentType,
) -> Result<bool, StorageError> {
    let key = s3_keys::result(user_id, assessment_type);
    let existed = store.list(&key).await?.iter().any(|k| *k == key);
    store.delete(&key).await?;
    Ok(existed)
}
