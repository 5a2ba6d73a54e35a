use uuid::Uuid;

use compass_core::models::evaluator::{Evaluator, EvaluatorTokenIndex};
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::state::{load_all, load_optional, load_state, save_state};
use crate::store::ObjectStore;

/// Save an evaluator together with its token index entry.
pub async fn save_evaluator(store: &dyn ObjectStore, evaluator: &Evaluator) -> Result<(), StorageError> {
    save_state(
        store,
        &s3_keys::evaluator_token(&evaluator.token),
        &EvaluatorTokenIndex {
            user_id: evaluator.user_id,
            evaluator_id: evaluator.id,
        },
    )
    .await?;
    save_state(store, &s3_keys::evaluator(evaluator.user_id, evaluator.id), evaluator).await
}

pub async fn get_evaluator(
    store: &dyn ObjectStore,
    user_id: Uuid,
    id: Uuid,
) -> Result<Evaluator, StorageError> {
    load_state(store, &s3_keys::evaluator(user_id, id)).await
}

/// Resolve an invitation token to its evaluator.
pub async fn find_by_token(
    store: &dyn ObjectStore,
    token: &str,
) -> Result<Option<Evaluator>, StorageError> {
    let Some(index) =
        load_optional::<EvaluatorTokenIndex>(store, &s3_keys::evaluator_token(token)).await?
    else {
        return Ok(None);
    };
    load_optional(store, &s3_keys::evaluator(index.user_id, index.evaluator_id)).await
}

/// A user's evaluators, oldest first.
pub async fn list_evaluators(
    store: &dyn ObjectStore,
    user_id: Uuid,
) -> Result<Vec<Evaluator>, StorageError> {
    let mut evaluators: Vec<Evaluator> =
        load_all(store, &s3_keys::evaluators_prefix(user_id)).await?;
    evaluators.sort_by_key(|e| e.created_at);
    Ok(evaluators)
}

pub async fn delete_evaluator(store: &dyn ObjectStore, evaluator: &Evaluator) -> Result<(), StorageError> {
    store.delete(&s3_keys::evaluator_token(&evaluator.token)).await?;
    store
        .delete(&s3_keys::evaluator(evaluator.user_id, evaluator.id))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use compass_core::models::evaluator::{EvaluatorStatus, Relationship};

    #[tokio::test]
    async fn token_lookup_follows_saved_state() {
        let store = MemoryStore::new();
        let mut evaluator = Evaluator::new(
            Uuid::new_v4(),
            "Grace".to_string(),
            "grace@example.com".to_string(),
            Relationship::Peer,
        );
        save_evaluator(&store, &evaluator).await.unwrap();

        evaluator
            .advance(EvaluatorStatus::Invited, jiff::Timestamp::now())
            .unwrap();
        save_evaluator(&store, &evaluator).await.unwrap();

        let found = find_by_token(&store, &evaluator.token).await.unwrap().unwrap();
        assert_eq!(found.status, EvaluatorStatus::Invited);

        delete_evaluator(&store, &evaluator).await.unwrap();
        assert!(find_by_token(&store, &evaluator.token).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
