use uuid::Uuid;

use compass_core::models::user::{EmailIndex, User};
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::state::{create_state, load_all, load_optional, load_state, save_state};
use crate::store::ObjectStore;
use crate::{evaluators, subscriptions};

/// Store a new user. The email index is claimed first so two registrations
/// for the same address cannot both succeed; it is released again if the
/// user record cannot be written.
pub async fn create_user(store: &dyn ObjectStore, user: &User) -> Result<(), StorageError> {
    claim_email(store, &user.email, user.id).await?;
    if let Err(e) = save_state(store, &s3_keys::user(user.id), user).await {
        if let Err(release) = store.delete(&s3_keys::user_email(&user.email)).await {
            tracing::error!(user_id = %user.id, error = %release, "could not release email index");
        }
        return Err(e);
    }
    Ok(())
}

pub async fn get_user(store: &dyn ObjectStore, id: Uuid) -> Result<User, StorageError> {
    load_state(store, &s3_keys::user(id)).await
}

pub async fn find_by_email(
    store: &dyn ObjectStore,
    email: &str,
) -> Result<Option<User>, StorageError> {
    let Some(index) = load_optional::<EmailIndex>(store, &s3_keys::user_email(email)).await? else {
        return Ok(None);
    };
    load_optional(store, &s3_keys::user(index.user_id)).await
}

/// All users, oldest first.
pub async fn list_users(store: &dyn ObjectStore) -> Result<Vec<User>, StorageError> {
    let mut users: Vec<User> = load_all(store, s3_keys::USERS_PREFIX).await?;
    users.sort_by_key(|u| u.created_at);
    Ok(users)
}

/// Persist changes to an existing user. When the email changed, the new
/// address is claimed before the old index entry is released.
pub async fn update_user(store: &dyn ObjectStore, user: &User) -> Result<(), StorageError> {
    let previous = get_user(store, user.id).await?;
    let email_changed =
        s3_keys::normalize_email(&previous.email) != s3_keys::normalize_email(&user.email);
    if email_changed {
        claim_email(store, &user.email, user.id).await?;
    }
    save_state(store, &s3_keys::user(user.id), user).await?;
    if email_changed {
        store.delete(&s3_keys::user_email(&previous.email)).await?;
    }
    Ok(())
}

/// Delete a user and everything they own: results, evaluators (with their
/// token index entries), exported reports, subscription and email index.
pub async fn delete_user(store: &dyn ObjectStore, user: &User) -> Result<(), StorageError> {
    for evaluator in evaluators::list_evaluators(store, user.id).await? {
        evaluators::delete_evaluator(store, &evaluator).await?;
    }
    let results = store.delete_prefix(&s3_keys::results_prefix(user.id)).await?;
    let reports = store.delete_prefix(&s3_keys::reports_prefix(user.id)).await?;
    subscriptions::delete_subscription(store, user.id).await?;
    store.delete(&s3_keys::user_email(&user.email)).await?;
    store.delete(&s3_keys::user(user.id)).await?;

    tracing::info!(user_id = %user.id, results, reports, "deleted user and owned records");
    Ok(())
}

async fn claim_email(store: &dyn ObjectStore, email: &str, user_id: Uuid) -> Result<(), StorageError> {
    create_state(store, &s3_keys::user_email(email), &EmailIndex { user_id })
        .await
        .map_err(|e| match e {
            StorageError::PreconditionFailed { .. } => StorageError::EmailTaken {
                email: s3_keys::normalize_email(email),
            },
            other => other,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use async_trait::async_trait;
    use compass_core::models::user::Role;

    /// Accepts create-only writes but fails every plain put.
    #[derive(Default)]
    struct PutFails(MemoryStore);

    #[async_trait]
    impl ObjectStore for PutFails {
        fn backend_tag(&self) -> &'static str {
            "put-fails"
        }

        async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.0.get(key).await
        }

        async fn put(&self, key: &str, _body: Vec<u8>, _ct: &str) -> Result<(), StorageError> {
            Err(StorageError::PutObject(format!("{key}: unavailable")))
        }

        async fn put_if_absent(&self, key: &str, body: Vec<u8>, ct: &str) -> Result<(), StorageError> {
            self.0.put_if_absent(key, body, ct).await
        }

        async fn delete(&self, key: &str) -> Result<(), StorageError> {
            self.0.delete(key).await
        }

        async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
            self.0.list(prefix).await
        }
    }

    fn user(email: &str) -> User {
        let now = jiff::Timestamp::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Ada".to_string(),
            role: Role::User,
            password_hash: "x".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let store = MemoryStore::new();
        create_user(&store, &user("ada@example.com")).await.unwrap();
        let err = create_user(&store, &user("ADA@example.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::EmailTaken { .. }));
        assert_eq!(list_users(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_user_write_releases_the_email() {
        let store = PutFails::default();
        let err = create_user(&store, &user("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StorageError::PutObject(_)));
        assert!(store.0.is_empty().await);
        assert!(!store.0.contains(&s3_keys::user_email("ada@example.com")).await);
    }

    #[tokio::test]
    async fn email_change_moves_the_index() {
        let store = MemoryStore::new();
        let mut ada = user("ada@example.com");
        create_user(&store, &ada).await.unwrap();
        ada.email = "lovelace@example.com".to_string();
        update_user(&store, &ada).await.unwrap();

        assert!(find_by_email(&store, "ada@example.com").await.unwrap().is_none());
        let found = find_by_email(&store, "Lovelace@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, ada.id);
    }

    #[tokio::test]
    async fn delete_cascades_to_owned_records() {
        let store = MemoryStore::new();
        let ada = user("ada@example.com");
        create_user(&store, &ada).await.unwrap();
        store
            .put(&s3_keys::results_prefix(ada.id), b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        delete_user(&store, &ada).await.unwrap();
        assert!(store.is_empty().await);
    }
}
