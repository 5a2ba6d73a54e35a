use serde::{de::DeserializeOwned, Serialize};

use crate::error::StorageError;
use crate::store::ObjectStore;

const JSON: &str = "application/json";

/// Load a JSON document.
pub async fn load_state<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<T, StorageError> {
    let body = store.get(key).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Load a JSON document, mapping a missing key to `None`.
pub async fn load_optional<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match load_state(store, key).await {
        Ok(value) => Ok(Some(value)),
        Err(StorageError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Load every JSON document under a prefix, in key order.
pub async fn load_all<T: DeserializeOwned>(
    store: &dyn ObjectStore,
    prefix: &str,
) -> Result<Vec<T>, StorageError> {
    let keys = store.list(prefix).await?;
    let mut values = Vec::with_capacity(keys.len());
    for key in &keys {
        // Listed keys can vanish under a concurrent delete.
        if let Some(value) = load_optional(store, key).await? {
            values.push(value);
        }
    }
    Ok(values)
}

/// Save a JSON document, replacing whatever is at the key.
pub async fn save_state<T: Serialize>(
    store: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put(key, body, JSON).await
}

/// Save a JSON document only if the key is free.
pub async fn create_state<T: Serialize>(
    store: &dyn ObjectStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)?;
    store.put_if_absent(key, body, JSON).await
}
