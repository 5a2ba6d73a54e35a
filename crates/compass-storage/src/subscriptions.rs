use uuid::Uuid;

use compass_core::models::subscription::{CustomerIndex, Subscription};
use compass_core::s3_keys;

use crate::error::StorageError;
use crate::state::{load_optional, save_state};
use crate::store::ObjectStore;

/// The user's subscription, or a `none` record when they never subscribed.
pub async fn get_subscription(
    store: &dyn ObjectStore,
    user_id: Uuid,
) -> Result<Subscription, StorageError> {
    Ok(load_optional(store, &s3_keys::subscription(user_id))
        .await?
        .unwrap_or_else(|| Subscription::none(user_id)))
}

/// Save a subscription and keep the Stripe customer index pointing at it.
pub async fn save_subscription(
    store: &dyn ObjectStore,
    subscription: &Subscription,
) -> Result<(), StorageError> {
    if let Some(customer_id) = &subscription.stripe_customer_id {
        save_state(
            store,
            &s3_keys::stripe_customer(customer_id),
            &CustomerIndex {
                user_id: subscription.user_id,
            },
        )
        .await?;
    }
    save_state(store, &s3_keys::subscription(subscription.user_id), subscription).await
}

pub async fn find_by_customer(
    store: &dyn ObjectStore,
    customer_id: &str,
) -> Result<Option<Subscription>, StorageError> {
    let Some(index) =
        load_optional::<CustomerIndex>(store, &s3_keys::stripe_customer(customer_id)).await?
    else {
        return Ok(None);
    };
    Ok(Some(get_subscription(store, index.user_id).await?))
}

pub async fn delete_subscription(store: &dyn ObjectStore, user_id: Uuid) -> Result<(), StorageError> {
    let existing: Option<Subscription> =
        load_optional(store, &s3_keys::subscription(user_id)).await?;
    if let Some(customer_id) = existing.and_then(|s| s.stripe_customer_id) {
        store.delete(&s3_keys::stripe_customer(&customer_id)).await?;
    }
    store.delete(&s3_keys::subscription(user_id)).await
}
