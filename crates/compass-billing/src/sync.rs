use compass_core::models::subscription::{Subscription, SubscriptionStatus};
use compass_storage::store::ObjectStore;
use compass_storage::subscriptions;

use crate::error::BillingError;
use crate::webhook::WebhookEvent;

/// Apply a webhook event to stored subscription state. Returns the updated
/// subscription, or `None` when the event was ignored or names a customer
/// we do not know.
pub async fn apply_event(
    store: &dyn ObjectStore,
    event: &WebhookEvent,
    now: jiff::Timestamp,
) -> Result<Option<Subscription>, BillingError> {
    match event {
        WebhookEvent::CheckoutCompleted {
            customer_id,
            subscription_id,
            user_id,
        } => {
            let existing = match user_id {
                Some(id) => Some(subscriptions::get_subscription(store, *id).await?),
                None => subscriptions::find_by_customer(store, customer_id).await?,
            };
            let Some(mut subscription) = existing else {
                tracing::warn!(customer_id, "checkout for unknown customer");
                return Ok(None);
            };
            subscription.stripe_customer_id = Some(customer_id.clone());
            if subscription_id.is_some() {
                subscription.stripe_subscription_id = subscription_id.clone();
            }
            // The subscription events that follow carry the authoritative status.
            if matches!(
                subscription.status,
                SubscriptionStatus::None | SubscriptionStatus::Incomplete
            ) {
                subscription.status = SubscriptionStatus::Active;
            }
            subscription.updated_at = now;
            subscriptions::save_subscription(store, &subscription).await?;
            tracing::info!(user_id = %subscription.user_id, "checkout completed");
            Ok(Some(subscription))
        }
        WebhookEvent::SubscriptionChanged(update) => {
            let Some(mut subscription) =
                subscriptions::find_by_customer(store, &update.customer_id).await?
            else {
                tracing::warn!(customer_id = %update.customer_id, "subscription event for unknown customer");
                return Ok(None);
            };
            subscription.stripe_subscription_id = Some(update.subscription_id.clone());
            subscription.status = update.status;
            if update.price_id.is_some() {
                subscription.plan = update.price_id.clone();
            }
            subscription.current_period_end = update.current_period_end;
            subscription.updated_at = now;
            subscriptions::save_subscription(store, &subscription).await?;
            tracing::info!(
                user_id = %subscription.user_id,
                status = ?subscription.status,
                "subscription updated"
            );
            Ok(Some(subscription))
        }
        WebhookEvent::Ignored { event_type } => {
            tracing::debug!(event_type, "ignoring webhook event");
            Ok(None)
        }
    }
}
