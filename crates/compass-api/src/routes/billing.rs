use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use compass_audit::{AuditAction, AuditEvent};
use compass_billing::error::BillingError;
use compass_billing::sync::apply_event;
use compass_billing::webhook::{parse_event, verify_signature};
use compass_storage::{subscriptions, users};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::{AppState, Billing};

#[derive(Deserialize, Default)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub price_id: Option<String>,
}

#[derive(Serialize)]
pub struct RedirectResponse {
    pub url: String,
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

fn billing(state: &AppState) -> Result<&Billing, ApiError> {
    state
        .billing
        .as_deref()
        .ok_or_else(|| BillingError::NotConfigured.into())
}

/// Start a Stripe Checkout session, creating the customer on first use.
pub async fn create_checkout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<Json<RedirectResponse>, ApiError> {
    let billing = billing(&state)?;
    let price_id = body
        .price_id
        .or_else(|| billing.config.price_id.clone())
        .ok_or_else(|| ApiError::BadRequest("price_id is required".to_string()))?;

    let mut subscription = subscriptions::get_subscription(state.store(), auth.id).await?;
    let customer_id = match subscription.stripe_customer_id.clone() {
        Some(id) => id,
        None => {
            let user = users::get_user(state.store(), auth.id).await?;
            let id = billing
                .client
                .create_customer(&user.email, &user.name, user.id)
                .await?;
            subscription.stripe_customer_id = Some(id.clone());
            subscription.updated_at = jiff::Timestamp::now();
            subscriptions::save_subscription(state.store(), &subscription).await?;
            id
        }
    };

    let public_url = &state.config.public_url;
    let session = billing
        .client
        .create_checkout_session(
            &customer_id,
            &price_id,
            auth.id,
            &format!("{public_url}/billing/success"),
            &format!("{public_url}/billing/cancel"),
        )
        .await?;
    let url = session
        .url
        .ok_or_else(|| ApiError::Internal(format!("checkout session {} has no url", session.id)))?;
    Ok(Json(RedirectResponse { url }))
}

pub async fn create_portal(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RedirectResponse>, ApiError> {
    let billing = billing(&state)?;
    let subscription = subscriptions::get_subscription(state.store(), auth.id).await?;
    let customer_id = subscription
        .stripe_customer_id
        .ok_or_else(|| ApiError::BadRequest("no billing account yet".to_string()))?;
    let url = billing
        .client
        .create_portal_session(&customer_id, &format!("{}/account", state.config.public_url))
        .await?;
    Ok(Json(RedirectResponse { url }))
}

/// Stripe webhook. The signature is checked against the raw body before
/// anything is parsed.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let billing = billing(&state)?;
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(BillingError::MalformedSignature)?;

    let now = jiff::Timestamp::now();
    verify_signature(&body, signature, &billing.config.webhook_secret, now.as_second())?;
    let event = parse_event(&body)?;

    if let Some(subscription) = apply_event(state.store(), &event, now).await? {
        AuditEvent::new(
            AuditAction::SubscriptionChanged,
            "subscription",
            subscription.user_id.to_string(),
            None,
        )
        .with_details(serde_json::json!({ "status": subscription.status }))
        .emit();
    }
    Ok(Json(WebhookAck { received: true }))
}
