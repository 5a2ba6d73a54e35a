//! Stripe webhook verification and event parsing.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use compass_core::models::subscription::SubscriptionStatus;

use crate::error::BillingError;

/// Maximum age of a signed webhook, in seconds.
pub const TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`)
/// against the raw request body.
pub fn verify_signature(
    payload: &[u8],
    header: &str,
    secret: &str,
    now: i64,
) -> Result<(), BillingError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }
    let timestamp = timestamp.ok_or(BillingError::MalformedSignature)?;
    if signatures.is_empty() {
        return Err(BillingError::MalformedSignature);
    }
    if (now - timestamp).abs() > TOLERANCE_SECS {
        return Err(BillingError::StaleTimestamp);
    }

    let expected = sign(payload, timestamp, secret)?;
    let matched = signatures
        .iter()
        .any(|candidate| bool::from(candidate.as_bytes().ct_eq(expected.as_bytes())));
    if matched {
        Ok(())
    } else {
        Err(BillingError::InvalidSignature)
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`.
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> Result<String, BillingError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::InvalidSignature)?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// The webhook events Compass acts on.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    CheckoutCompleted {
        customer_id: String,
        subscription_id: Option<String>,
        user_id: Option<Uuid>,
    },
    SubscriptionChanged(SubscriptionUpdate),
    Ignored {
        event_type: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdate {
    pub subscription_id: String,
    pub customer_id: String,
    pub status: SubscriptionStatus,
    pub price_id: Option<String>,
    pub current_period_end: Option<jiff::Timestamp>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    event_type: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: serde_json::Value,
}

#[derive(Deserialize)]
struct CheckoutObject {
    customer: Option<String>,
    subscription: Option<String>,
    client_reference_id: Option<String>,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

#[derive(Deserialize)]
struct SubscriptionObject {
    id: String,
    customer: String,
    status: String,
    current_period_end: Option<i64>,
    items: Option<Items>,
}

#[derive(Deserialize)]
struct Items {
    data: Vec<Item>,
}

#[derive(Deserialize)]
struct Item {
    price: Price,
    current_period_end: Option<i64>,
}

#[derive(Deserialize)]
struct Price {
    id: String,
}

/// Parse a verified webhook body.
pub fn parse_event(payload: &[u8]) -> Result<WebhookEvent, BillingError> {
    let envelope: Envelope =
        serde_json::from_slice(payload).map_err(|e| BillingError::MalformedEvent(e.to_string()))?;

    match envelope.event_type.as_str() {
        "checkout.session.completed" => {
            let object: CheckoutObject = from_object(envelope.data.object)?;
            let customer_id = object
                .customer
                .ok_or_else(|| BillingError::MalformedEvent("checkout without customer".into()))?;
            let user_id = object
                .client_reference_id
                .or_else(|| object.metadata.get("user_id").cloned())
                .and_then(|id| id.parse().ok());
            Ok(WebhookEvent::CheckoutCompleted {
                customer_id,
                subscription_id: object.subscription,
                user_id,
            })
        }
        "customer.subscription.created"
        | "customer.subscription.updated"
        | "customer.subscription.deleted" => {
            let object: SubscriptionObject = from_object(envelope.data.object)?;
            let first_item = object.items.and_then(|items| items.data.into_iter().next());
            // Newer API versions carry the period on the item.
            let period_end = object
                .current_period_end
                .or_else(|| first_item.as_ref().and_then(|i| i.current_period_end));
            let status = if envelope.event_type == "customer.subscription.deleted" {
                SubscriptionStatus::Canceled
            } else {
                SubscriptionStatus::from_stripe(&object.status)
            };
            Ok(WebhookEvent::SubscriptionChanged(SubscriptionUpdate {
                subscription_id: object.id,
                customer_id: object.customer,
                status,
                price_id: first_item.map(|i| i.price.id),
                current_period_end: period_end
                    .and_then(|secs| jiff::Timestamp::from_second(secs).ok()),
            }))
        }
        other => Ok(WebhookEvent::Ignored {
            event_type: other.to_string(),
        }),
    }
}

fn from_object<T: serde::de::DeserializeOwned>(object: serde_json::Value) -> Result<T, BillingError> {
    serde_json::from_value(object).map_err(|e| BillingError::MalformedEvent(e.to_string()))
}
