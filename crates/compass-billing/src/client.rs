use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::BillingError;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Stripe settings read from the environment.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// Default price for checkout when the request names none.
    pub price_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PortalSession {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Minimal Stripe REST client (form-encoded requests, JSON responses).
#[derive(Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, BillingError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            secret_key: secret_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        })
    }

    /// Point the client at another API host (stripe-mock, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
        user_id: Uuid,
    ) -> Result<String, BillingError> {
        let user_id = user_id.to_string();
        let customer: Customer = self
            .post(
                "customers",
                &[
                    ("email", email),
                    ("name", name),
                    ("metadata[user_id]", &user_id),
                ],
            )
            .await?;
        info!(user_id, customer_id = %customer.id, "created stripe customer");
        Ok(customer.id)
    }

    pub async fn create_checkout_session(
        &self,
        customer_id: &str,
        price_id: &str,
        user_id: Uuid,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<CheckoutSession, BillingError> {
        let user_id = user_id.to_string();
        let session: CheckoutSession = self
            .post(
                "checkout/sessions",
                &[
                    ("mode", "subscription"),
                    ("customer", customer_id),
                    ("client_reference_id", &user_id),
                    ("metadata[user_id]", &user_id),
                    ("line_items[0][price]", price_id),
                    ("line_items[0][quantity]", "1"),
                    ("success_url", success_url),
                    ("cancel_url", cancel_url),
                ],
            )
            .await?;
        info!(user_id, session_id = %session.id, "created checkout session");
        Ok(session)
    }

    /// Returns the portal URL.
    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<String, BillingError> {
        let session: PortalSession = self
            .post(
                "billing_portal/sessions",
                &[("customer", customer_id), ("return_url", return_url)],
            )
            .await?;
        Ok(session.url)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T, BillingError> {
        let resp = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(form)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp
                .json::<ErrorEnvelope>()
                .await
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| status.to_string());
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}
