use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("billing is not configured")]
    NotConfigured,

    #[error("Stripe request failed: {0}")]
    Http(String),

    #[error("Stripe API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("missing or malformed Stripe-Signature header")]
    MalformedSignature,

    #[error("webhook signature does not match")]
    InvalidSignature,

    #[error("webhook timestamp outside tolerance")]
    StaleTimestamp,

    #[error("malformed webhook event: {0}")]
    MalformedEvent(String),

    #[error("storage error: {0}")]
    Storage(#[from] compass_storage::error::StorageError),
}

impl From<reqwest::Error> for BillingError {
    fn from(e: reqwest::Error) -> Self {
        BillingError::Http(e.to_string())
    }
}
