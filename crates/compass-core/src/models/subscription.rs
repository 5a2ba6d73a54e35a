use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Subscription {
    pub user_id: Uuid,
    pub stripe_customer_id: Option<String>,
    pub stripe_subscription_id: Option<String>,
    pub plan: Option<String>,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<jiff::Timestamp>,
    pub updated_at: jiff::Timestamp,
}

impl Subscription {
    /// A user with no billing history yet.
    pub fn none(user_id: Uuid) -> Self {
        Self {
            user_id,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            plan: None,
            status: SubscriptionStatus::None,
            current_period_end: None,
            updated_at: jiff::Timestamp::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SubscriptionStatus {
    None,
    Incomplete,
    Trialing,
    Active,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }

    /// Map a Stripe subscription status string. Statuses Stripe may add
    /// later fall back to `Incomplete`.
    pub fn from_stripe(status: &str) -> Self {
        match status {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "past_due" | "unpaid" => SubscriptionStatus::PastDue,
            "canceled" | "incomplete_expired" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Incomplete,
        }
    }
}

/// Index entry mapping a Stripe customer to the owning user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerIndex {
    pub user_id: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stripe_status_mapping() {
        assert!(SubscriptionStatus::from_stripe("active").is_active());
        assert!(SubscriptionStatus::from_stripe("trialing").is_active());
        assert_eq!(
            SubscriptionStatus::from_stripe("unpaid"),
            SubscriptionStatus::PastDue
        );
        assert!(!SubscriptionStatus::from_stripe("canceled").is_active());
        assert_eq!(
            SubscriptionStatus::from_stripe("paused"),
            SubscriptionStatus::Incomplete
        );
    }
}
