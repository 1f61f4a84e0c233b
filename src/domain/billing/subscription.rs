//! Subscription entity and its provider-driven status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{CustomerId, PriceId, SubscriptionId, Timestamp};

/// Lifecycle status exactly as reported by the provider.
///
/// Free text on purpose: the provider owns the vocabulary (`incomplete`,
/// `active`, `past_due`, ...) and new values must be stored without a code
/// change. The empty string means the provider has not reported one yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionStatus(String);

impl SubscriptionStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True until the provider reports a status.
    pub fn is_unreported(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SubscriptionStatus {
    fn from(status: String) -> Self {
        Self(status)
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(status: &str) -> Self {
        Self(status.to_string())
    }
}

/// A provider subscription recorded locally.
///
/// # Invariants
///
/// - Always references exactly one existing [`Customer`](super::Customer).
/// - `status` (and with it `updated_at`) is the only state that changes after
///   creation, and only through [`Subscription::apply_status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub customer_id: CustomerId,
    pub price_id: PriceId,
    pub status: SubscriptionStatus,
    pub purchase_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Subscription {
    /// Record a subscription the provider has just created.
    pub fn record(
        id: SubscriptionId,
        customer_id: CustomerId,
        price_id: PriceId,
        status: SubscriptionStatus,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            customer_id,
            price_id,
            status,
            purchase_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the status with the latest value reported by the provider.
    ///
    /// Pure overwrite, so replaying the same event is harmless.
    pub fn apply_status(&mut self, status: SubscriptionStatus, at: Timestamp) {
        self.status = status;
        self.updated_at = at;
    }
}
