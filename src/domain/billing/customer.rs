//! Customer entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CustomerId, PaymentMethodId, Timestamp};

/// A provider customer recorded locally.
///
/// Always references exactly one existing [`PaymentMethod`](super::PaymentMethod).
/// Changing the default payment method at the provider is not mirrored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub payment_method_id: PaymentMethodId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Customer {
    /// Record a customer the provider has just created.
    pub fn record(
        id: CustomerId,
        payment_method_id: PaymentMethodId,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            payment_method_id,
            name: name.into(),
            email: email.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Description sent to the provider when the customer is created.
    pub fn provider_description(name: &str) -> String {
        format!("Description: {}", name)
    }
}
