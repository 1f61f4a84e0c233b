//! Strongly-typed identifier value objects.
//!
//! Every identifier here is issued by the payment provider. They are plain
//! strings on the wire and in the database; the newtypes only guarantee they
//! are non-empty and keep them from being mixed up.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

macro_rules! provider_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Wraps a provider-issued identifier, rejecting empty values.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(id))
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(id: String) -> Result<Self, Self::Error> {
                Self::new(id)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

provider_id!(
    /// Provider identifier of a card payment method (`pm_...`).
    PaymentMethodId,
    "payment_method_id"
);

provider_id!(
    /// Provider identifier of a customer (`cus_...`).
    CustomerId,
    "customer_id"
);

provider_id!(
    /// Provider identifier of a subscription (`sub_...`).
    SubscriptionId,
    "subscription_id"
);

provider_id!(
    /// Provider identifier of a recurring price (`price_...`).
    PriceId,
    "price_id"
);
