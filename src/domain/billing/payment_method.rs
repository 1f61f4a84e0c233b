//! Card payment method entity.

use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{PaymentMethodId, Timestamp};

/// Raw card details as submitted by the customer.
///
/// Values are kept exactly as entered: no trimming, no Luhn check, no expiry
/// plausibility check. The provider is the only validator. Number and CVC are
/// wrapped in `SecretString` so they never show up in `Debug` output or logs.
#[derive(Clone)]
pub struct CardDetails {
    number: SecretString,
    exp_month: String,
    exp_year: String,
    cvc: SecretString,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        exp_month: impl Into<String>,
        exp_year: impl Into<String>,
        cvc: impl Into<String>,
    ) -> Self {
        Self {
            number: SecretString::new(number.into()),
            exp_month: exp_month.into(),
            exp_year: exp_year.into(),
            cvc: SecretString::new(cvc.into()),
        }
    }

    pub fn number(&self) -> &str {
        self.number.expose_secret()
    }

    pub fn exp_month(&self) -> &str {
        &self.exp_month
    }

    pub fn exp_year(&self) -> &str {
        &self.exp_year
    }

    pub fn cvc(&self) -> &str {
        self.cvc.expose_secret()
    }

    /// Last four characters of the card number, for log lines.
    pub fn last4(&self) -> &str {
        let number = self.number();
        let start = number
            .char_indices()
            .rev()
            .nth(3)
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        &number[start..]
    }
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("last4", &self.last4())
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .finish_non_exhaustive()
    }
}

/// A card payment method created at the provider and recorded locally.
///
/// # Invariants
///
/// - `id` is the provider-issued identifier; the row only exists after the
///   provider accepted the card.
/// - Never modified after creation.
#[derive(Debug, Clone)]
pub struct PaymentMethod {
    pub id: PaymentMethodId,
    pub card: CardDetails,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PaymentMethod {
    /// Record a payment method the provider has just created.
    pub fn record(id: PaymentMethodId, card: CardDetails) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            card,
            created_at: now,
            updated_at: now,
        }
    }
}
