//! Payment method repository port.
//!
//! Rows are written once, right after the provider created the payment
//! method, and are never updated or deleted afterwards.

use async_trait::async_trait;

use crate::domain::billing::PaymentMethod;
use crate::domain::foundation::{DomainError, PaymentMethodId};

/// Repository port for PaymentMethod persistence.
#[async_trait]
pub trait PaymentMethodRepository: Send + Sync {
    /// Save a new payment method.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the identifier is already stored
    /// - `DatabaseError` on persistence failure
    async fn save(&self, payment_method: &PaymentMethod) -> Result<(), DomainError>;

    /// Find a payment method by its provider identifier.
    async fn find_by_id(
        &self,
        id: &PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, DomainError>;
}
