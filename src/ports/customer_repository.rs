//! Customer repository port.

use async_trait::async_trait;

use crate::domain::billing::Customer;
use crate::domain::foundation::{CustomerId, DomainError};

/// Repository port for Customer persistence.
///
/// Implementations must reject a customer whose payment method is not stored.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Save a new customer.
    ///
    /// # Errors
    ///
    /// - `PaymentMethodNotFound` if the referenced payment method is missing
    /// - `AlreadyExists` if the identifier is already stored
    /// - `DatabaseError` on persistence failure
    async fn save(&self, customer: &Customer) -> Result<(), DomainError>;

    /// Find a customer by its provider identifier.
    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError>;
}
