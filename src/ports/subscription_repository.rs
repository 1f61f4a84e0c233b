//! Subscription repository port.
//!
//! The status column is the only one that changes after insert, and only the
//! webhook path changes it.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, SubscriptionId};

/// Repository port for Subscription persistence.
///
/// Implementations must reject a subscription whose customer is not stored.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Save a new subscription.
    ///
    /// # Errors
    ///
    /// - `CustomerNotFound` if the referenced customer is missing
    /// - `AlreadyExists` if the identifier is already stored
    /// - `DatabaseError` on persistence failure
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError>;

    /// Find a subscription by its provider identifier.
    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Persist `status` and `updated_at` of an existing subscription.
    ///
    /// No other column is written.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if no row has this identifier
    /// - `DatabaseError` on persistence failure
    async fn update_status(&self, subscription: &Subscription) -> Result<(), DomainError>;
}
