//! In-memory billing store for testing.
//!
//! Implements all three billing repository ports over one shared state so the
//! customer → payment method and subscription → customer references can be
//! checked the same way the database foreign keys check them.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on lock operations which will panic if locks are poisoned.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::billing::{Customer, PaymentMethod, Subscription};
use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, PaymentMethodId, SubscriptionId,
};
use crate::ports::{CustomerRepository, PaymentMethodRepository, SubscriptionRepository};

#[derive(Default)]
struct StoreState {
    payment_methods: HashMap<PaymentMethodId, PaymentMethod>,
    customers: HashMap<CustomerId, Customer>,
    subscriptions: HashMap<SubscriptionId, Subscription>,
    unavailable: bool,
}

/// In-memory implementation of the billing repositories.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemoryBillingStore::new());
/// let handler = StartSubscriptionHandler::new(provider, store.clone(), store.clone(), store.clone(), catalog);
///
/// handler.handle(command).await;
/// assert_eq!(store.subscription_count(), 1);
/// ```
#[derive(Default)]
pub struct InMemoryBillingStore {
    state: RwLock<StoreState>,
}

impl InMemoryBillingStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Make every subsequent call fail as if the database were down.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.write().unavailable = unavailable;
    }

    pub fn payment_method_count(&self) -> usize {
        self.read().payment_methods.len()
    }

    pub fn customer_count(&self) -> usize {
        self.read().customers.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.read().subscriptions.len()
    }

    /// Returns all stored subscriptions (for test assertions).
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.read().subscriptions.values().cloned().collect()
    }

    /// Returns all stored customers (for test assertions).
    pub fn customers(&self) -> Vec<Customer> {
        self.read().customers.values().cloned().collect()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state
            .read()
            .expect("InMemoryBillingStore: lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state
            .write()
            .expect("InMemoryBillingStore: lock poisoned")
    }

    fn check_available(state: &StoreState) -> Result<(), DomainError> {
        if state.unavailable {
            return Err(DomainError::database("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

fn already_exists(kind: &str, id: &str) -> DomainError {
    DomainError::new(
        ErrorCode::AlreadyExists,
        format!("{} {} already exists", kind, id),
    )
}

#[async_trait]
impl PaymentMethodRepository for InMemoryBillingStore {
    async fn save(&self, payment_method: &PaymentMethod) -> Result<(), DomainError> {
        let mut state = self.write();
        Self::check_available(&state)?;

        if state.payment_methods.contains_key(&payment_method.id) {
            return Err(already_exists("Payment method", payment_method.id.as_str()));
        }

        state
            .payment_methods
            .insert(payment_method.id.clone(), payment_method.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &PaymentMethodId,
    ) -> Result<Option<PaymentMethod>, DomainError> {
        let state = self.read();
        Self::check_available(&state)?;
        Ok(state.payment_methods.get(id).cloned())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryBillingStore {
    async fn save(&self, customer: &Customer) -> Result<(), DomainError> {
        let mut state = self.write();
        Self::check_available(&state)?;

        if !state.payment_methods.contains_key(&customer.payment_method_id) {
            return Err(DomainError::new(
                ErrorCode::PaymentMethodNotFound,
                format!("Payment method {} not found", customer.payment_method_id),
            ));
        }
        if state.customers.contains_key(&customer.id) {
            return Err(already_exists("Customer", customer.id.as_str()));
        }

        state.customers.insert(customer.id.clone(), customer.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CustomerId) -> Result<Option<Customer>, DomainError> {
        let state = self.read();
        Self::check_available(&state)?;
        Ok(state.customers.get(id).cloned())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryBillingStore {
    async fn save(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.write();
        Self::check_available(&state)?;

        if !state.customers.contains_key(&subscription.customer_id) {
            return Err(DomainError::new(
                ErrorCode::CustomerNotFound,
                format!("Customer {} not found", subscription.customer_id),
            ));
        }
        if state.subscriptions.contains_key(&subscription.id) {
            return Err(already_exists("Subscription", subscription.id.as_str()));
        }

        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, DomainError> {
        let state = self.read();
        Self::check_available(&state)?;
        Ok(state.subscriptions.get(id).cloned())
    }

    async fn update_status(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut state = self.write();
        Self::check_available(&state)?;

        let stored = state
            .subscriptions
            .get_mut(&subscription.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::SubscriptionNotFound,
                    format!("Subscription {} not found", subscription.id),
                )
            })?;

        stored.status = subscription.status.clone();
        stored.updated_at = subscription.updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::{CardDetails, SubscriptionStatus};
    use crate::domain::foundation::{PriceId, Timestamp};

    fn payment_method(id: &str) -> PaymentMethod {
        PaymentMethod::record(
            PaymentMethodId::new(id).unwrap(),
            CardDetails::new("4242424242424242", "8", "2030", "314"),
        )
    }

    fn customer(id: &str, pm: &str) -> Customer {
        Customer::record(
            CustomerId::new(id).unwrap(),
            PaymentMethodId::new(pm).unwrap(),
            "Nick",
            "nick@xyz.com",
        )
    }

    fn subscription(id: &str, customer: &str) -> Subscription {
        Subscription::record(
            SubscriptionId::new(id).unwrap(),
            CustomerId::new(customer).unwrap(),
            PriceId::new("price_standard").unwrap(),
            SubscriptionStatus::new("incomplete"),
        )
    }

    async fn seeded() -> InMemoryBillingStore {
        let store = InMemoryBillingStore::new();
        PaymentMethodRepository::save(&store, &payment_method("pm_1"))
            .await
            .unwrap();
        CustomerRepository::save(&store, &customer("cus_1", "pm_1"))
            .await
            .unwrap();
        SubscriptionRepository::save(&store, &subscription("sub_1", "cus_1"))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn saves_and_finds_each_entity() {
        let store = seeded().await;

        let pm = PaymentMethodRepository::find_by_id(&store, &PaymentMethodId::new("pm_1").unwrap())
            .await
            .unwrap();
        assert_eq!(pm.unwrap().card.exp_year(), "2030");

        let cus = CustomerRepository::find_by_id(&store, &CustomerId::new("cus_1").unwrap())
            .await
            .unwrap();
        assert_eq!(cus.unwrap().payment_method_id.as_str(), "pm_1");

        let sub = SubscriptionRepository::find_by_id(&store, &SubscriptionId::new("sub_1").unwrap())
            .await
            .unwrap();
        assert_eq!(sub.unwrap().status.as_str(), "incomplete");
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let store = InMemoryBillingStore::new();
        let found = SubscriptionRepository::find_by_id(&store, &SubscriptionId::new("sub_x").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn customer_requires_existing_payment_method() {
        let store = InMemoryBillingStore::new();

        let err = CustomerRepository::save(&store, &customer("cus_1", "pm_missing"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::PaymentMethodNotFound);
        assert_eq!(store.customer_count(), 0);
    }

    #[tokio::test]
    async fn subscription_requires_existing_customer() {
        let store = InMemoryBillingStore::new();

        let err = SubscriptionRepository::save(&store, &subscription("sub_1", "cus_missing"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::CustomerNotFound);
    }

    #[tokio::test]
    async fn duplicate_ids_are_rejected() {
        let store = seeded().await;

        let err = PaymentMethodRepository::save(&store, &payment_method("pm_1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::AlreadyExists);
        assert_eq!(store.payment_method_count(), 1);
    }

    #[tokio::test]
    async fn update_status_writes_only_status_and_updated_at() {
        let store = seeded().await;
        let id = SubscriptionId::new("sub_1").unwrap();
        let original = SubscriptionRepository::find_by_id(&store, &id)
            .await
            .unwrap()
            .unwrap();

        let mut changed = original.clone();
        changed.apply_status(SubscriptionStatus::new("active"), Timestamp::now());
        changed.price_id = PriceId::new("price_other").unwrap();
        store.update_status(&changed).await.unwrap();

        let stored = SubscriptionRepository::find_by_id(&store, &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status.as_str(), "active");
        assert_eq!(stored.updated_at, changed.updated_at);
        assert_eq!(stored.price_id, original.price_id);
    }

    #[tokio::test]
    async fn update_status_for_unknown_subscription_fails() {
        let store = InMemoryBillingStore::new();

        let err = store
            .update_status(&subscription("sub_ghost", "cus_1"))
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = seeded().await;
        store.set_unavailable(true);

        let err = CustomerRepository::find_by_id(&store, &CustomerId::new("cus_1").unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
