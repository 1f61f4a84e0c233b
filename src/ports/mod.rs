//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Provider Port
//!
//! - `PaymentProvider` - Stripe calls and webhook parsing
//!
//! ## Persistence Ports
//!
//! - `PaymentMethodRepository` - Card payment method rows
//! - `CustomerRepository` - Customer rows (reference a payment method)
//! - `SubscriptionRepository` - Subscription rows (reference a customer)

mod customer_repository;
mod payment_method_repository;
mod payment_provider;
mod subscription_repository;

pub use customer_repository::CustomerRepository;
pub use payment_method_repository::PaymentMethodRepository;
pub use payment_provider::{
    CreateCustomerRequest, CreateSubscriptionRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, ProviderCustomer, ProviderPaymentMethod, ProviderSubscription,
    WebhookEvent, WebhookEventData, WebhookEventType,
};
pub use subscription_repository::SubscriptionRepository;
