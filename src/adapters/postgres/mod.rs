//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! One repository per billing table:
//! - `PostgresPaymentMethodRepository` - `payment_method`
//! - `PostgresCustomerRepository` - `customer` (FK `payment_id`)
//! - `PostgresSubscriptionRepository` - `subscription` (FK `customer_id`)
//!
//! Foreign key violations surface as the matching `*NotFound` error code so
//! callers see the same errors as with the in-memory store.

mod customer_repository;
mod payment_method_repository;
mod subscription_repository;

pub use customer_repository::PostgresCustomerRepository;
pub use payment_method_repository::PostgresPaymentMethodRepository;
pub use subscription_repository::PostgresSubscriptionRepository;
