//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `stripe` - Stripe REST client, webhook parsing and a mock provider
//! - `postgres` - PostgreSQL repositories
//! - `memory` - In-memory repositories for tests
//! - `http` - Axum routes and handlers

pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use memory::InMemoryBillingStore;
pub use postgres::{
    PostgresCustomerRepository, PostgresPaymentMethodRepository, PostgresSubscriptionRepository,
};
pub use stripe::{MockPaymentProvider, StripeConfig, StripePaymentAdapter};
