//! In-memory adapters for tests and local runs without a database.

mod in_memory_billing_store;

pub use in_memory_billing_store::InMemoryBillingStore;
