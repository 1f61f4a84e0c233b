//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (provider IDs, timestamps, errors)
//! - `billing` - Payment method, customer and subscription records

pub mod billing;
pub mod foundation;
