//! HTTP adapter for billing endpoints.
//!
//! - `GET /` - Subscription form
//! - `POST /create-subscription` - Start a subscription
//! - `POST /webhook` - Provider webhook events

pub mod dto;
pub mod handlers;
mod pages;
pub mod routes;

pub use dto::{ErrorResponse, SubscriptionForm, WebhookAck};
pub use handlers::{BillingApiError, BillingAppState, SIGNATURE_HEADER};
pub use routes::{billing_router, billing_routes};
