//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration, including:
//! - Card payment methods and customers
//! - Subscription creation and metadata tagging
//! - Webhook parsing with optional signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`
//!
//! # Configuration
//!
//! Built from the `payment` configuration section:
//! - `WALLST__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `WALLST__PAYMENT__STRIPE_WEBHOOK_SECRET`: optional webhook signing secret (whsec_...)

mod mock_payment_provider;
mod stripe_adapter;
mod webhook_types;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
pub use webhook_types::{
    SignatureHeader, SignatureParseError, StripeCustomer, StripePaymentMethod,
    StripeSubscription, StripeWebhookEvent,
};
