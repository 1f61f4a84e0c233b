//! Billing handlers.
//!
//! ## Commands
//! - Starting a subscription from submitted card details
//! - Syncing subscription status from provider webhooks

mod start_subscription;
mod sync_subscription_status;

pub use start_subscription::{
    StartSubscriptionCommand, StartSubscriptionHandler, StartSubscriptionResult,
    SubscriptionReceipt, SubscriptionStep,
};
pub use sync_subscription_status::{
    SyncSubscriptionStatusCommand, SyncSubscriptionStatusHandler, SyncSubscriptionStatusResult,
};
