//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{create_subscription, index, webhook, BillingAppState};

/// Create the billing router.
///
/// # Routes
///
/// - `GET /` - Landing page with the subscription form
/// - `POST /create-subscription` - Submit the form and start a subscription
/// - `POST /webhook` - Provider subscription events (signature checked when configured)
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/", get(index))
        .route("/create-subscription", post(create_subscription))
        .route("/webhook", post(webhook))
}

/// Create the billing router with its state applied.
///
/// # Example
///
/// ```ignore
/// let state = BillingAppState { /* ... */ };
/// let app = billing_router(state);
/// ```
pub fn billing_router(state: BillingAppState) -> Router {
    billing_routes().with_state(state)
}
