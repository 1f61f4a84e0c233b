//! HTTP adapters - Web entry points.
//!
//! Each domain module has its own HTTP adapter; `app` assembles them with the
//! shared tower layers.

pub mod billing;

use std::time::Duration;

use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use billing::{billing_router, BillingApiError, BillingAppState};

/// Build the full application router.
///
/// Requests are traced and cut off after `request_timeout`.
pub fn app(state: BillingAppState, request_timeout: Duration) -> Router {
    billing_router(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
