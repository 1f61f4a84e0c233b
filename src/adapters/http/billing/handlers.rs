//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to the billing command handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{Form, Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};

use crate::application::handlers::billing::{
    StartSubscriptionHandler, StartSubscriptionResult, SyncSubscriptionStatusCommand,
    SyncSubscriptionStatusHandler,
};
use crate::domain::billing::{BillingError, PriceCatalog};
use crate::ports::{
    CustomerRepository, PaymentMethodRepository, PaymentProvider, SubscriptionRepository,
};

use super::dto::{ErrorResponse, SubscriptionForm, WebhookAck};
use super::pages::{ERROR_PAGE, INDEX_PAGE, SUCCESS_PAGE};

/// Header carrying the provider's webhook signature.
pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// Cloned per request; every dependency is behind an `Arc`.
#[derive(Clone)]
pub struct BillingAppState {
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub payment_methods: Arc<dyn PaymentMethodRepository>,
    pub customers: Arc<dyn CustomerRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub catalog: Arc<PriceCatalog>,
}

impl BillingAppState {
    pub fn start_subscription_handler(&self) -> StartSubscriptionHandler {
        StartSubscriptionHandler::new(
            self.payment_provider.clone(),
            self.payment_methods.clone(),
            self.customers.clone(),
            self.subscriptions.clone(),
            self.catalog.clone(),
        )
    }

    pub fn sync_status_handler(&self) -> SyncSubscriptionStatusHandler {
        SyncSubscriptionStatusHandler::new(
            self.payment_provider.clone(),
            self.subscriptions.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Pages
// ════════════════════════════════════════════════════════════════════════════════

/// GET / - Landing page with the subscription form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

/// POST /create-subscription - Run the subscription sequence
///
/// Always 200; the page only says whether it worked.
pub async fn create_subscription(
    State(state): State<BillingAppState>,
    form: Result<Form<SubscriptionForm>, FormRejection>,
) -> Html<&'static str> {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Unreadable subscription form");
            SubscriptionForm::default()
        }
    };

    tracing::info!("Subscription request received");

    let handler = state.start_subscription_handler();
    match handler.handle(form.into()).await {
        StartSubscriptionResult::Succeeded(_) => Html(SUCCESS_PAGE),
        StartSubscriptionResult::Failed { .. } => Html(ERROR_PAGE),
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhook - Apply a provider subscription event
pub async fn webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    tracing::info!(bytes = body.len(), "Webhook received");

    let handler = state.sync_status_handler();
    handler
        .handle(SyncSubscriptionStatusCommand {
            payload: body.to_vec(),
            signature,
        })
        .await?;

    Ok((StatusCode::OK, Json(WebhookAck { received: true })))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
#[derive(Debug)]
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_code) = match &self.0 {
            BillingError::MalformedWebhook(_) => (StatusCode::BAD_REQUEST, "MALFORMED_WEBHOOK"),
            BillingError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            BillingError::InvalidWebhookSignature => {
                (StatusCode::UNAUTHORIZED, "INVALID_WEBHOOK_SIGNATURE")
            }
            BillingError::SubscriptionNotFound(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SUBSCRIPTION_NOT_FOUND")
            }
            BillingError::UnknownPlan(_)
            | BillingError::PaymentFailed { .. }
            | BillingError::PaymentMethodNotFound(_)
            | BillingError::CustomerNotFound(_)
            | BillingError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Webhook processing failed");
        } else {
            tracing::warn!(error = %self.0, "Webhook rejected");
        }

        let body = ErrorResponse::new(error_code, self.0.public_message());
        (status, Json(body)).into_response()
    }
}
