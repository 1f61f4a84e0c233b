//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Stateful objects (created methods, customers and subscriptions are remembered)
//! - Error injection, globally or per method
//! - Call tracking
//! - Webhook parsing with the same event conversion as the real adapter

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::billing::CardDetails;
use crate::domain::foundation::{CustomerId, PaymentMethodId, SubscriptionId};
use crate::ports::{
    CreateCustomerRequest, CreateSubscriptionRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, ProviderCustomer, ProviderPaymentMethod, ProviderSubscription, WebhookEvent,
};

use super::webhook_types::StripeWebhookEvent;

/// Status echoed by `create_subscription` unless configured otherwise.
const DEFAULT_INITIAL_STATUS: &str = "incomplete";

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Inject errors
/// mock.set_method_error("attach_payment_method", PaymentError::card_declined("Test decline"));
///
/// // Use in tests, then assert on the call log
/// let result = handler.handle(command).await;
/// assert!(mock.was_called("create_customer"));
/// ```
#[derive(Default)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    payment_methods: HashMap<String, ProviderPaymentMethod>,

    customers: HashMap<String, ProviderCustomer>,

    subscriptions: HashMap<String, ProviderSubscription>,

    /// Status returned by `create_subscription`; `None` uses the default.
    initial_status: Option<String>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Specific errors by method name.
    method_errors: HashMap<String, PaymentError>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,

    /// Webhook verification behavior.
    webhook_verify_mode: WebhookVerifyMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook signatures.
#[derive(Default, Clone)]
enum WebhookVerifyMode {
    /// Ignore the signature, like the real adapter without a secret.
    #[default]
    AcceptAll,

    /// Require this exact signature header value.
    RequireSignature(String),

    /// Always fail verification.
    AlwaysFail,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode = WebhookVerifyMode::AlwaysFail;
        mock
    }

    /// Create a mock that only accepts webhooks carrying `signature`.
    pub fn requiring_signature(signature: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().webhook_verify_mode =
            WebhookVerifyMode::RequireSignature(signature.into());
        mock
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the status echoed by subsequent `create_subscription` calls.
    pub fn set_initial_status(&self, status: impl Into<String>) {
        self.inner.lock().unwrap().initial_status = Some(status.into());
    }

    /// Set an error to return on the next call to any method.
    pub fn set_error(&self, error: PaymentError) {
        self.inner.lock().unwrap().next_error = Some(error);
    }

    /// Set an error for a specific method.
    pub fn set_method_error(&self, method: &str, error: PaymentError) {
        self.inner
            .lock()
            .unwrap()
            .method_errors
            .insert(method.to_string(), error);
    }

    /// Clear all configured errors.
    pub fn clear_errors(&self) {
        let mut state = self.inner.lock().unwrap();
        state.next_error = None;
        state.method_errors.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Inspection
    // ════════════════════════════════════════════════════════════════════════════

    /// Payment method as the mock provider currently sees it.
    pub fn payment_method(&self, id: &str) -> Option<ProviderPaymentMethod> {
        self.inner.lock().unwrap().payment_methods.get(id).cloned()
    }

    /// Customer as the mock provider currently sees it.
    pub fn customer(&self, id: &str) -> Option<ProviderCustomer> {
        self.inner.lock().unwrap().customers.get(id).cloned()
    }

    /// Subscription as the mock provider currently sees it.
    pub fn subscription(&self, id: &str) -> Option<ProviderSubscription> {
        self.inner.lock().unwrap().subscriptions.get(id).cloned()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Get all recorded method calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.inner.lock().unwrap().call_log.clone()
    }

    /// Recorded method names, in call order.
    pub fn call_sequence(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .map(|c| c.method.clone())
            .collect()
    }

    /// Check if a method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .any(|c| c.method == method)
    }

    /// Get count of calls to a method.
    pub fn call_count(&self, method: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().call_log.clear();
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Internal Helpers
    // ════════════════════════════════════════════════════════════════════════════

    fn record_call(&self, method: &str, args: Vec<String>) {
        self.inner.lock().unwrap().call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }

    fn check_error(&self, method: &str) -> Result<(), PaymentError> {
        let mut state = self.inner.lock().unwrap();

        // Check method-specific error first
        if let Some(error) = state.method_errors.get(method) {
            return Err(error.clone());
        }

        // Check global error (consumes it)
        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(())
    }
}

impl Clone for MockPaymentProvider {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn mock_id(prefix: &str) -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_mock_{}", prefix, &uuid[..14])
}

fn not_found(kind: &str, id: &str) -> PaymentError {
    PaymentError::new(
        PaymentErrorCode::NotFound,
        format!("No such {}: '{}'", kind, id),
    )
    .with_provider_code("resource_missing")
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<ProviderPaymentMethod, PaymentError> {
        self.record_call("create_payment_method", vec![card.last4().to_string()]);
        self.check_error("create_payment_method")?;

        if card.number().is_empty() {
            return Err(PaymentError::new(
                PaymentErrorCode::InvalidCard,
                "Missing required param: card[number].",
            )
            .with_provider_code("parameter_missing"));
        }

        let pm = ProviderPaymentMethod {
            id: mock_id("pm"),
            customer_id: None,
            last4: Some(card.last4().to_string()),
        };

        self.inner
            .lock()
            .unwrap()
            .payment_methods
            .insert(pm.id.clone(), pm.clone());

        Ok(pm)
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, PaymentError> {
        self.record_call(
            "create_customer",
            vec![request.name.clone(), request.description.clone()],
        );
        self.check_error("create_customer")?;

        let customer = ProviderCustomer {
            id: mock_id("cus"),
            name: Some(request.name),
            description: Some(request.description),
            default_payment_method: None,
        };

        self.inner
            .lock()
            .unwrap()
            .customers
            .insert(customer.id.clone(), customer.clone());

        Ok(customer)
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
        customer_id: &CustomerId,
    ) -> Result<ProviderPaymentMethod, PaymentError> {
        self.record_call(
            "attach_payment_method",
            vec![payment_method_id.to_string(), customer_id.to_string()],
        );
        self.check_error("attach_payment_method")?;

        let mut state = self.inner.lock().unwrap();

        if !state.customers.contains_key(customer_id.as_str()) {
            return Err(not_found("customer", customer_id.as_str()));
        }

        let pm = state
            .payment_methods
            .get_mut(payment_method_id.as_str())
            .ok_or_else(|| not_found("payment_method", payment_method_id.as_str()))?;
        pm.customer_id = Some(customer_id.to_string());

        Ok(pm.clone())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &CustomerId,
        payment_method_id: &PaymentMethodId,
    ) -> Result<ProviderCustomer, PaymentError> {
        self.record_call(
            "set_default_payment_method",
            vec![customer_id.to_string(), payment_method_id.to_string()],
        );
        self.check_error("set_default_payment_method")?;

        let mut state = self.inner.lock().unwrap();

        let customer = state
            .customers
            .get_mut(customer_id.as_str())
            .ok_or_else(|| not_found("customer", customer_id.as_str()))?;
        customer.default_payment_method = Some(payment_method_id.to_string());

        Ok(customer.clone())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        self.record_call(
            "create_subscription",
            vec![request.customer_id.to_string(), request.price_id.to_string()],
        );
        self.check_error("create_subscription")?;

        let mut state = self.inner.lock().unwrap();

        if !state.customers.contains_key(request.customer_id.as_str()) {
            return Err(not_found("customer", request.customer_id.as_str()));
        }

        let subscription = ProviderSubscription {
            id: mock_id("sub"),
            customer_id: request.customer_id.to_string(),
            status: state
                .initial_status
                .clone()
                .unwrap_or_else(|| DEFAULT_INITIAL_STATUS.to_string()),
            metadata: HashMap::new(),
        };

        state
            .subscriptions
            .insert(subscription.id.clone(), subscription.clone());

        Ok(subscription)
    }

    async fn update_subscription_metadata(
        &self,
        subscription_id: &SubscriptionId,
        metadata: HashMap<String, String>,
    ) -> Result<ProviderSubscription, PaymentError> {
        let mut args = vec![subscription_id.to_string()];
        let mut pairs: Vec<String> = metadata.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        pairs.sort();
        args.extend(pairs);
        self.record_call("update_subscription_metadata", args);
        self.check_error("update_subscription_metadata")?;

        let mut state = self.inner.lock().unwrap();

        let subscription = state
            .subscriptions
            .get_mut(subscription_id.as_str())
            .ok_or_else(|| not_found("subscription", subscription_id.as_str()))?;
        subscription.metadata.extend(metadata);

        Ok(subscription.clone())
    }

    async fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, PaymentError> {
        self.record_call(
            "parse_webhook",
            vec![
                String::from_utf8_lossy(payload).chars().take(50).collect(),
                signature.unwrap_or_default().chars().take(20).collect(),
            ],
        );
        self.check_error("parse_webhook")?;

        let mode = self.inner.lock().unwrap().webhook_verify_mode.clone();
        match mode {
            WebhookVerifyMode::AcceptAll => {}
            WebhookVerifyMode::RequireSignature(required) => {
                if signature != Some(required.as_str()) {
                    return Err(PaymentError::invalid_signature("Invalid signature"));
                }
            }
            WebhookVerifyMode::AlwaysFail => {
                return Err(PaymentError::invalid_signature("Verification disabled"));
            }
        }

        StripeWebhookEvent::from_slice(payload)?.into_webhook_event()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Test Helpers
// ════════════════════════════════════════════════════════════════════════════════

impl MockPaymentProvider {
    /// Build a Stripe-shaped subscription event body.
    pub fn subscription_event_payload(event_type: &str, subscription_id: &str, status: &str) -> String {
        serde_json::json!({
            "id": mock_id("evt"),
            "object": "event",
            "type": event_type,
            "created": chrono::Utc::now().timestamp(),
            "livemode": false,
            "data": {
                "object": {
                    "id": subscription_id,
                    "object": "subscription",
                    "status": status,
                }
            }
        })
        .to_string()
    }
}
