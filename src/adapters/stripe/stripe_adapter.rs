//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API. Every
//! call is a form-encoded `POST` authenticated with the secret key.
//!
//! # Security
//!
//! - Card number and CVC only leave their `SecretString` when the form is built
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamp validation (5-minute window) for replay attack prevention
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key, Some(webhook_secret));
//! let adapter = StripePaymentAdapter::new(config);
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::config::{PaymentConfig, DEFAULT_STRIPE_API_BASE_URL};
use crate::domain::billing::CardDetails;
use crate::domain::foundation::{CustomerId, PaymentMethodId, SubscriptionId};
use crate::ports::{
    CreateCustomerRequest, CreateSubscriptionRequest, PaymentError, PaymentProvider,
    ProviderCustomer, ProviderPaymentMethod, ProviderSubscription, WebhookEvent,
};

use super::webhook_types::{
    SignatureHeader, StripeApiError, StripeCustomer, StripeErrorEnvelope, StripePaymentMethod,
    StripeSubscription, StripeWebhookEvent,
};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age for webhook events (5 minutes).
const MAX_TIMESTAMP_AGE_SECS: i64 = 300;

/// Clock skew tolerance for future timestamps (60 seconds).
const MAX_FUTURE_TOLERANCE_SECS: i64 = 60;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Webhook signing secret (whsec_...). Verification is off when `None`.
    webhook_secret: Option<SecretString>,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>, webhook_secret: Option<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            webhook_secret: webhook_secret
                .filter(|secret| !secret.is_empty())
                .map(SecretString::new),
            api_base_url: DEFAULT_STRIPE_API_BASE_URL.to_string(),
        }
    }

    /// Build from the validated application payment section.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self::new(
            config.stripe_api_key.clone(),
            config.stripe_webhook_secret.clone(),
        )
        .with_base_url(config.stripe_api_base_url.clone())
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Whether webhooks must carry a valid signature.
    pub fn verifies_webhooks(&self) -> bool {
        self.webhook_secret.is_some()
    }
}

impl std::fmt::Debug for StripeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeConfig")
            .field("api_base_url", &self.api_base_url)
            .field("verifies_webhooks", &self.verifies_webhooks())
            .finish_non_exhaustive()
    }
}

/// Stripe payment provider adapter.
///
/// Implements `PaymentProvider` for Stripe API integration.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// POST a form to the Stripe API and decode the JSON response.
    async fn send_form<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, PaymentError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(operation, error = %e, "Stripe request failed");
                PaymentError::network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let api_error = serde_json::from_str::<StripeErrorEnvelope>(&error_text)
                .map(|envelope| envelope.error)
                .unwrap_or(StripeApiError {
                    error_type: None,
                    code: None,
                    message: None,
                });
            let err = api_error.into_payment_error(status.as_u16());
            tracing::error!(
                operation,
                status = status.as_u16(),
                code = %err.code,
                provider_code = ?err.provider_code,
                "Stripe API returned an error"
            );
            return Err(err);
        }

        response.json::<T>().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }

    /// Verify webhook signature using HMAC-SHA256.
    ///
    /// # Security
    ///
    /// - Uses constant-time comparison to prevent timing attacks
    /// - Validates timestamp to prevent replay attacks
    fn verify_signature(
        &self,
        secret: &SecretString,
        payload: &[u8],
        header: &SignatureHeader,
    ) -> Result<(), PaymentError> {
        // 1. Validate timestamp (prevent replay attacks)
        let now = chrono::Utc::now().timestamp();
        let age = now - header.timestamp;

        if age > MAX_TIMESTAMP_AGE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                age_secs = age,
                "Webhook event too old - possible replay attack"
            );
            return Err(PaymentError::invalid_signature(format!(
                "Event too old ({} seconds)",
                age
            )));
        }

        if age < -MAX_FUTURE_TOLERANCE_SECS {
            tracing::warn!(
                event_timestamp = header.timestamp,
                current_time = now,
                "Webhook event from future - clock skew or manipulation"
            );
            return Err(PaymentError::invalid_signature("Event timestamp in future"));
        }

        // 2. Compute expected signature over "<t>.<body>"
        let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| PaymentError::invalid_signature(e.to_string()))?;
        mac.update(header.timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        // 3. Constant-time comparison against every v1 entry
        let matched = header
            .v1_signatures
            .iter()
            .any(|provided| expected.as_slice().ct_eq(provided).unwrap_u8() == 1);

        if !matched {
            tracing::warn!("Invalid webhook signature");
            return Err(PaymentError::invalid_signature("Invalid signature"));
        }

        Ok(())
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<ProviderPaymentMethod, PaymentError> {
        let params = [
            ("type", "card".to_string()),
            ("card[number]", card.number().to_string()),
            ("card[exp_month]", card.exp_month().to_string()),
            ("card[exp_year]", card.exp_year().to_string()),
            ("card[cvc]", card.cvc().to_string()),
        ];

        let pm: StripePaymentMethod = self
            .send_form("create_payment_method", "/v1/payment_methods", &params)
            .await?;

        Ok(pm.into())
    }

    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, PaymentError> {
        let params = [
            ("name", request.name),
            ("description", request.description),
        ];

        let customer: StripeCustomer = self
            .send_form("create_customer", "/v1/customers", &params)
            .await?;

        Ok(customer.into())
    }

    async fn attach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
        customer_id: &CustomerId,
    ) -> Result<ProviderPaymentMethod, PaymentError> {
        let path = format!("/v1/payment_methods/{}/attach", payment_method_id);
        let params = [("customer", customer_id.to_string())];

        let pm: StripePaymentMethod = self
            .send_form("attach_payment_method", &path, &params)
            .await?;

        Ok(pm.into())
    }

    async fn set_default_payment_method(
        &self,
        customer_id: &CustomerId,
        payment_method_id: &PaymentMethodId,
    ) -> Result<ProviderCustomer, PaymentError> {
        let path = format!("/v1/customers/{}", customer_id);
        let params = [(
            "invoice_settings[default_payment_method]",
            payment_method_id.to_string(),
        )];

        let customer: StripeCustomer = self
            .send_form("set_default_payment_method", &path, &params)
            .await?;

        Ok(customer.into())
    }

    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError> {
        let params = [
            ("customer", request.customer_id.to_string()),
            ("items[0][price]", request.price_id.to_string()),
        ];

        let sub: StripeSubscription = self
            .send_form("create_subscription", "/v1/subscriptions", &params)
            .await?;

        Ok(sub.into())
    }

    async fn update_subscription_metadata(
        &self,
        subscription_id: &SubscriptionId,
        metadata: HashMap<String, String>,
    ) -> Result<ProviderSubscription, PaymentError> {
        let path = format!("/v1/subscriptions/{}", subscription_id);
        let keys: Vec<String> = metadata
            .keys()
            .map(|key| format!("metadata[{}]", key))
            .collect();
        let params: Vec<(&str, String)> = keys
            .iter()
            .map(String::as_str)
            .zip(metadata.values().cloned())
            .collect();

        let sub: StripeSubscription = self
            .send_form("update_subscription_metadata", &path, &params)
            .await?;

        Ok(sub.into())
    }

    async fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, PaymentError> {
        if let Some(secret) = &self.config.webhook_secret {
            // 1. Parse signature header
            let header = SignatureHeader::parse(signature.unwrap_or_default()).map_err(|e| {
                tracing::warn!(error = %e, "Failed to parse Stripe-Signature header");
                PaymentError::invalid_signature(e.to_string())
            })?;

            // 2. Verify signature (includes timestamp validation)
            self.verify_signature(secret, payload, &header)?;
        }

        // 3. Parse and convert event
        let event = StripeWebhookEvent::from_slice(payload)?.into_webhook_event()?;

        tracing::debug!(
            event_id = %event.id,
            event_type = %event.event_type,
            verified = self.config.verifies_webhooks(),
            "Webhook parsed"
        );

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PriceId;
    use crate::ports::{PaymentErrorCode, WebhookEventData, WebhookEventType};
    use axum::routing::post;
    use axum::{Form, Json, Router};
    use std::sync::{Arc, Mutex};

    const SECRET: &str = "whsec_test_secret";

    fn test_config() -> StripeConfig {
        StripeConfig::new("sk_test_key", Some(SECRET.to_string()))
    }

    fn create_test_signature(secret: &str, timestamp: i64, payload: &str) -> String {
        let signed_payload = format!("{}.{}", timestamp, payload);
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(signed_payload.as_bytes());
        let result = mac.finalize().into_bytes();

        format!(
            "t={},v1={}",
            timestamp,
            super::super::webhook_types::hex_encode(&result)
        )
    }

    fn verify(adapter: &StripePaymentAdapter, payload: &str, signature: &str) -> Result<(), PaymentError> {
        let header = SignatureHeader::parse(signature).unwrap();
        let secret = adapter.config.webhook_secret.clone().unwrap();
        adapter.verify_signature(&secret, payload.as_bytes(), &header)
    }

    const SUBSCRIPTION_UPDATED: &str = r#"{
        "id": "evt_sub",
        "type": "customer.subscription.updated",
        "created": 1704067200,
        "data": {
            "object": {
                "id": "sub_test",
                "object": "subscription",
                "customer": "cus_test",
                "status": "active"
            }
        },
        "livemode": false
    }"#;

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("api_key", None);
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert!(!config.verifies_webhooks());
    }

    #[test]
    fn config_empty_secret_disables_verification() {
        let config = StripeConfig::new("api_key", Some(String::new()));
        assert!(!config.verifies_webhooks());
    }

    #[test]
    fn config_with_base_url_trims_trailing_slash() {
        let config = StripeConfig::new("key", None).with_base_url("http://localhost:8080/");
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn config_from_payment_config() {
        let payment = PaymentConfig {
            stripe_api_key: "sk_test_1".to_string(),
            standard_price_id: "price_1".to_string(),
            stripe_webhook_secret: Some("whsec_1".to_string()),
            stripe_api_base_url: "http://127.0.0.1:12111".to_string(),
        };
        let config = StripeConfig::from_payment_config(&payment);
        assert!(config.verifies_webhooks());
        assert_eq!(config.api_base_url, "http://127.0.0.1:12111");
    }

    #[test]
    fn config_debug_hides_secrets() {
        let debug = format!("{:?}", test_config());
        assert!(!debug.contains("sk_test_key"));
        assert!(!debug.contains(SECRET));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn verify_signature_valid() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature(SECRET, timestamp, payload);

        assert!(verify(&adapter, payload, &signature).is_ok());
    }

    #[test]
    fn verify_signature_accepts_any_matching_v1() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();
        let good = create_test_signature(SECRET, timestamp, payload);
        let good_v1 = good.split_once(",v1=").unwrap().1;
        let signature = format!("t={},v1={},v1={}", timestamp, "00".repeat(32), good_v1);

        assert!(verify(&adapter, payload, &signature).is_ok());
    }

    #[test]
    fn verify_signature_invalid() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let timestamp = chrono::Utc::now().timestamp();

        // Create signature with wrong secret
        let signature = create_test_signature("wrong_secret", timestamp, payload);

        let err = verify(&adapter, payload, &signature).unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidSignature);
    }

    #[test]
    fn verify_signature_expired_timestamp() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let old_timestamp = chrono::Utc::now().timestamp() - 600; // 10 minutes ago
        let signature = create_test_signature(SECRET, old_timestamp, payload);

        let err = verify(&adapter, payload, &signature).unwrap_err();
        assert!(err.message.contains("too old"));
    }

    #[test]
    fn verify_signature_future_timestamp() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        let future_timestamp = chrono::Utc::now().timestamp() + 120; // 2 minutes in future
        let signature = create_test_signature(SECRET, future_timestamp, payload);

        let err = verify(&adapter, payload, &signature).unwrap_err();
        assert!(err.message.contains("future"));
    }

    #[test]
    fn verify_signature_small_future_tolerance() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = r#"{"id":"evt_test"}"#;
        // 30 seconds in future should be tolerated
        let timestamp = chrono::Utc::now().timestamp() + 30;
        let signature = create_test_signature(SECRET, timestamp, payload);

        assert!(verify(&adapter, payload, &signature).is_ok());
    }

    // ════════════════════════════════════════════════════════════════════════════
    // parse_webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn parse_webhook_without_secret_skips_verification() {
        let adapter = StripePaymentAdapter::new(StripeConfig::new("sk_test_key", None));

        let event = adapter
            .parse_webhook(SUBSCRIPTION_UPDATED.as_bytes(), None)
            .await
            .unwrap();

        assert_eq!(event.event_type, WebhookEventType::SubscriptionUpdated);
        match event.data {
            WebhookEventData::Subscription {
                subscription_id,
                status,
                ..
            } => {
                assert_eq!(subscription_id, "sub_test");
                assert_eq!(status, "active");
            }
            _ => panic!("Expected Subscription data"),
        }
    }

    #[tokio::test]
    async fn parse_webhook_with_valid_signature() {
        let adapter = StripePaymentAdapter::new(test_config());
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature(SECRET, timestamp, SUBSCRIPTION_UPDATED);

        let event = adapter
            .parse_webhook(SUBSCRIPTION_UPDATED.as_bytes(), Some(&signature))
            .await
            .unwrap();

        assert_eq!(event.id, "evt_sub");
    }

    #[tokio::test]
    async fn parse_webhook_requires_header_when_secret_set() {
        let adapter = StripePaymentAdapter::new(test_config());

        let err = adapter
            .parse_webhook(SUBSCRIPTION_UPDATED.as_bytes(), None)
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidSignature);
    }

    #[tokio::test]
    async fn parse_webhook_rejects_malformed_header() {
        let adapter = StripePaymentAdapter::new(test_config());

        let err = adapter
            .parse_webhook(SUBSCRIPTION_UPDATED.as_bytes(), Some("malformed_header"))
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidSignature);
    }

    #[tokio::test]
    async fn parse_webhook_rejects_invalid_json() {
        let adapter = StripePaymentAdapter::new(test_config());
        let payload = "not valid json";
        let timestamp = chrono::Utc::now().timestamp();
        let signature = create_test_signature(SECRET, timestamp, payload);

        let err = adapter
            .parse_webhook(payload.as_bytes(), Some(&signature))
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
        assert!(err.message.contains("Invalid JSON"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // API Call Tests (against a local stub)
    // ════════════════════════════════════════════════════════════════════════════

    type Captured = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

    /// Serve a stub that records each form and echoes a plausible Stripe object.
    async fn spawn_stub() -> (String, Captured) {
        let captured: Captured = Arc::default();

        let record = |path: &'static str, captured: Captured, body: serde_json::Value| {
            move |Form(form): Form<HashMap<String, String>>| {
                let captured = captured.clone();
                let body = body.clone();
                async move {
                    captured.lock().unwrap().push((path.to_string(), form));
                    Json(body)
                }
            }
        };

        let app = Router::new()
            .route(
                "/v1/payment_methods",
                post(record(
                    "payment_methods",
                    captured.clone(),
                    serde_json::json!({"id": "pm_stub", "customer": null, "card": {"last4": "4242"}}),
                )),
            )
            .route(
                "/v1/customers",
                post(record(
                    "customers",
                    captured.clone(),
                    serde_json::json!({"id": "cus_stub", "name": "Nick", "description": "Description: Nick"}),
                )),
            )
            .route(
                "/v1/subscriptions",
                post(record(
                    "subscriptions",
                    captured.clone(),
                    serde_json::json!({"id": "sub_stub", "customer": "cus_stub", "status": "incomplete"}),
                )),
            )
            .route(
                "/v1/subscriptions/sub_stub",
                post(record(
                    "subscriptions/sub_stub",
                    captured.clone(),
                    serde_json::json!({"id": "sub_stub", "customer": "cus_stub", "status": "incomplete",
                                       "metadata": {"customer": "cus_stub"}}),
                )),
            )
            .route(
                "/v1/customers/cus_declined",
                post(|| async {
                    (
                        axum::http::StatusCode::PAYMENT_REQUIRED,
                        Json(serde_json::json!({"error": {"type": "card_error", "code": "card_declined",
                                                          "message": "Your card was declined."}})),
                    )
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), captured)
    }

    fn stub_adapter(base_url: &str) -> StripePaymentAdapter {
        StripePaymentAdapter::new(StripeConfig::new("sk_test_key", None).with_base_url(base_url))
    }

    #[tokio::test]
    async fn create_payment_method_sends_card_fields() {
        let (base_url, captured) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);
        let card = CardDetails::new("4242424242424242", "8", "2030", "314");

        let pm = adapter.create_payment_method(&card).await.unwrap();

        assert_eq!(pm.id, "pm_stub");
        assert_eq!(pm.last4.as_deref(), Some("4242"));
        let calls = captured.lock().unwrap();
        let (path, form) = &calls[0];
        assert_eq!(path, "payment_methods");
        assert_eq!(form["type"], "card");
        assert_eq!(form["card[number]"], "4242424242424242");
        assert_eq!(form["card[exp_month]"], "8");
        assert_eq!(form["card[exp_year]"], "2030");
        assert_eq!(form["card[cvc]"], "314");
    }

    #[tokio::test]
    async fn create_customer_sends_name_and_description() {
        let (base_url, captured) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);

        let customer = adapter
            .create_customer(CreateCustomerRequest {
                name: "Nick".to_string(),
                description: "Description: Nick".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(customer.id, "cus_stub");
        let calls = captured.lock().unwrap();
        assert_eq!(calls[0].1["name"], "Nick");
        assert_eq!(calls[0].1["description"], "Description: Nick");
    }

    #[tokio::test]
    async fn create_subscription_sends_single_item() {
        let (base_url, captured) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);

        let sub = adapter
            .create_subscription(CreateSubscriptionRequest {
                customer_id: CustomerId::new("cus_stub").unwrap(),
                price_id: PriceId::new("price_standard").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(sub.id, "sub_stub");
        assert_eq!(sub.status, "incomplete");
        let calls = captured.lock().unwrap();
        assert_eq!(calls[0].1["customer"], "cus_stub");
        assert_eq!(calls[0].1["items[0][price]"], "price_standard");
    }

    #[tokio::test]
    async fn create_subscription_without_status_yields_empty_status() {
        let app = Router::new().route(
            "/v1/subscriptions",
            post(|| async { Json(serde_json::json!({"id": "sub_x", "customer": "cus_x"})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let adapter = stub_adapter(&format!("http://{}", addr));

        let sub = adapter
            .create_subscription(CreateSubscriptionRequest {
                customer_id: CustomerId::new("cus_x").unwrap(),
                price_id: PriceId::new("price_standard").unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(sub.id, "sub_x");
        assert_eq!(sub.status, "");
    }

    #[tokio::test]
    async fn update_subscription_metadata_brackets_keys() {
        let (base_url, captured) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);
        let metadata = HashMap::from([("customer".to_string(), "cus_stub".to_string())]);

        let sub = adapter
            .update_subscription_metadata(&SubscriptionId::new("sub_stub").unwrap(), metadata)
            .await
            .unwrap();

        assert_eq!(sub.metadata["customer"], "cus_stub");
        let calls = captured.lock().unwrap();
        assert_eq!(calls[0].0, "subscriptions/sub_stub");
        assert_eq!(calls[0].1["metadata[customer]"], "cus_stub");
    }

    #[tokio::test]
    async fn api_error_envelope_becomes_typed_error() {
        let (base_url, _) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);

        let err = adapter
            .set_default_payment_method(
                &CustomerId::new("cus_declined").unwrap(),
                &PaymentMethodId::new("pm_stub").unwrap(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::CardDeclined);
        assert_eq!(err.provider_code.as_deref(), Some("card_declined"));
    }

    #[tokio::test]
    async fn unknown_route_maps_to_not_found() {
        let (base_url, _) = spawn_stub().await;
        let adapter = stub_adapter(&base_url);

        let err = adapter
            .attach_payment_method(
                &PaymentMethodId::new("pm_stub").unwrap(),
                &CustomerId::new("cus_stub").unwrap(),
            )
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NotFound);
    }
}
