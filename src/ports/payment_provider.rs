//! Payment provider port for external payment processing.
//!
//! Defines the contract for the payment gateway (Stripe). Every identifier the
//! rest of the system stores comes back from one of these calls.
//!
//! # Design
//!
//! - **Provider owns identity**: create calls return the identifiers that
//!   become local primary keys
//! - **Echoing responses**: each call returns the provider's view of the object
//! - **Webhook parsing lives here**: only the adapter knows the event envelope

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::billing::{BillingError, CardDetails};
use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, PaymentMethodId, PriceId, SubscriptionId,
};

/// Port for payment provider integrations.
///
/// The six calls map one-to-one onto the steps of starting a subscription.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Create a card payment method.
    async fn create_payment_method(
        &self,
        card: &CardDetails,
    ) -> Result<ProviderPaymentMethod, PaymentError>;

    /// Create a customer.
    async fn create_customer(
        &self,
        request: CreateCustomerRequest,
    ) -> Result<ProviderCustomer, PaymentError>;

    /// Attach a payment method to a customer.
    async fn attach_payment_method(
        &self,
        payment_method_id: &PaymentMethodId,
        customer_id: &CustomerId,
    ) -> Result<ProviderPaymentMethod, PaymentError>;

    /// Make a payment method the customer's default for invoices.
    async fn set_default_payment_method(
        &self,
        customer_id: &CustomerId,
        payment_method_id: &PaymentMethodId,
    ) -> Result<ProviderCustomer, PaymentError>;

    /// Create a subscription for a customer at a single price.
    async fn create_subscription(
        &self,
        request: CreateSubscriptionRequest,
    ) -> Result<ProviderSubscription, PaymentError>;

    /// Merge metadata into a subscription.
    async fn update_subscription_metadata(
        &self,
        subscription_id: &SubscriptionId,
        metadata: HashMap<String, String>,
    ) -> Result<ProviderSubscription, PaymentError>;

    /// Parse a webhook body into an event.
    ///
    /// `signature` is the raw signature header, if the request carried one.
    /// Whether it is required depends on the adapter's configuration.
    async fn parse_webhook(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookEvent, PaymentError>;
}

/// Request to create a customer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    /// Customer name.
    pub name: String,

    /// Free-text description shown in the provider dashboard.
    pub description: String,
}

/// Request to create a subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub customer_id: CustomerId,
    pub price_id: PriceId,
}

/// Payment method as echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderPaymentMethod {
    /// Provider's payment method ID.
    pub id: String,

    /// Customer the method is attached to, if any.
    pub customer_id: Option<String>,

    /// Card last four digits, if the provider returned them.
    pub last4: Option<String>,
}

/// Customer as echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCustomer {
    /// Provider's customer ID.
    pub id: String,

    pub name: Option<String>,

    pub description: Option<String>,

    /// Invoice default payment method, if set.
    pub default_payment_method: Option<String>,
}

/// Subscription as echoed by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSubscription {
    /// Provider's subscription ID.
    pub id: String,

    /// Provider's customer ID.
    pub customer_id: String,

    /// Lifecycle status string (`incomplete`, `active`, ...).
    pub status: String,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Webhook event from payment provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider.
    pub id: String,

    /// Event type.
    pub event_type: WebhookEventType,

    /// Event payload.
    pub data: WebhookEventData,
}

/// Types of webhook events we distinguish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// `customer.subscription.created`
    SubscriptionCreated,

    /// `customer.subscription.updated`
    SubscriptionUpdated,

    /// Anything else, kept verbatim for logging.
    Unknown(String),
}

impl WebhookEventType {
    /// Map a provider event type string.
    pub fn from_provider(event_type: &str) -> Self {
        match event_type {
            "customer.subscription.created" => WebhookEventType::SubscriptionCreated,
            "customer.subscription.updated" => WebhookEventType::SubscriptionUpdated,
            other => WebhookEventType::Unknown(other.to_string()),
        }
    }

    /// True for the events that carry a subscription status to sync.
    pub fn carries_subscription_status(&self) -> bool {
        matches!(
            self,
            WebhookEventType::SubscriptionCreated | WebhookEventType::SubscriptionUpdated
        )
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookEventType::SubscriptionCreated => write!(f, "customer.subscription.created"),
            WebhookEventType::SubscriptionUpdated => write!(f, "customer.subscription.updated"),
            WebhookEventType::Unknown(other) => write!(f, "{}", other),
        }
    }
}

/// Webhook event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebhookEventData {
    /// Subscription object carried by subscription events.
    #[serde(rename = "subscription")]
    Subscription {
        subscription_id: String,
        customer_id: Option<String>,
        status: String,
    },

    /// Raw/unknown event data.
    #[serde(rename = "raw")]
    Raw { json: String },
}

/// Errors from payment provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentError {
    /// Error code for categorization.
    pub code: PaymentErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Provider's error code (if available).
    pub provider_code: Option<String>,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl PaymentError {
    /// Create a new payment error.
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
            retryable: code.is_retryable(),
        }
    }

    /// Create with provider code.
    pub fn with_provider_code(mut self, code: impl Into<String>) -> Self {
        self.provider_code = Some(code.into());
        self
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    /// Create a generic provider error.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::ProviderError, message)
    }

    /// Create a card declined error.
    pub fn card_declined(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::CardDeclined, message)
    }

    /// Create an invalid webhook payload error.
    pub fn invalid_webhook(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidWebhook, message)
    }

    /// Create an invalid webhook signature error.
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidSignature, message)
    }
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for PaymentError {}

impl From<PaymentError> for DomainError {
    fn from(err: PaymentError) -> Self {
        let code = match err.code {
            PaymentErrorCode::InvalidWebhook => ErrorCode::MalformedWebhook,
            PaymentErrorCode::InvalidSignature => ErrorCode::InvalidWebhookSignature,
            _ => ErrorCode::PaymentProviderError,
        };

        DomainError::new(code, err.message)
    }
}

impl From<PaymentError> for BillingError {
    fn from(err: PaymentError) -> Self {
        match err.code {
            PaymentErrorCode::InvalidWebhook => BillingError::MalformedWebhook(err.message),
            PaymentErrorCode::InvalidSignature => BillingError::InvalidWebhookSignature,
            code => BillingError::PaymentFailed {
                code: code.to_string(),
                reason: err.message,
                retryable: err.retryable,
            },
        }
    }
}

/// Payment error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Card was declined.
    CardDeclined,

    /// Card expired.
    CardExpired,

    /// Invalid card details.
    InvalidCard,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Webhook body is not a valid event.
    InvalidWebhook,

    /// Webhook signature missing or wrong.
    InvalidSignature,

    /// Provider API error.
    ProviderError,
}

impl PaymentErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PaymentErrorCode::NetworkError | PaymentErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentErrorCode::NetworkError => "network_error",
            PaymentErrorCode::AuthenticationError => "authentication_error",
            PaymentErrorCode::CardDeclined => "card_declined",
            PaymentErrorCode::CardExpired => "card_expired",
            PaymentErrorCode::InvalidCard => "invalid_card",
            PaymentErrorCode::NotFound => "not_found",
            PaymentErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            PaymentErrorCode::InvalidWebhook => "invalid_webhook",
            PaymentErrorCode::InvalidSignature => "invalid_signature",
            PaymentErrorCode::ProviderError => "provider_error",
        };
        write!(f, "{}", s)
    }
}
