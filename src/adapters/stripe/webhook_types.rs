//! Stripe wire types for API responses and webhook payloads.
//!
//! These types represent Stripe objects as they arrive over HTTP. They are
//! deliberately lenient: only the fields this service reads are required.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ports::{
    PaymentError, PaymentErrorCode, ProviderCustomer, ProviderPaymentMethod,
    ProviderSubscription, WebhookEvent, WebhookEventData, WebhookEventType,
};

// ════════════════════════════════════════════════════════════════════════════════
// Signature Parsing
// ════════════════════════════════════════════════════════════════════════════════

/// Error parsing the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureParseError {
    /// Header is empty or missing.
    MissingHeader,
    /// Missing timestamp component (t=...).
    MissingTimestamp,
    /// Missing v1 signature component.
    MissingV1Signature,
    /// Invalid timestamp format.
    InvalidTimestamp,
    /// Invalid signature format (not valid hex).
    InvalidSignatureFormat,
}

impl std::fmt::Display for SignatureParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "Missing Stripe-Signature header"),
            Self::MissingTimestamp => write!(f, "Missing timestamp (t=) in signature"),
            Self::MissingV1Signature => write!(f, "Missing v1 signature in header"),
            Self::InvalidTimestamp => write!(f, "Invalid timestamp format"),
            Self::InvalidSignatureFormat => write!(f, "Invalid signature format (not valid hex)"),
        }
    }
}

impl std::error::Error for SignatureParseError {}

/// Parsed Stripe-Signature header components.
///
/// The header format is `t=timestamp,v1=signature[,v1=signature...]`. Stripe
/// sends several `v1` entries while a signing secret is being rolled.
#[derive(Debug, Clone)]
pub struct SignatureHeader {
    /// Unix timestamp when Stripe signed the event.
    pub timestamp: i64,

    /// v1 signatures (HMAC-SHA256, hex-decoded).
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Parse a Stripe-Signature header into components.
    pub fn parse(header: &str) -> Result<Self, SignatureParseError> {
        if header.trim().is_empty() {
            return Err(SignatureParseError::MissingHeader);
        }

        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureParseError::MissingTimestamp)?;

            match key.trim() {
                "t" => {
                    timestamp = Some(
                        value
                            .trim()
                            .parse()
                            .map_err(|_| SignatureParseError::InvalidTimestamp)?,
                    );
                }
                "v1" => {
                    v1_signatures.push(
                        hex_decode(value.trim())
                            .ok_or(SignatureParseError::InvalidSignatureFormat)?,
                    );
                }
                // v0 and unknown schemes are ignored
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureParseError::MissingTimestamp)?;
        if v1_signatures.is_empty() {
            return Err(SignatureParseError::MissingV1Signature);
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Decode a hex string to bytes.
fn hex_decode(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

/// Encode bytes to hex string.
#[cfg(test)]
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Event Types
// ════════════════════════════════════════════════════════════════════════════════

/// Raw Stripe webhook event as received from the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeWebhookEvent {
    /// Unique event identifier (evt_...).
    #[serde(default)]
    pub id: String,

    /// Event type (e.g., "customer.subscription.updated").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix timestamp when the event was created.
    #[serde(default)]
    pub created: i64,

    /// Event payload containing the affected object.
    #[serde(default)]
    pub data: StripeEventData,

    /// Whether this is a live or test event.
    #[serde(default)]
    pub livemode: bool,
}

/// Event data container.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object affected by this event; `Null` when the event carries none.
    #[serde(default)]
    pub object: serde_json::Value,
}

impl StripeWebhookEvent {
    /// Parse a webhook body.
    pub fn from_slice(payload: &[u8]) -> Result<Self, PaymentError> {
        serde_json::from_slice(payload).map_err(|e| {
            tracing::warn!(error = %e, "Failed to parse webhook payload");
            PaymentError::invalid_webhook(format!("Invalid JSON: {}", e))
        })
    }

    /// Convert into the provider-neutral event.
    ///
    /// Subscription events must carry a subscription object with `id` and
    /// `status`; everything else is passed along as raw JSON.
    pub fn into_webhook_event(self) -> Result<WebhookEvent, PaymentError> {
        let event_type = WebhookEventType::from_provider(&self.event_type);

        let data = if event_type.carries_subscription_status() {
            let sub: StripeSubscription =
                serde_json::from_value(self.data.object).map_err(|e| {
                    PaymentError::invalid_webhook(format!("Invalid subscription: {}", e))
                })?;
            let status = sub.status.ok_or_else(|| {
                PaymentError::invalid_webhook("Invalid subscription: missing field `status`")
            })?;

            WebhookEventData::Subscription {
                subscription_id: sub.id,
                customer_id: sub.customer,
                status,
            }
        } else {
            WebhookEventData::Raw {
                json: self.data.object.to_string(),
            }
        };

        Ok(WebhookEvent {
            id: self.id,
            event_type,
            data,
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Stripe Object Types
// ════════════════════════════════════════════════════════════════════════════════

/// Stripe PaymentMethod object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripePaymentMethod {
    /// Unique identifier (pm_...).
    pub id: String,

    /// Customer the method is attached to.
    pub customer: Option<String>,

    /// Card summary.
    pub card: Option<StripeCard>,
}

/// Card summary embedded in a PaymentMethod.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCard {
    pub brand: Option<String>,
    pub last4: Option<String>,
    pub exp_month: Option<i64>,
    pub exp_year: Option<i64>,
}

impl From<StripePaymentMethod> for ProviderPaymentMethod {
    fn from(pm: StripePaymentMethod) -> Self {
        Self {
            id: pm.id,
            customer_id: pm.customer,
            last4: pm.card.and_then(|card| card.last4),
        }
    }
}

/// Stripe Customer object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeCustomer {
    /// Unique customer identifier (cus_...).
    pub id: String,

    pub name: Option<String>,

    pub description: Option<String>,

    /// Invoice settings, including the default payment method.
    #[serde(default)]
    pub invoice_settings: StripeInvoiceSettings,
}

/// Customer invoice settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StripeInvoiceSettings {
    pub default_payment_method: Option<String>,
}

impl From<StripeCustomer> for ProviderCustomer {
    fn from(customer: StripeCustomer) -> Self {
        Self {
            id: customer.id,
            name: customer.name,
            description: customer.description,
            default_payment_method: customer.invoice_settings.default_payment_method,
        }
    }
}

/// Stripe Subscription object.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeSubscription {
    /// Unique subscription identifier (sub_...).
    pub id: String,

    /// Customer ID owning this subscription.
    pub customer: Option<String>,

    /// Subscription status; absent on some API responses.
    #[serde(default)]
    pub status: Option<String>,

    /// Custom metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl From<StripeSubscription> for ProviderSubscription {
    fn from(sub: StripeSubscription) -> Self {
        Self {
            id: sub.id,
            customer_id: sub.customer.unwrap_or_default(),
            status: sub.status.unwrap_or_default(),
            metadata: sub.metadata,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Envelope
// ════════════════════════════════════════════════════════════════════════════════

/// Body of a non-2xx Stripe response.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorEnvelope {
    pub error: StripeApiError,
}

/// Stripe API error object.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    /// Error category (`card_error`, `invalid_request_error`, ...).
    #[serde(rename = "type")]
    pub error_type: Option<String>,

    /// Machine-readable code (`card_declined`, `incorrect_number`, ...).
    pub code: Option<String>,

    pub message: Option<String>,
}

impl StripeApiError {
    /// Map to a payment error, using the HTTP status when the body is vague.
    pub fn into_payment_error(self, status: u16) -> PaymentError {
        let code = match (self.code.as_deref(), self.error_type.as_deref(), status) {
            (Some("card_declined"), _, _) => PaymentErrorCode::CardDeclined,
            (Some("expired_card"), _, _) => PaymentErrorCode::CardExpired,
            (
                Some(
                    "incorrect_number" | "invalid_number" | "invalid_expiry_month"
                    | "invalid_expiry_year" | "invalid_cvc" | "incorrect_cvc",
                ),
                _,
                _,
            ) => PaymentErrorCode::InvalidCard,
            (Some("resource_missing"), _, _) | (_, _, 404) => PaymentErrorCode::NotFound,
            (_, Some("card_error"), _) => PaymentErrorCode::CardDeclined,
            (_, _, 401) => PaymentErrorCode::AuthenticationError,
            (_, _, 429) => PaymentErrorCode::RateLimitExceeded,
            _ => PaymentErrorCode::ProviderError,
        };

        let message = self
            .message
            .unwrap_or_else(|| format!("Stripe API error (HTTP {})", status));
        let err = PaymentError::new(code, message);

        match self.code {
            Some(provider_code) => err.with_provider_code(provider_code),
            None => err,
        }
    }
}
