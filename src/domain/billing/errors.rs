//! Billing-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | MalformedWebhook | 400 |
//! | ValidationFailed | 400 |
//! | InvalidWebhookSignature | 401 |
//! | UnknownPlan | 500 |
//! | PaymentFailed | 500 |
//! | *NotFound | 500 |
//! | Infrastructure | 500 |
//!
//! Lookup misses map to 500 because they mean local state and provider state
//! disagree, not that the caller asked for something absent.

use thiserror::Error;

use crate::domain::foundation::{
    CustomerId, DomainError, ErrorCode, PaymentMethodId, SubscriptionId,
};

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Plan name has no configured price.
    #[error("Unknown price plan '{0}'")]
    UnknownPlan(String),

    /// The payment provider rejected or failed a call.
    ///
    /// `retryable` is set for transient provider failures (network, rate limit).
    #[error("Payment provider call failed ({code}): {reason}")]
    PaymentFailed {
        code: String,
        reason: String,
        retryable: bool,
    },

    #[error("Payment method {0} not found")]
    PaymentMethodNotFound(PaymentMethodId),

    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("Subscription {0} not found")]
    SubscriptionNotFound(SubscriptionId),

    /// Webhook body could not be read as a provider event.
    #[error("Malformed webhook payload: {0}")]
    MalformedWebhook(String),

    /// Webhook signature verification failed.
    #[error("Invalid webhook signature")]
    InvalidWebhookSignature,

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl BillingError {
    pub fn unknown_plan(plan: impl Into<String>) -> Self {
        BillingError::UnknownPlan(plan.into())
    }

    pub fn payment_failed(code: impl Into<String>, reason: impl Into<String>) -> Self {
        BillingError::PaymentFailed {
            code: code.into(),
            reason: reason.into(),
            retryable: false,
        }
    }

    /// Whether repeating the failed call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::PaymentFailed { retryable: true, .. })
    }

    pub fn malformed_webhook(reason: impl Into<String>) -> Self {
        BillingError::MalformedWebhook(reason.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::UnknownPlan(_) => ErrorCode::PlanNotFound,
            BillingError::PaymentFailed { .. } => ErrorCode::PaymentProviderError,
            BillingError::PaymentMethodNotFound(_) => ErrorCode::PaymentMethodNotFound,
            BillingError::CustomerNotFound(_) => ErrorCode::CustomerNotFound,
            BillingError::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            BillingError::MalformedWebhook(_) => ErrorCode::MalformedWebhook,
            BillingError::InvalidWebhookSignature => ErrorCode::InvalidWebhookSignature,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Message safe to return to an HTTP caller.
    ///
    /// Infrastructure and provider details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            BillingError::Infrastructure(_) | BillingError::PaymentFailed { .. } => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed | ErrorCode::EmptyField | ErrorCode::InvalidFormat => {
                let field = err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                BillingError::ValidationFailed {
                    field,
                    message: err.message,
                }
            }
            ErrorCode::MalformedWebhook => BillingError::MalformedWebhook(err.message),
            ErrorCode::InvalidWebhookSignature => BillingError::InvalidWebhookSignature,
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}
