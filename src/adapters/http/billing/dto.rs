//! Request and response types for the billing endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::StartSubscriptionCommand;
use crate::domain::billing::CardDetails;

/// Subscription form as posted by the landing page.
///
/// Every field defaults to empty so a partial form still reaches the
/// provider, which is the one that rejects it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub expiry_month: String,
    #[serde(default)]
    pub expiry_year: String,
    #[serde(default)]
    pub cvc: String,
    #[serde(default)]
    pub price_plan: Option<String>,
}

impl From<SubscriptionForm> for StartSubscriptionCommand {
    fn from(form: SubscriptionForm) -> Self {
        StartSubscriptionCommand {
            name: form.name,
            email: form.email,
            card: CardDetails::new(
                form.card_number,
                form.expiry_month,
                form.expiry_year,
                form.cvc,
            ),
            price_plan: form.price_plan,
        }
    }
}

/// Webhook acknowledgement body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_uses_camel_case_names() {
        let json = r#"{
            "name": "Nick",
            "email": "nick@xyz.com",
            "cardNumber": "4242424242424242",
            "expiryMonth": "8",
            "expiryYear": "2030",
            "cvc": "314",
            "pricePlan": "standard"
        }"#;

        let form: SubscriptionForm = serde_json::from_str(json).unwrap();

        assert_eq!(form.card_number, "4242424242424242");
        assert_eq!(form.expiry_month, "8");
        assert_eq!(form.price_plan.as_deref(), Some("standard"));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let form: SubscriptionForm = serde_json::from_str(r#"{"name":"Nick"}"#).unwrap();

        assert_eq!(form.name, "Nick");
        assert!(form.card_number.is_empty());
        assert!(form.price_plan.is_none());
    }

    #[test]
    fn form_converts_to_command_verbatim() {
        let form = SubscriptionForm {
            name: "Nick".to_string(),
            email: "nick@xyz.com".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            expiry_month: "08".to_string(),
            expiry_year: "30".to_string(),
            cvc: "314".to_string(),
            price_plan: None,
        };

        let cmd = StartSubscriptionCommand::from(form);

        assert_eq!(cmd.card.number(), "4242 4242 4242 4242");
        assert_eq!(cmd.card.exp_month(), "08");
        assert_eq!(cmd.card.exp_year(), "30");
        assert!(cmd.price_plan.is_none());
    }

    #[test]
    fn error_response_serializes_fields() {
        let json = serde_json::to_value(ErrorResponse::new("MALFORMED_WEBHOOK", "bad")).unwrap();
        assert_eq!(json["error_code"], "MALFORMED_WEBHOOK");
        assert_eq!(json["message"], "bad");
    }
}
