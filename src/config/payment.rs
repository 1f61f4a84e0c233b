//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Default Stripe API endpoint
pub const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com";

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key
    #[serde(default)]
    pub stripe_api_key: String,

    /// Stripe price ID sold as the `standard` plan
    #[serde(default)]
    pub standard_price_id: String,

    /// Stripe webhook signing secret; signature checks are skipped when unset
    #[serde(default)]
    pub stripe_webhook_secret: Option<String>,

    /// Stripe API base URL (overridable for local stubs)
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_STRIPE_API_BASE_URL.to_string()
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            standard_price_id: String::new(),
            stripe_webhook_secret: None,
            stripe_api_base_url: default_api_base_url(),
        }
    }
}

impl PaymentConfig {
    /// Stripe mode implied by the secret key prefix, for start-up logging
    pub fn stripe_mode(&self) -> &'static str {
        if self.stripe_api_key.starts_with("sk_live_") {
            "live"
        } else if self.stripe_api_key.starts_with("sk_test_") {
            "test"
        } else {
            "unknown"
        }
    }

    /// Whether incoming webhooks must carry a valid signature
    pub fn verifies_webhooks(&self) -> bool {
        self.stripe_webhook_secret
            .as_deref()
            .is_some_and(|secret| !secret.is_empty())
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.standard_price_id.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STANDARD_PRICE_ID"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.standard_price_id.starts_with("price_") {
            return Err(ValidationError::InvalidStripePriceId);
        }
        if let Some(secret) = &self.stripe_webhook_secret {
            if !secret.is_empty() && !secret.starts_with("whsec_") {
                return Err(ValidationError::InvalidStripeWebhookSecret);
            }
        }
        if !self.stripe_api_base_url.starts_with("http://")
            && !self.stripe_api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidStripeBaseUrl);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> PaymentConfig {
        PaymentConfig {
            stripe_api_key: "sk_test_abcd1234".to_string(),
            standard_price_id: "price_standard".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_stripe_mode_from_key_prefix() {
        assert_eq!(valid().stripe_mode(), "test");

        let live = PaymentConfig {
            stripe_api_key: "sk_live_xxx".to_string(),
            ..valid()
        };
        assert_eq!(live.stripe_mode(), "live");

        let other = PaymentConfig {
            stripe_api_key: "sk_xxx".to_string(),
            ..valid()
        };
        assert_eq!(other.stripe_mode(), "unknown");
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(PaymentConfig::default().stripe_api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn test_validation_missing_api_key() {
        let config = PaymentConfig {
            stripe_api_key: String::new(),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"))
        ));
    }

    #[test]
    fn test_validation_missing_price_id() {
        let config = PaymentConfig {
            standard_price_id: String::new(),
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_api_key_prefix() {
        let config = PaymentConfig {
            stripe_api_key: "pk_test_xxx".to_string(), // Publishable key
            ..valid()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidStripeKey)));
    }

    #[test]
    fn test_validation_invalid_price_prefix() {
        let config = PaymentConfig {
            standard_price_id: "prod_123".to_string(),
            ..valid()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidStripePriceId)));
    }

    #[test]
    fn test_webhook_secret_is_optional() {
        let config = valid();
        assert!(config.validate().is_ok());
        assert!(!config.verifies_webhooks());
    }

    #[test]
    fn test_validation_invalid_webhook_secret_prefix() {
        let config = PaymentConfig {
            stripe_webhook_secret: Some("secret_xxx".to_string()),
            ..valid()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidStripeWebhookSecret)
        ));
    }

    #[test]
    fn test_webhook_secret_enables_verification() {
        let config = PaymentConfig {
            stripe_webhook_secret: Some("whsec_xyz789".to_string()),
            ..valid()
        };
        assert!(config.validate().is_ok());
        assert!(config.verifies_webhooks());
    }

    #[test]
    fn test_validation_invalid_base_url() {
        let config = PaymentConfig {
            stripe_api_base_url: "api.stripe.com".to_string(),
            ..valid()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidStripeBaseUrl)));
    }
}
