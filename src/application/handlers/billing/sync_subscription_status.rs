//! SyncSubscriptionStatusHandler - Applies provider webhook events to stored
//! subscriptions.
//!
//! Only `customer.subscription.created` and `customer.subscription.updated`
//! change state. The status is overwritten with whatever the provider sent,
//! so replays and out-of-order deliveries converge on the last one applied.

use std::sync::Arc;

use crate::domain::billing::{BillingError, SubscriptionStatus};
use crate::domain::foundation::{SubscriptionId, Timestamp};
use crate::ports::{PaymentProvider, SubscriptionRepository, WebhookEventData};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct SyncSubscriptionStatusCommand {
    /// Raw request body, byte for byte.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value, if present.
    pub signature: Option<String>,
}

/// Result of processing a webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSubscriptionStatusResult {
    /// A stored subscription now carries the event's status.
    StatusUpdated {
        subscription_id: SubscriptionId,
        status: SubscriptionStatus,
    },
    /// The event type does not affect stored state.
    Ignored { event_type: String },
}

/// Handler for subscription webhook events.
pub struct SyncSubscriptionStatusHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl SyncSubscriptionStatusHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        subscriptions: Arc<dyn SubscriptionRepository>,
    ) -> Self {
        Self {
            payment_provider,
            subscriptions,
        }
    }

    pub async fn handle(
        &self,
        cmd: SyncSubscriptionStatusCommand,
    ) -> Result<SyncSubscriptionStatusResult, BillingError> {
        let event = self
            .payment_provider
            .parse_webhook(&cmd.payload, cmd.signature.as_deref())
            .await?;

        if !event.event_type.carries_subscription_status() {
            tracing::debug!(
                event_id = %event.id,
                event_type = %event.event_type,
                "Ignoring webhook event"
            );
            return Ok(SyncSubscriptionStatusResult::Ignored {
                event_type: event.event_type.to_string(),
            });
        }

        let (subscription_id, status) = match event.data {
            WebhookEventData::Subscription {
                subscription_id,
                status,
                ..
            } => (subscription_id, status),
            WebhookEventData::Raw { .. } => {
                return Err(BillingError::malformed_webhook(format!(
                    "{} event without a subscription object",
                    event.event_type
                )));
            }
        };

        let subscription_id = SubscriptionId::new(subscription_id)
            .map_err(|_| BillingError::malformed_webhook("Subscription id is empty"))?;

        let mut subscription = self
            .subscriptions
            .find_by_id(&subscription_id)
            .await?
            .ok_or_else(|| BillingError::SubscriptionNotFound(subscription_id.clone()))?;

        let previous = subscription.status.clone();
        subscription.apply_status(SubscriptionStatus::new(status), Timestamp::now());
        self.subscriptions.update_status(&subscription).await?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            subscription_id = %subscription_id,
            previous_status = %previous,
            status = %subscription.status,
            "Subscription status synced"
        );

        Ok(SyncSubscriptionStatusResult::StatusUpdated {
            subscription_id,
            status: subscription.status,
        })
    }
}
