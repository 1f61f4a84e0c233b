//! StartSubscriptionHandler - Command handler that takes submitted card details
//! all the way to a provider subscription.
//!
//! Six provider calls run strictly in order, each step feeding identifiers to
//! the next. Rows are written after steps 1, 2 and 5. Nothing is rolled back
//! when a later step fails: earlier rows and provider objects stay behind.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::billing::{
    BillingError, CardDetails, Customer, PaymentMethod, PriceCatalog, Subscription,
    SubscriptionStatus,
};
use crate::domain::foundation::{
    CustomerId, PaymentMethodId, PriceId, SubscriptionId, ValidationError,
};
use crate::ports::{
    CreateCustomerRequest, CreateSubscriptionRequest, CustomerRepository,
    PaymentMethodRepository, PaymentProvider, SubscriptionRepository,
};

/// Metadata key that tags a provider subscription with its customer.
const CUSTOMER_METADATA_KEY: &str = "customer";

/// Command to start a subscription from a submitted form.
#[derive(Debug, Clone)]
pub struct StartSubscriptionCommand {
    pub name: String,
    pub email: String,
    pub card: CardDetails,
    /// Plan name; `None` means the standard plan.
    pub price_plan: Option<String>,
}

/// The six steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStep {
    CreatePaymentMethod,
    CreateCustomer,
    AttachPaymentMethod,
    SetDefaultPaymentMethod,
    CreateSubscription,
    TagSubscription,
}

impl SubscriptionStep {
    /// 1-based position in the sequence.
    pub fn number(&self) -> u8 {
        match self {
            SubscriptionStep::CreatePaymentMethod => 1,
            SubscriptionStep::CreateCustomer => 2,
            SubscriptionStep::AttachPaymentMethod => 3,
            SubscriptionStep::SetDefaultPaymentMethod => 4,
            SubscriptionStep::CreateSubscription => 5,
            SubscriptionStep::TagSubscription => 6,
        }
    }
}

impl fmt::Display for SubscriptionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionStep::CreatePaymentMethod => "create_payment_method",
            SubscriptionStep::CreateCustomer => "create_customer",
            SubscriptionStep::AttachPaymentMethod => "attach_payment_method",
            SubscriptionStep::SetDefaultPaymentMethod => "set_default_payment_method",
            SubscriptionStep::CreateSubscription => "create_subscription",
            SubscriptionStep::TagSubscription => "tag_subscription",
        };
        write!(f, "{}", s)
    }
}

/// Identifiers produced by a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionReceipt {
    pub payment_method_id: PaymentMethodId,
    pub customer_id: CustomerId,
    pub subscription_id: SubscriptionId,
    pub price_id: PriceId,
    pub status: SubscriptionStatus,
}

/// Coarse outcome of the sequence.
///
/// `Failed` carries the step and cause for logs and tests only; callers facing
/// end users should show nothing beyond "it failed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartSubscriptionResult {
    Succeeded(SubscriptionReceipt),
    Failed {
        step: SubscriptionStep,
        error: BillingError,
    },
}

impl StartSubscriptionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, StartSubscriptionResult::Succeeded(_))
    }
}

/// Error tagged with the step that produced it.
struct StepFailure {
    step: SubscriptionStep,
    error: BillingError,
}

trait AtStep<T> {
    fn at(self, step: SubscriptionStep) -> Result<T, StepFailure>;
}

impl<T, E: Into<BillingError>> AtStep<T> for Result<T, E> {
    fn at(self, step: SubscriptionStep) -> Result<T, StepFailure> {
        self.map_err(|e| StepFailure {
            step,
            error: e.into(),
        })
    }
}

/// An identifier the provider returned must be usable as a key.
fn issued<T>(id: Result<T, ValidationError>) -> Result<T, BillingError> {
    id.map_err(|e| BillingError::payment_failed("provider_error", e.to_string()))
}

/// Handler for the subscription sequence.
pub struct StartSubscriptionHandler {
    payment_provider: Arc<dyn PaymentProvider>,
    payment_methods: Arc<dyn PaymentMethodRepository>,
    customers: Arc<dyn CustomerRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    catalog: Arc<PriceCatalog>,
}

impl StartSubscriptionHandler {
    pub fn new(
        payment_provider: Arc<dyn PaymentProvider>,
        payment_methods: Arc<dyn PaymentMethodRepository>,
        customers: Arc<dyn CustomerRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        catalog: Arc<PriceCatalog>,
    ) -> Self {
        Self {
            payment_provider,
            payment_methods,
            customers,
            subscriptions,
            catalog,
        }
    }

    /// Run all six steps. Never returns `Err`: every failure becomes
    /// [`StartSubscriptionResult::Failed`].
    pub async fn handle(&self, cmd: StartSubscriptionCommand) -> StartSubscriptionResult {
        match self.run(cmd).await {
            Ok(receipt) => {
                tracing::info!(
                    customer_id = %receipt.customer_id,
                    subscription_id = %receipt.subscription_id,
                    status = %receipt.status,
                    "Subscription sequence completed"
                );
                StartSubscriptionResult::Succeeded(receipt)
            }
            Err(StepFailure { step, error }) => {
                tracing::warn!(
                    step = %step,
                    step_number = step.number(),
                    error = %error,
                    retryable = error.is_retryable(),
                    "Subscription sequence failed"
                );
                StartSubscriptionResult::Failed { step, error }
            }
        }
    }

    async fn run(&self, cmd: StartSubscriptionCommand) -> Result<SubscriptionReceipt, StepFailure> {
        use SubscriptionStep::*;

        // 1. Create payment method and record it
        let provider_pm = self
            .payment_provider
            .create_payment_method(&cmd.card)
            .await
            .at(CreatePaymentMethod)?;
        let payment_method_id = issued(PaymentMethodId::new(provider_pm.id)).at(CreatePaymentMethod)?;
        let payment_method = PaymentMethod::record(payment_method_id.clone(), cmd.card);
        self.payment_methods
            .save(&payment_method)
            .await
            .at(CreatePaymentMethod)?;
        tracing::info!(
            step = %CreatePaymentMethod,
            payment_method_id = %payment_method_id,
            last4 = payment_method.card.last4(),
            "Payment method created"
        );

        // 2. Create customer referencing the stored payment method
        let stored_pm = self
            .payment_methods
            .find_by_id(&payment_method_id)
            .await
            .at(CreateCustomer)?
            .ok_or_else(|| BillingError::PaymentMethodNotFound(payment_method_id.clone()))
            .at(CreateCustomer)?;
        let provider_customer = self
            .payment_provider
            .create_customer(CreateCustomerRequest {
                description: Customer::provider_description(&cmd.name),
                name: cmd.name.clone(),
            })
            .await
            .at(CreateCustomer)?;
        let customer_id = issued(CustomerId::new(provider_customer.id)).at(CreateCustomer)?;
        let customer = Customer::record(customer_id.clone(), stored_pm.id, cmd.name, cmd.email);
        self.customers.save(&customer).await.at(CreateCustomer)?;
        tracing::info!(
            step = %CreateCustomer,
            customer_id = %customer_id,
            payment_method_id = %payment_method_id,
            "Customer created"
        );

        // 3. Attach payment method to customer
        self.payment_provider
            .attach_payment_method(&payment_method_id, &customer_id)
            .await
            .at(AttachPaymentMethod)?;
        tracing::info!(
            step = %AttachPaymentMethod,
            customer_id = %customer_id,
            payment_method_id = %payment_method_id,
            "Payment method attached"
        );

        // 4. Make it the invoice default
        self.payment_provider
            .set_default_payment_method(&customer_id, &payment_method_id)
            .await
            .at(SetDefaultPaymentMethod)?;
        tracing::info!(
            step = %SetDefaultPaymentMethod,
            customer_id = %customer_id,
            payment_method_id = %payment_method_id,
            "Default payment method set"
        );

        // 5. Resolve price, create subscription, record it
        let price_id = self
            .catalog
            .resolve(cmd.price_plan.as_deref())
            .at(CreateSubscription)?
            .clone();
        let stored_customer = self
            .customers
            .find_by_id(&customer_id)
            .await
            .at(CreateSubscription)?
            .ok_or_else(|| BillingError::CustomerNotFound(customer_id.clone()))
            .at(CreateSubscription)?;
        let provider_sub = self
            .payment_provider
            .create_subscription(CreateSubscriptionRequest {
                customer_id: stored_customer.id.clone(),
                price_id: price_id.clone(),
            })
            .await
            .at(CreateSubscription)?;
        let subscription_id = issued(SubscriptionId::new(provider_sub.id)).at(CreateSubscription)?;
        let subscription = Subscription::record(
            subscription_id.clone(),
            stored_customer.id,
            price_id.clone(),
            SubscriptionStatus::new(provider_sub.status),
        );
        self.subscriptions
            .save(&subscription)
            .await
            .at(CreateSubscription)?;
        tracing::info!(
            step = %CreateSubscription,
            subscription_id = %subscription_id,
            customer_id = %customer_id,
            price_id = %price_id,
            status = %subscription.status,
            "Subscription created"
        );

        // 6. Tag the subscription with its customer
        let metadata = HashMap::from([(CUSTOMER_METADATA_KEY.to_string(), customer_id.to_string())]);
        self.payment_provider
            .update_subscription_metadata(&subscription_id, metadata)
            .await
            .at(TagSubscription)?;
        tracing::info!(
            step = %TagSubscription,
            subscription_id = %subscription_id,
            customer_id = %customer_id,
            "Subscription tagged"
        );

        Ok(SubscriptionReceipt {
            payment_method_id,
            customer_id,
            subscription_id,
            price_id,
            status: subscription.status,
        })
    }
}
