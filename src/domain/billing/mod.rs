//! Billing domain module.
//!
//! Local records of what the payment provider created for a customer.
//!
//! # Module Structure
//!
//! - `payment_method` - Card details and the PaymentMethod entity
//! - `customer` - Customer entity (references one PaymentMethod)
//! - `subscription` - Subscription entity and its free-text status
//! - `price_plan` - Plan name to provider price lookup
//! - `errors` - BillingError

mod customer;
mod errors;
mod payment_method;
mod price_plan;
mod subscription;

pub use customer::Customer;
pub use errors::BillingError;
pub use payment_method::{CardDetails, PaymentMethod};
pub use price_plan::{PriceCatalog, DEFAULT_PLAN};
pub use subscription::{Subscription, SubscriptionStatus};
