//! Named price plans and their provider price identifiers.

use std::collections::HashMap;

use crate::domain::foundation::PriceId;

use super::BillingError;

/// Plan used when a submission does not name one.
pub const DEFAULT_PLAN: &str = "standard";

/// Lookup table from plan name to provider price.
///
/// Built once from configuration and handed to the orchestrator, so nothing
/// reads pricing from process-wide state.
#[derive(Debug, Clone, Default)]
pub struct PriceCatalog {
    plans: HashMap<String, PriceId>,
}

impl PriceCatalog {
    /// Catalogue with only the `standard` plan, which is all the product sells.
    pub fn standard(price_id: PriceId) -> Self {
        Self::default().with_plan(DEFAULT_PLAN, price_id)
    }

    pub fn with_plan(mut self, name: impl Into<String>, price_id: PriceId) -> Self {
        self.plans.insert(name.into(), price_id);
        self
    }

    /// Resolve a plan name, falling back to [`DEFAULT_PLAN`] only when absent.
    ///
    /// A present name is looked up verbatim, so an empty one is unknown.
    ///
    /// # Errors
    ///
    /// `BillingError::UnknownPlan` when the name is not in the catalogue.
    pub fn resolve(&self, plan: Option<&str>) -> Result<&PriceId, BillingError> {
        let name = plan.unwrap_or(DEFAULT_PLAN);

        self.plans
            .get(name)
            .ok_or_else(|| BillingError::unknown_plan(name))
    }

    pub fn len(&self) -> usize {
        self.plans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn catalog() -> PriceCatalog {
        PriceCatalog::standard(PriceId::new("price_std_123").unwrap())
    }

    #[test]
    fn standard_resolves_to_configured_price() {
        let catalog = catalog();
        assert_eq!(catalog.resolve(Some("standard")).unwrap().as_str(), "price_std_123");
    }

    #[test]
    fn missing_plan_defaults_to_standard() {
        assert_eq!(catalog().resolve(None).unwrap().as_str(), "price_std_123");
    }

    #[test]
    fn empty_plan_is_unknown() {
        let err = catalog().resolve(Some("")).unwrap_err();
        assert_eq!(err, BillingError::UnknownPlan(String::new()));
        assert!(catalog().resolve(Some(" standard ")).is_err());
    }

    #[test]
    fn unknown_plan_is_rejected() {
        let err = catalog().resolve(Some("premium")).unwrap_err();
        assert_eq!(err, BillingError::UnknownPlan("premium".to_string()));
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(catalog().resolve(Some("Standard")).is_err());
    }

    proptest! {
        #[test]
        fn only_standard_is_known(name in "[a-zA-Z]{1,12}") {
            prop_assume!(name != DEFAULT_PLAN);
            prop_assert!(catalog().resolve(Some(&name)).is_err());
        }
    }
}
