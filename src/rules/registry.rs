//! Provider registration and rule aggregation.
//!
//! # Responsibilities
//! - Collect rule sets from independent providers during startup
//! - Flatten them into one ordered list on first read (the freeze point)
//! - Reject registrations after the freeze
//!
//! # Design Decisions
//! - Immutable after the freeze (thread-safe without locks on the read path)
//! - Providers ordered by `order()`, ties in registration order
//! - No deduplication or conflict detection; later rules are simply later
//! - Registration and freeze share one mutex so a late registration can
//!   never land in between

use std::sync::{Mutex, MutexGuard, OnceLock};

use thiserror::Error;

use crate::rules::provider::ProvidesRules;
use crate::rules::{AggregatedRuleSet, RuleSet};

/// Errors raised while registering providers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A provider tried to register after the aggregate was frozen.
    #[error("Rule provider '{provider}' registered after the rule set was frozen")]
    LateRegistration { provider: String },
}

#[derive(Debug)]
struct Registration {
    provider: String,
    order: i32,
    rules: RuleSet,
}

#[derive(Debug, Default)]
struct RegistryState {
    registrations: Vec<Registration>,
    frozen: bool,
}

/// Ordered collection of provider rule sets.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    state: Mutex<RegistryState>,
    snapshot: OnceLock<AggregatedRuleSet>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an anonymous rule set with the default order.
    pub fn register(&self, rules: RuleSet) -> Result<(), RegistryError> {
        self.push("anonymous", 0, rules)
    }

    /// Register a provider's rules under its name and order.
    pub fn register_provider<P>(&self, provider: &P) -> Result<(), RegistryError>
    where
        P: ProvidesRules + ?Sized,
    {
        self.push(provider.name(), provider.order(), provider.rules())
    }

    fn push(&self, provider: &str, order: i32, rules: RuleSet) -> Result<(), RegistryError> {
        let mut state = self.lock();
        if state.frozen {
            tracing::error!(provider = %provider, "Rule provider registered after freeze");
            return Err(RegistryError::LateRegistration {
                provider: provider.to_string(),
            });
        }

        tracing::debug!(
            provider = %provider,
            order,
            rules = rules.len(),
            "Rule provider registered"
        );
        state.registrations.push(Registration {
            provider: provider.to_string(),
            order,
            rules,
        });
        Ok(())
    }

    /// The merged rule list. The first call freezes the registry; every
    /// later call returns the same snapshot.
    pub fn aggregated_rules(&self) -> AggregatedRuleSet {
        self.snapshot.get_or_init(|| self.freeze()).clone()
    }

    /// Whether the aggregate has been frozen.
    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    /// Number of registered providers.
    pub fn provider_count(&self) -> usize {
        self.lock().registrations.len()
    }

    fn freeze(&self) -> AggregatedRuleSet {
        let mut state = self.lock();
        state.frozen = true;

        let mut registrations: Vec<&Registration> = state.registrations.iter().collect();
        // Stable: equal orders keep registration order.
        registrations.sort_by_key(|r| r.order);

        let rules: Vec<_> = registrations
            .iter()
            .flat_map(|r| r.rules.iter().cloned())
            .collect();

        tracing::info!(
            providers = registrations.len(),
            rules = rules.len(),
            order = ?registrations.iter().map(|r| r.provider.as_str()).collect::<Vec<_>>(),
            "Rewrite rules frozen"
        );
        AggregatedRuleSet::new(rules)
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
