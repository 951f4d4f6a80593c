//! Rewrite rule subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (at startup):
//!     RewriteConfig (forwards, proxies, redirects)
//!     → compiler.rs (two rules per entry, deterministic order)
//!     → RuleSet
//!     → registry.rs (one RuleSet per provider)
//!     → Freeze as immutable AggregatedRuleSet
//!
//! Incoming Request (path):
//!     → AggregatedRuleSet::evaluate
//!     → rule.rs (exact or prefixed match)
//!     → Return: Rewrite or None (pass through)
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (equality and prefix checks only)
//! - Deterministic: same input always matches same rule
//! - First match wins (ordered by provider, then category, then key)

pub mod compiler;
pub mod provider;
pub mod registry;
pub mod rule;

use std::sync::Arc;

pub use compiler::compile;
pub use provider::{PropertyRules, ProvidesRules};
pub use registry::{RegistryError, RuleRegistry};
pub use rule::{Action, CompiledRule, Direction, PathPattern, RedirectKind, Rewrite};

/// Ordered rules contributed by one provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<CompiledRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompiledRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Append a rule.
    pub fn push(&mut self, rule: CompiledRule) {
        self.rules.push(rule);
    }
}

impl From<Vec<CompiledRule>> for RuleSet {
    fn from(rules: Vec<CompiledRule>) -> Self {
        Self::new(rules)
    }
}

impl IntoIterator for RuleSet {
    type Item = CompiledRule;
    type IntoIter = std::vec::IntoIter<CompiledRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.into_iter()
    }
}

/// Frozen, flattened rules from every registered provider.
///
/// Cloning shares the same snapshot, so every request task reads the
/// same list without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRuleSet {
    rules: Arc<[CompiledRule]>,
}

impl AggregatedRuleSet {
    pub(crate) fn new(rules: Vec<CompiledRule>) -> Self {
        Self {
            rules: rules.into(),
        }
    }

    /// An aggregate with no rules; every request passes through.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// First inbound rule matching `path`, rendered.
    pub fn evaluate(&self, path: &str) -> Option<Rewrite> {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(Direction::Inbound, path))
    }

    /// Whether two handles share the same frozen snapshot.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.rules, &other.rules)
    }
}

impl Default for AggregatedRuleSet {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_aggregate_never_matches() {
        let rules = AggregatedRuleSet::empty();
        assert!(rules.is_empty());
        assert!(rules.evaluate("/").is_none());
        assert!(rules.evaluate("/anything/at/all").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let rules = AggregatedRuleSet::new(vec![
            CompiledRule::wildcard("/a", Action::Forward, "/first"),
            CompiledRule::wildcard("/a", Action::Proxy, "http://second"),
        ]);

        let hit = rules.evaluate("/a/x").unwrap();
        assert_eq!(hit.action, Action::Forward);
        assert_eq!(hit.destination, "/first/x");
    }

    #[test]
    fn test_shorter_prefix_does_not_shadow_sibling() {
        let mut config = crate::config::schema::RewriteConfig::default();
        config.forwards.insert("/app".into(), "/one".into());
        config.forwards.insert("/application".into(), "/two".into());
        let rules = AggregatedRuleSet::new(compile(&config).into_iter().collect());

        assert_eq!(rules.evaluate("/application/x").unwrap().destination, "/two/x");
        assert_eq!(rules.evaluate("/app/x").unwrap().destination, "/one/x");
    }
}
