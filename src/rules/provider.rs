//! Rule providers.
//!
//! A provider is any source that contributes a [`RuleSet`] to the registry:
//! the statically configured rules, or rules assembled in code by the
//! embedding application.

use crate::config::schema::RewriteConfig;
use crate::rules::compiler::compile;
use crate::rules::RuleSet;

/// A source of compiled rules.
pub trait ProvidesRules: Send + Sync {
    /// Provider name for logging and error reporting.
    fn name(&self) -> &str;

    /// Position among providers; lower comes first. Ties keep registration
    /// order.
    fn order(&self) -> i32 {
        0
    }

    /// The rules this provider contributes.
    fn rules(&self) -> RuleSet;
}

/// Rules declared in the service configuration.
#[derive(Debug, Clone)]
pub struct PropertyRules {
    rules: RuleSet,
}

impl PropertyRules {
    pub const NAME: &'static str = "property-rules";

    /// Compile the configured rules.
    pub fn new(config: &RewriteConfig) -> Self {
        Self {
            rules: compile(config),
        }
    }
}

impl ProvidesRules for PropertyRules {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn rules(&self) -> RuleSet {
        self.rules.clone()
    }
}

impl ProvidesRules for RuleSet {
    fn name(&self) -> &str {
        "anonymous"
    }

    fn rules(&self) -> RuleSet {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_rules_compile_config() {
        let mut config = RewriteConfig::default();
        config.forwards.insert("/old".into(), "/new".into());

        let provider = PropertyRules::new(&config);
        assert_eq!(provider.name(), "property-rules");
        assert_eq!(provider.order(), 0);
        assert_eq!(provider.rules().len(), 2);
    }
}
