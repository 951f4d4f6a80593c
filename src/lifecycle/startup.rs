//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate the rewrite rules
//! - Register the configured rules and any programmatic providers
//! - Freeze the aggregate and hand it to the HTTP server
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The configured rules are registered first; extra providers follow
//!   in the order they were added (subject to their `order()`)

use crate::config::validation::validate_rules;
use crate::config::{ConfigError, ServiceConfig};
use crate::error::StartupError;
use crate::http::HttpServer;
use crate::rules::{AggregatedRuleSet, PropertyRules, ProvidesRules, RuleRegistry};

/// Builder taking a validated config to a ready-to-run server.
pub struct Bootstrap {
    config: ServiceConfig,
    providers: Vec<Box<dyn ProvidesRules>>,
}

impl Bootstrap {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            providers: Vec::new(),
        }
    }

    /// Add a rule provider beside the configured rules.
    pub fn with_provider(mut self, provider: impl ProvidesRules + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Compile, register and freeze every provider's rules.
    pub fn build_rules(&self) -> Result<AggregatedRuleSet, StartupError> {
        validate_rules(&self.config.rewrite).map_err(ConfigError::Validation)?;

        let registry = RuleRegistry::new();
        registry.register_provider(&PropertyRules::new(&self.config.rewrite))?;
        for provider in &self.providers {
            registry.register_provider(provider.as_ref())?;
        }

        Ok(registry.aggregated_rules())
    }

    /// Build the HTTP server around the frozen rules.
    pub fn into_server(self) -> Result<HttpServer, StartupError> {
        let rules = self.build_rules()?;
        HttpServer::new(self.config, rules)
    }
}
