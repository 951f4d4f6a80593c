//! URL rewriting front service.
//!
//! Compiles declarative forward, redirect and proxy rules into an ordered
//! rule list at startup, freezes the rules contributed by every provider
//! into one snapshot, and applies that snapshot to each inbound request.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod rules;

pub use config::schema::ServiceConfig;
pub use error::StartupError;
pub use http::HttpServer;
pub use lifecycle::{Bootstrap, Shutdown};
pub use rules::{compile, AggregatedRuleSet, ProvidesRules, RuleRegistry, RuleSet};
