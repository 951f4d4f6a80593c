//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → rules compiled once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload, since the
//!   compiled rule list is frozen before traffic starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::RewriteConfig;
pub use schema::ServiceConfig;
pub use schema::TimeoutConfig;
