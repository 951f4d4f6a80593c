//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the rewrite
//! service. All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Order of the outermost request-wrapping filter slot. Layers with a lower
/// order run before it.
pub const REQUEST_WRAPPER_FILTER_MAX_ORDER: i32 = 0;

/// Default position of the rewrite filter: between the request-wrapping
/// slot (0) and the security slot (-100).
pub const DEFAULT_FILTER_ORDER: i32 = REQUEST_WRAPPER_FILTER_MAX_ORDER - 50;

/// Root configuration for the rewrite service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application every request that is not redirected or proxied ends up
    /// at (pass-through and forwarded requests). Without one, such requests
    /// get a 404.
    pub upstream: Option<String>,

    /// Rewrite rules.
    pub rewrite: RewriteConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Declarative rewrite rules.
///
/// Every map goes from a source path to a destination. `BTreeMap` keeps
/// keys unique and iteration sorted, which fixes compilation order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Position of the rewrite filter in the middleware stack.
    pub filter_order: i32,

    /// Server-side forwards; the client URL does not change.
    pub forwards: BTreeMap<String, String>,

    /// Redirects with code 301.
    pub permanent_redirects: BTreeMap<String, String>,

    /// Redirects with code 302.
    pub temporary_redirects: BTreeMap<String, String>,

    /// Requests served from a remote HTTP/HTTPS server; values are URLs.
    pub proxies: BTreeMap<String, String>,
}

impl RewriteConfig {
    /// Total number of configured entries across all categories.
    pub fn entry_count(&self) -> usize {
        self.forwards.len()
            + self.permanent_redirects.len()
            + self.temporary_redirects.len()
            + self.proxies.len()
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            filter_order: DEFAULT_FILTER_ORDER,
            forwards: BTreeMap::new(),
            permanent_redirects: BTreeMap::new(),
            temporary_redirects: BTreeMap::new(),
            proxies: BTreeMap::new(),
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for proxied requests in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
