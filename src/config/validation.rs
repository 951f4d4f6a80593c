//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check rule sources are plain absolute paths
//! - Check destinations fit their category (local path, absolute URL)
//! - Validate listener and upstream addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::http::{uri::PathAndQuery, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::{RewriteConfig, ServiceConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{category}: source path must not be empty")]
    EmptySource { category: &'static str },

    #[error("{category}: source '{path}' must start with '/'")]
    RelativeSource { category: &'static str, path: String },

    #[error("{category}: source '{path}' must not contain path parameters")]
    ParameterizedSource { category: &'static str, path: String },

    #[error("{category}: destination for '{path}' must not be empty")]
    EmptyDestination { category: &'static str, path: String },

    #[error("forwards: destination '{destination}' for '{path}' must be a local path")]
    NonLocalForward { path: String, destination: String },

    #[error("forwards: destination '{destination}' for '{path}' is not a valid request path")]
    InvalidForward { path: String, destination: String },

    #[error("{category}: destination '{destination}' for '{path}' is not a valid Location header")]
    InvalidRedirectLocation {
        category: &'static str,
        path: String,
        destination: String,
    },

    #[error("proxies: destination '{destination}' for '{path}' must be an absolute http(s) URL")]
    InvalidProxyUrl { path: String, destination: String },

    #[error("listener: invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("upstream: '{0}' must be an absolute http(s) URL")]
    InvalidUpstream(String),
}

/// Validate a whole service configuration.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(upstream) = &config.upstream {
        if !is_http_url(upstream) {
            errors.push(ValidationError::InvalidUpstream(upstream.clone()));
        }
    }

    if let Err(rule_errors) = validate_rules(&config.rewrite) {
        errors.extend(rule_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate the rewrite rules alone.
pub fn validate_rules(config: &RewriteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_entries(&mut errors, "forwards", &config.forwards);
    check_entries(&mut errors, "proxies", &config.proxies);
    check_entries(&mut errors, "permanent_redirects", &config.permanent_redirects);
    check_entries(&mut errors, "temporary_redirects", &config.temporary_redirects);

    for (source, destination) in &config.forwards {
        if destination.is_empty() {
            continue;
        }
        if !destination.starts_with('/') {
            errors.push(ValidationError::NonLocalForward {
                path: source.clone(),
                destination: destination.clone(),
            });
        } else if !renders_valid(destination, |d| d.parse::<PathAndQuery>().is_ok()) {
            errors.push(ValidationError::InvalidForward {
                path: source.clone(),
                destination: destination.clone(),
            });
        }
    }

    for (category, entries) in [
        ("permanent_redirects", &config.permanent_redirects),
        ("temporary_redirects", &config.temporary_redirects),
    ] {
        for (source, destination) in entries {
            if !destination.is_empty()
                && !renders_valid(destination, |d| HeaderValue::from_str(d).is_ok())
            {
                errors.push(ValidationError::InvalidRedirectLocation {
                    category,
                    path: source.clone(),
                    destination: destination.clone(),
                });
            }
        }
    }

    for (source, destination) in &config.proxies {
        if !destination.is_empty() && !is_http_url(destination) {
            errors.push(ValidationError::InvalidProxyUrl {
                path: source.clone(),
                destination: destination.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_entries(
    errors: &mut Vec<ValidationError>,
    category: &'static str,
    entries: &BTreeMap<String, String>,
) {
    for (source, destination) in entries {
        if source.is_empty() {
            errors.push(ValidationError::EmptySource { category });
        } else if !source.starts_with('/') {
            errors.push(ValidationError::RelativeSource {
                category,
                path: source.clone(),
            });
        } else if source.contains(['{', '}']) {
            errors.push(ValidationError::ParameterizedSource {
                category,
                path: source.clone(),
            });
        }

        if destination.is_empty() {
            errors.push(ValidationError::EmptyDestination {
                category,
                path: source.clone(),
            });
        }
    }
}

/// Both renderings of a destination (exact and with a captured suffix)
/// must pass `check`.
fn renders_valid(destination: &str, check: impl Fn(&str) -> bool) -> bool {
    check(destination) && check(&format!("{destination}/x"))
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ServiceConfig::default()).is_ok());
    }

    #[test]
    fn test_valid_rules() {
        let mut config = RewriteConfig::default();
        config.forwards.insert("/old".into(), "/new".into());
        config
            .proxies
            .insert("/api".into(), "https://backend.example.com".into());
        config
            .permanent_redirects
            .insert("/legacy".into(), "https://example.com/current".into());
        config.temporary_redirects.insert("/promo".into(), "/sale".into());

        assert!(validate_rules(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RewriteConfig::default();
        config.forwards.insert("relative".into(), "/ok".into());
        config.forwards.insert("/remote".into(), "http://elsewhere".into());
        config.proxies.insert("/api".into(), "not a url".into());
        config.proxies.insert("/ftp".into(), "ftp://files.example.com".into());
        config.temporary_redirects.insert("/a/{id}".into(), "/b".into());
        config.permanent_redirects.insert("".into(), "".into());

        let errors = validate_rules(&config).unwrap_err();
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&ValidationError::RelativeSource {
            category: "forwards",
            path: "relative".into(),
        }));
        assert!(errors.contains(&ValidationError::NonLocalForward {
            path: "/remote".into(),
            destination: "http://elsewhere".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidProxyUrl {
            path: "/ftp".into(),
            destination: "ftp://files.example.com".into(),
        }));
        assert!(errors.contains(&ValidationError::ParameterizedSource {
            category: "temporary_redirects",
            path: "/a/{id}".into(),
        }));
        assert!(errors.contains(&ValidationError::EmptySource {
            category: "permanent_redirects",
        }));
    }

    #[test]
    fn test_unusable_forward_destination_rejected() {
        let mut config = RewriteConfig::default();
        config.forwards.insert("/old".into(), "/new page".into());
        config.forwards.insert("/ok".into(), "/fine?x=1".into());

        let errors = validate_rules(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::InvalidForward {
                path: "/old".into(),
                destination: "/new page".into(),
            }]
        );
    }

    #[test]
    fn test_unusable_redirect_location_rejected() {
        let mut config = RewriteConfig::default();
        config
            .permanent_redirects
            .insert("/legacy".into(), "/caf\u{e9}".into());
        config
            .temporary_redirects
            .insert("/promo".into(), "/sale\nnext".into());
        config
            .temporary_redirects
            .insert("/spaced".into(), "/with space".into());

        let errors = validate_rules(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&ValidationError::InvalidRedirectLocation {
            category: "permanent_redirects",
            path: "/legacy".into(),
            destination: "/caf\u{e9}".into(),
        }));
        assert!(errors.contains(&ValidationError::InvalidRedirectLocation {
            category: "temporary_redirects",
            path: "/promo".into(),
            destination: "/sale\nnext".into(),
        }));
    }

    #[test]
    fn test_listener_and_upstream() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.upstream = Some("localhost:3000".into());

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBindAddress("nowhere".into()),
                ValidationError::InvalidUpstream("localhost:3000".into()),
            ]
        );
    }

    #[test]
    fn test_error_display() {
        let err = ValidationError::InvalidProxyUrl {
            path: "/api".into(),
            destination: "nope".into(),
        };
        assert_eq!(
            err.to_string(),
            "proxies: destination 'nope' for '/api' must be an absolute http(s) URL"
        );
    }
}
