//! Compiled rule types and path evaluation.
//!
//! # Responsibilities
//! - Describe one path pattern bound to one action
//! - Evaluate a request path against a rule
//! - Render the destination for a match
//!
//! # Design Decisions
//! - Only the two pattern shapes the compiler emits are supported
//! - Exact matching is case-sensitive (paths are case-sensitive)
//! - The wildcard capture is substituted verbatim, exactly once
//! - No regex: matching is a string comparison plus one prefix check

use std::fmt;

use serde::Serialize;

/// Name of the wildcard capture in rendered patterns.
pub const PATH_CAPTURE: &str = "path";

/// Which way a rule applies.
///
/// The compiler only emits `Inbound` rules and the filter only evaluates
/// inbound traffic. `Outbound` is reserved for response rewriting, which
/// is not implemented; a rule carrying it never matches a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Requests entering the service.
    Inbound,
    /// Responses leaving the service (reserved).
    Outbound,
}

/// Redirect flavour, which decides the status code sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectKind {
    /// 301 Moved Permanently.
    Permanent,
    /// 302 Found.
    Temporary,
}

impl RedirectKind {
    /// HTTP status code for this redirect.
    pub fn status_code(self) -> u16 {
        match self {
            RedirectKind::Permanent => 301,
            RedirectKind::Temporary => 302,
        }
    }
}

/// What happens to a request once a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "kind")]
pub enum Action {
    /// Server-side dispatch to another local path.
    Forward,
    /// Client-visible redirect.
    Redirect(RedirectKind),
    /// Relay to a remote URL.
    Proxy,
}

impl Action {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Forward => "forward",
            Action::Redirect(RedirectKind::Permanent) => "permanent_redirect",
            Action::Redirect(RedirectKind::Temporary) => "temporary_redirect",
            Action::Proxy => "proxy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A path-match expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPattern {
    /// Matches the path exactly.
    Exact(String),
    /// Matches `prefix/<anything>`, capturing `<anything>` (possibly empty,
    /// possibly containing further `/`).
    Prefixed { prefix: String },
}

impl PathPattern {
    /// Match a path, returning the captured suffix for prefixed patterns
    /// (`""` for exact matches).
    pub fn capture<'a>(&self, path: &'a str) -> Option<&'a str> {
        match self {
            PathPattern::Exact(expected) => (path == expected.as_str()).then_some(""),
            PathPattern::Prefixed { prefix } => path
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('/')),
        }
    }

    /// The literal source path this pattern was built from.
    pub fn source(&self) -> &str {
        match self {
            PathPattern::Exact(path) => path,
            PathPattern::Prefixed { prefix } => prefix,
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPattern::Exact(path) => f.write_str(path),
            PathPattern::Prefixed { prefix } => write!(f, "{prefix}/{{{PATH_CAPTURE}}}"),
        }
    }
}

impl Serialize for PathPattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Destination of a rule, optionally followed by the captured suffix.
///
/// The base is kept apart from the capture slot, so a `{path}` that appears
/// in the configured destination itself is never substituted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DestinationTemplate {
    base: String,
    append_capture: bool,
}

impl DestinationTemplate {
    /// A destination used as-is.
    pub fn literal(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            append_capture: false,
        }
    }

    /// A destination rendered as `base/<captured>`.
    pub fn with_capture(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            append_capture: true,
        }
    }

    /// Render the destination for a captured suffix.
    pub fn render(&self, captured: &str) -> String {
        if self.append_capture {
            let mut out = String::with_capacity(self.base.len() + 1 + captured.len());
            out.push_str(&self.base);
            out.push('/');
            out.push_str(captured);
            out
        } else {
            self.base.clone()
        }
    }
}

impl fmt::Display for DestinationTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.append_capture {
            write!(f, "{}/{{{PATH_CAPTURE}}}", self.base)
        } else {
            f.write_str(&self.base)
        }
    }
}

impl Serialize for DestinationTemplate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One path pattern bound to one action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CompiledRule {
    pub pattern: PathPattern,
    pub action: Action,
    pub destination: DestinationTemplate,
    pub direction: Direction,
}

impl CompiledRule {
    /// Rule matching `source` exactly.
    pub fn exact(source: &str, action: Action, destination: &str) -> Self {
        Self {
            pattern: PathPattern::Exact(source.to_string()),
            action,
            destination: DestinationTemplate::literal(destination),
            direction: Direction::Inbound,
        }
    }

    /// Rule matching `source/{path}` and appending the capture to `destination`.
    pub fn wildcard(source: &str, action: Action, destination: &str) -> Self {
        Self {
            pattern: PathPattern::Prefixed {
                prefix: source.to_string(),
            },
            action,
            destination: DestinationTemplate::with_capture(destination),
            direction: Direction::Inbound,
        }
    }

    /// Evaluate this rule for a request path travelling in `direction`.
    pub fn evaluate(&self, direction: Direction, path: &str) -> Option<Rewrite> {
        if direction != self.direction {
            return None;
        }
        self.pattern.capture(path).map(|captured| Rewrite {
            action: self.action,
            destination: self.destination.render(captured),
        })
    }
}

impl fmt::Display for CompiledRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} {}", self.pattern, self.action, self.destination)
    }
}

/// Outcome of a matching rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub action: Action,
    pub destination: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_rule() {
        let rule = CompiledRule::exact("/old", Action::Forward, "/new");

        let hit = rule.evaluate(Direction::Inbound, "/old").unwrap();
        assert_eq!(hit.action, Action::Forward);
        assert_eq!(hit.destination, "/new");

        assert!(rule.evaluate(Direction::Inbound, "/old/").is_none());
        assert!(rule.evaluate(Direction::Inbound, "/OLD").is_none()); // Case sensitive
        assert!(rule.evaluate(Direction::Inbound, "/older").is_none());
    }

    #[test]
    fn test_wildcard_rule() {
        let rule = CompiledRule::wildcard("/old", Action::Forward, "/new");

        let hit = rule.evaluate(Direction::Inbound, "/old/abc/def").unwrap();
        assert_eq!(hit.destination, "/new/abc/def");

        // Empty capture still matches
        let hit = rule.evaluate(Direction::Inbound, "/old/").unwrap();
        assert_eq!(hit.destination, "/new/");

        assert!(rule.evaluate(Direction::Inbound, "/old").is_none());
        assert!(rule.evaluate(Direction::Inbound, "/older/abc").is_none());
    }

    #[test]
    fn test_outbound_never_matches() {
        let rule = CompiledRule::exact("/old", Action::Proxy, "http://backend");
        assert_eq!(rule.direction, Direction::Inbound);
        assert!(rule.evaluate(Direction::Outbound, "/old").is_none());

        let reserved = CompiledRule {
            direction: Direction::Outbound,
            ..rule
        };
        assert!(reserved.evaluate(Direction::Inbound, "/old").is_none());
    }

    #[test]
    fn test_capture_token_in_destination_is_literal() {
        let rule = CompiledRule::wildcard("/a", Action::Forward, "/b/{path}");

        let hit = rule.evaluate(Direction::Inbound, "/a/x").unwrap();
        assert_eq!(hit.destination, "/b/{path}/x");
        assert_eq!(rule.destination.to_string(), "/b/{path}/{path}");
    }

    #[test]
    fn test_display() {
        let rule = CompiledRule::wildcard(
            "/api",
            Action::Proxy,
            "https://backend.example.com",
        );
        assert_eq!(
            rule.to_string(),
            "/api/{path} -> proxy https://backend.example.com/{path}"
        );
    }

    #[test]
    fn test_redirect_status_codes() {
        assert_eq!(RedirectKind::Permanent.status_code(), 301);
        assert_eq!(RedirectKind::Temporary.status_code(), 302);
    }
}
