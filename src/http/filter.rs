//! Rewrite filter middleware.
//! Applies the frozen rule list to every inbound request.

use axum::{
    body::Body,
    extract::State,
    http::{header, uri::PathAndQuery, HeaderValue, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::proxy::ProxyClient;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::rules::{Action, AggregatedRuleSet, RedirectKind};

/// State shared by every invocation of the filter.
///
/// The rule list is handed in at construction; the filter never looks it
/// up anywhere else, and never changes it.
#[derive(Debug, Clone)]
pub struct RewriteFilter {
    rules: AggregatedRuleSet,
    proxy: ProxyClient,
}

impl RewriteFilter {
    pub fn new(rules: AggregatedRuleSet, proxy: ProxyClient) -> Self {
        Self { rules, proxy }
    }

    pub fn rules(&self) -> &AggregatedRuleSet {
        &self.rules
    }
}

/// Middleware function: forward, redirect, proxy, or pass through.
pub async fn rewrite_filter(
    State(filter): State<RewriteFilter>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(rewrite) = filter.rules.evaluate(request.uri().path()) else {
        metrics::record_passthrough();
        return next.run(request).await;
    };

    tracing::debug!(
        request_id = %request.request_id(),
        path = %request.uri().path(),
        action = %rewrite.action,
        destination = %rewrite.destination,
        "Rewrite rule matched"
    );
    metrics::record_rewrite(rewrite.action);

    let target = with_query(&rewrite.destination, request.uri().query());
    match rewrite.action {
        Action::Forward => match forwarded_uri(request.uri(), &target) {
            Some(uri) => {
                *request.uri_mut() = uri;
                next.run(request).await
            }
            None => {
                tracing::error!(
                    request_id = %request.request_id(),
                    destination = %target,
                    "Forward destination is not a valid URI"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid forward destination").into_response()
            }
        },
        Action::Redirect(kind) => redirect(kind, &target),
        Action::Proxy => filter.proxy.relay(&target, request).await,
    }
}

/// Append the original query string to a destination.
pub(crate) fn with_query(destination: &str, query: Option<&str>) -> String {
    match query {
        Some(query) if !query.is_empty() => {
            let separator = if destination.contains('?') { '&' } else { '?' };
            format!("{destination}{separator}{query}")
        }
        _ => destination.to_string(),
    }
}

fn forwarded_uri(original: &Uri, path_and_query: &str) -> Option<Uri> {
    let mut parts = original.clone().into_parts();
    parts.path_and_query = Some(path_and_query.parse::<PathAndQuery>().ok()?);
    Uri::from_parts(parts).ok()
}

fn redirect(kind: RedirectKind, location: &str) -> Response {
    let status = StatusCode::from_u16(kind.status_code()).unwrap_or(StatusCode::FOUND);
    match HeaderValue::from_str(location) {
        Ok(value) => (status, [(header::LOCATION, value)]).into_response(),
        Err(_) => {
            tracing::error!(location = %location, "Redirect location is not a valid header value");
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid redirect location").into_response()
        }
    }
}
