//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the pass-through handler
//! - Wire up middleware (tracing, request ID, timeout, rewrite filter)
//! - Position the rewrite filter according to `filter_order`
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::{ServiceConfig, REQUEST_WRAPPER_FILTER_MAX_ORDER};
use crate::error::StartupError;
use crate::http::filter::{rewrite_filter, with_query, RewriteFilter};
use crate::http::proxy::ProxyClient;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::rules::AggregatedRuleSet;

/// State for requests that reach the application.
#[derive(Debug, Clone)]
pub struct PassThrough {
    pub upstream: Option<String>,
    pub proxy: ProxyClient,
}

/// HTTP server hosting the rewrite filter.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and the frozen
    /// rule list.
    pub fn new(config: ServiceConfig, rules: AggregatedRuleSet) -> Result<Self, StartupError> {
        let proxy = ProxyClient::new(&config.timeouts)?;

        tracing::info!(
            rules = rules.len(),
            filter_order = config.rewrite.filter_order,
            upstream = ?config.upstream,
            "Rewrite filter configured"
        );

        let filter = RewriteFilter::new(rules, proxy.clone());
        let state = PassThrough {
            upstream: config.upstream.clone(),
            proxy,
        };

        let router = Self::build_router(&config, filter, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID, tracing, response ID, then the rewrite
    /// filter and the request timeout in `filter_order`.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, filter: RewriteFilter, state: PassThrough) -> Router {
        let timeout = TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs));
        let rewrite = middleware::from_fn_with_state(filter, rewrite_filter);

        let app = Router::new().fallback(pass_through).with_state(state);
        let app = if config.rewrite.filter_order < REQUEST_WRAPPER_FILTER_MAX_ORDER {
            app.layer(timeout).layer(rewrite)
        } else {
            app.layer(rewrite).layer(timeout)
        };

        app.layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The assembled router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Requests no rule redirected or proxied: relay to the upstream, if any.
async fn pass_through(State(state): State<PassThrough>, request: Request<Body>) -> Response {
    match &state.upstream {
        Some(upstream) => {
            let base = format!(
                "{}{}",
                upstream.trim_end_matches('/'),
                request.uri().path()
            );
            let target = with_query(&base, request.uri().query());
            state.proxy.relay(&target, request).await
        }
        None => {
            tracing::debug!(
                request_id = %request.request_id(),
                path = %request.uri().path(),
                "No upstream configured"
            );
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{PropertyRules, RuleRegistry};
    use axum::http::header;
    use tower::ServiceExt;

    fn server(config: ServiceConfig) -> HttpServer {
        let registry = RuleRegistry::new();
        registry
            .register_provider(&PropertyRules::new(&config.rewrite))
            .unwrap();
        HttpServer::new(config, registry.aggregated_rules()).unwrap()
    }

    async fn get(router: Router, uri: &str) -> Response {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_no_upstream_is_not_found() {
        let res = get(server(ServiceConfig::default()).router(), "/anything").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(res.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_redirect_in_either_filter_position() {
        for filter_order in [-50, 10] {
            let mut config = ServiceConfig::default();
            config.rewrite.filter_order = filter_order;
            config.rewrite.temporary_redirects.insert("/a".into(), "/b".into());

            let res = get(server(config).router(), "/a/c").await;
            assert_eq!(res.status(), StatusCode::FOUND);
            assert_eq!(res.headers()[header::LOCATION], "/b/c");
            assert!(res.headers().contains_key("x-request-id"));
        }
    }

    #[tokio::test]
    async fn test_client_request_id_is_kept() {
        let res = server(ServiceConfig::default())
            .router()
            .oneshot(
                Request::builder()
                    .uri("/x")
                    .header("x-request-id", "client-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.headers()["x-request-id"], "client-id");
    }
}
