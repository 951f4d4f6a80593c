//! Relaying requests to remote servers.
//!
//! # Responsibilities
//! - Send the inbound request to a target URL
//! - Strip hop-by-hop headers in both directions
//! - Stream request and response bodies without buffering
//! - Map upstream failures to 502 Bad Gateway, timeouts to 504
//!
//! # Design Decisions
//! - Upstream redirects are relayed to the client, never followed
//! - `Host` is derived from the target URL; the original goes in
//!   `X-Forwarded-Host`

use std::time::{Duration, Instant};

use axum::{
    body::{Body, HttpBody},
    http::{header, HeaderMap, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::config::TimeoutConfig;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

/// HTTP client relaying requests to proxy targets.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: reqwest::Client,
}

impl ProxyClient {
    /// Build a client honouring the configured connect and request timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()?;
        Ok(Self { client })
    }

    /// Relay `request` to `target` and return the upstream response.
    pub async fn relay(&self, target: &str, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let request_id = request.request_id().to_string();
        let (parts, body) = request.into_parts();

        let mut headers = strip_hop_by_hop(&parts.headers);
        if let Some(host) = headers.remove(header::HOST) {
            headers.insert(X_FORWARDED_HOST, host);
        }

        let mut upstream = self
            .client
            .request(parts.method.clone(), target)
            .headers(headers);
        if body.size_hint().exact() != Some(0) {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        match upstream.send().await {
            Ok(response) => {
                let status = response.status();
                tracing::debug!(
                    request_id = %request_id,
                    target = %target,
                    status = %status,
                    "Proxy response received"
                );
                metrics::record_proxy(status.as_u16(), start_time);

                let headers = strip_hop_by_hop(response.headers());
                let mut relayed = Response::new(Body::from_stream(response.bytes_stream()));
                *relayed.status_mut() = status;
                *relayed.headers_mut() = headers;
                relayed
            }
            Err(e) => {
                tracing::error!(
                    request_id = %request_id,
                    target = %target,
                    error = %e,
                    "Proxy request failed"
                );
                metrics::record_proxy_error();
                if e.is_timeout() {
                    (StatusCode::GATEWAY_TIMEOUT, "Upstream request timed out").into_response()
                } else {
                    (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
                }
            }
        }
    }
}

/// Remove hop-by-hop headers, including any named in `Connection`.
fn strip_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let mut out = headers.clone();
    let listed = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok());
    for name in listed {
        out.remove(name);
    }
    for name in &HOP_BY_HOP {
        out.remove(name);
    }
    out
}
