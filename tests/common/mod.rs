//! Shared utilities for integration and load testing.

use std::net::SocketAddr;

use axum::{
    http::{HeaderMap, Method, Uri},
    Router,
};
use tokio::net::TcpListener;
use url_rewrite::{Bootstrap, ServiceConfig, Shutdown};

/// Start a backend that echoes `METHOD URI BODY` and reports the
/// `x-forwarded-host` it saw in `x-seen-host`.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new().fallback(
        |method: Method, uri: Uri, headers: HeaderMap, body: String| async move {
            let seen_host = headers
                .get("x-forwarded-host")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("none")
                .to_string();
            (
                [("x-seen-host", seen_host)],
                format!("{} {} {}", method, uri, body).trim_end().to_string(),
            )
        },
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start the rewrite service on an ephemeral port.
pub async fn start_service(mut config: ServiceConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = Bootstrap::new(config).into_server().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    (addr, shutdown)
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
