//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (assign request ID)
//!     → filter.rs (evaluate frozen rules)
//!         → forward: rewrite URI, continue
//!         → redirect: 301/302 + Location
//!         → proxy: proxy.rs relays to remote URL
//!     → server.rs pass-through (upstream or 404)
//!     → Send to client
//! ```

pub mod filter;
pub mod proxy;
pub mod request;
pub mod server;

pub use filter::{rewrite_filter, RewriteFilter};
pub use proxy::ProxyClient;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;
