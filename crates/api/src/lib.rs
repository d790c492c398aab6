//! HTTP API layer for Pep-Talk.
//!
//! - **Endpoints**: account, viewer badges, billing webhook, admin, auth callback
//! - **Extractors**: session user, optional session user, admin gate
//! - **Middleware**: bearer-token session lookup
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
