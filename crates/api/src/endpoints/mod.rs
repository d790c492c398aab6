//! API endpoints.

mod account;
mod admin;
mod auth;
mod billing;
mod viewer;

use axum::{Router, middleware};

use crate::middleware::{AppState, auth_middleware};

/// Create the API router.
///
/// Session lookup runs only on routes that read the viewer; the billing
/// webhook carries its own shared-secret `Authorization` header.
pub fn router(state: AppState) -> Router<AppState> {
    let session_routes = Router::new()
        .nest("/account", account::router())
        .nest("/viewer", viewer::router())
        .nest("/admin", admin::router())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .merge(session_routes)
        .nest("/auth", auth::router())
        .nest("/billing", billing::router())
}
