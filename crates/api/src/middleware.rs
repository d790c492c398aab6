//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use peptalk_core::{AccountService, BillingService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Session, plan, account payload and deletion requests.
    pub account_service: AccountService,
    /// Webhook sync and admin billing overview.
    pub billing_service: BillingService,
}

/// Session middleware.
///
/// Resolves `Authorization: Bearer <token>` to a [`peptalk_common::SessionUser`]
/// request extension. Unknown tokens leave the request anonymous; a failed
/// lookup fails the request.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToString::to_string);

    if let Some(token) = token {
        match state.account_service.session_for_token(&token).await {
            Ok(Some(user)) => {
                req.extensions_mut().insert(user);
            }
            Ok(None) => {
                tracing::debug!("Unknown session token, continuing anonymously");
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}
