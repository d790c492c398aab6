//! Account endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use peptalk_common::{AccountPayload, AppResult};
use serde::Deserialize;
use validator::Validate;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{self, ApiResponse, Empty},
};

/// Deletion request body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DeleteRequestBody {
    /// Free-text reason shown to support.
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Combined account payload for the account page.
async fn get_account(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<Json<AccountPayload>> {
    let payload = state.account_service.account_payload(user.as_ref()).await?;
    Ok(Json(payload))
}

/// Ask support to delete the account.
async fn delete_request(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Option<Json<DeleteRequestBody>>,
) -> AppResult<ApiResponse<Empty>> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    body.validate()?;

    state
        .account_service
        .request_deletion(&user.id, body.reason)
        .await?;

    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_account))
        .route("/delete-request", post(delete_request))
}
