//! Viewer endpoint for navigation badges.

use axum::{Router, extract::State, routing::get};
use peptalk_common::AppResult;
use serde::Serialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Viewer flags.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerResponse {
    pub is_authed: bool,
    pub is_pro: bool,
    pub is_admin: bool,
}

async fn get_viewer(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
) -> AppResult<ApiResponse<ViewerResponse>> {
    let viewer = state.account_service.viewer_state(user.as_ref()).await?;

    Ok(ApiResponse::ok(ViewerResponse {
        is_authed: viewer.is_authed(),
        is_pro: viewer.is_pro(),
        is_admin: viewer.is_admin(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_viewer))
}
