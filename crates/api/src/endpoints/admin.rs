//! Admin endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use peptalk_common::AppResult;
use peptalk_core::BillingSummary;
use peptalk_db::entities::account_deletion_request::{self, DeletionRequestStatus};
use serde::Serialize;

use crate::{extractors::AdminUser, middleware::AppState, response::ApiResponse};

/// Deletion request response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionRequestResponse {
    pub id: String,
    pub user_id: String,
    pub status: DeletionRequestStatus,
    pub reason: Option<String>,
    pub created_at: String,
    pub resolved_at: Option<String>,
}

impl From<account_deletion_request::Model> for DeletionRequestResponse {
    fn from(request: account_deletion_request::Model) -> Self {
        Self {
            id: request.id,
            user_id: request.user_id,
            status: request.status,
            reason: request.reason,
            created_at: request.created_at.to_rfc3339(),
            resolved_at: request.resolved_at.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(Serialize)]
pub struct DeletionRequestList {
    pub requests: Vec<DeletionRequestResponse>,
}

#[derive(Serialize)]
pub struct DeletionRequestItem {
    pub request: DeletionRequestResponse,
}

/// Subscriber overview synced from billing webhooks.
async fn billing(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<BillingSummary>> {
    let summary = state.billing_service.billing_summary().await?;
    Ok(ApiResponse::ok(summary))
}

/// Deletion requests waiting for support.
async fn deletion_requests(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> AppResult<ApiResponse<DeletionRequestList>> {
    let requests = state.account_service.open_deletion_requests().await?;
    Ok(ApiResponse::ok(DeletionRequestList {
        requests: requests.into_iter().map(Into::into).collect(),
    }))
}

/// Mark a deletion request as handled.
async fn complete_deletion_request(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeletionRequestItem>> {
    let request = state.account_service.complete_deletion_request(&id).await?;
    tracing::info!(admin_id = %admin.id, request_id = %id, "Deletion request completed by admin");

    Ok(ApiResponse::ok(DeletionRequestItem {
        request: request.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/billing", get(billing))
        .route("/deletion-requests", get(deletion_requests))
        .route("/deletion-requests/{id}/complete", post(complete_deletion_request))
}
