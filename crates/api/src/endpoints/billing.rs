//! Subscription platform webhook.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use peptalk_core::{WebhookOutcome, WebhookRejection};
use serde_json::json;

use crate::middleware::AppState;

/// Liveness probe used when configuring the webhook URL.
async fn probe() -> impl IntoResponse {
    Json(json!({ "ok": true, "route": "revenuecat_webhook" }))
}

async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state
        .billing_service
        .handle_webhook(authorization, &body)
        .await
    {
        Ok(outcome) => Json(outcome_body(outcome)).into_response(),
        Err(rejection) => (
            rejection_status(rejection),
            Json(json!({ "ok": false, "error": rejection.to_string() })),
        )
            .into_response(),
    }
}

fn outcome_body(outcome: WebhookOutcome) -> serde_json::Value {
    match outcome {
        WebhookOutcome::Synced {
            pro_active,
            expires_at,
        } => json!({ "ok": true, "proActive": pro_active, "expiresAt": expires_at }),
        WebhookOutcome::Deduped => json!({ "ok": true, "deduped": true }),
        WebhookOutcome::UnknownUser { app_user_id } => {
            json!({ "ok": true, "ignored": "unknown_user", "app_user_id": app_user_id })
        }
    }
}

const fn rejection_status(rejection: WebhookRejection) -> StatusCode {
    match rejection {
        WebhookRejection::Unauthorized => StatusCode::UNAUTHORIZED,
        WebhookRejection::BadJson
        | WebhookRejection::MissingEventId
        | WebhookRejection::MissingAppUserId => StatusCode::BAD_REQUEST,
        WebhookRejection::EventStoreFailed
        | WebhookRejection::SubscriberFetchFailed
        | WebhookRejection::ProfileLookupFailed
        | WebhookRejection::EntitlementUpsertFailed
        | WebhookRejection::ProfileUpdateFailed => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/revenuecat/webhook", get(probe).post(receive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_status_matches_retry_semantics() {
        for rejection in [
            WebhookRejection::Unauthorized,
            WebhookRejection::BadJson,
            WebhookRejection::MissingEventId,
            WebhookRejection::MissingAppUserId,
            WebhookRejection::EventStoreFailed,
            WebhookRejection::SubscriberFetchFailed,
            WebhookRejection::ProfileLookupFailed,
            WebhookRejection::EntitlementUpsertFailed,
            WebhookRejection::ProfileUpdateFailed,
        ] {
            assert_eq!(
                rejection_status(rejection).is_server_error(),
                rejection.is_server_error(),
                "{rejection}"
            );
        }
    }

    #[test]
    fn test_outcome_bodies() {
        assert_eq!(
            outcome_body(WebhookOutcome::Deduped),
            json!({ "ok": true, "deduped": true })
        );
        assert_eq!(
            outcome_body(WebhookOutcome::Synced {
                pro_active: true,
                expires_at: None
            }),
            json!({ "ok": true, "proActive": true, "expiresAt": null })
        );
    }
}
