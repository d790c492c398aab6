//! Auth provider callback.

use axum::{Router, extract::Query, response::Redirect, routing::get};
use peptalk_common::safe_next_path;
use serde::Deserialize;

use crate::middleware::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub next: Option<String>,
}

/// Redirect to the guarded `next` path once the provider finished sign-in.
async fn callback(Query(query): Query<CallbackQuery>) -> Redirect {
    Redirect::to(&safe_next_path(query.next.as_deref()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/callback", get(callback))
}
