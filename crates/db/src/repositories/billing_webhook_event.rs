//! Billing webhook event repository.

use std::sync::Arc;

use crate::entities::{BillingWebhookEvent, billing_webhook_event};
use peptalk_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    sea_query::OnConflict,
};

/// Billing webhook event repository for database operations.
#[derive(Clone)]
pub struct BillingWebhookEventRepository {
    db: Arc<DatabaseConnection>,
}

impl BillingWebhookEventRepository {
    /// Create a new billing webhook event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Record an event unless its ID was seen before.
    ///
    /// Returns `false` for a duplicate delivery.
    pub async fn insert_if_new(&self, model: billing_webhook_event::ActiveModel) -> AppResult<bool> {
        let inserted = BillingWebhookEvent::insert(model)
            .on_conflict(
                OnConflict::column(billing_webhook_event::Column::EventId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Remove a recorded event so a redelivery is processed again.
    pub async fn delete(&self, event_id: &str) -> AppResult<()> {
        BillingWebhookEvent::delete_by_id(event_id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Most recent events for an app user, newest first.
    pub async fn find_recent_for_app_user(
        &self,
        rc_app_user_id: &str,
        limit: u64,
    ) -> AppResult<Vec<billing_webhook_event::Model>> {
        BillingWebhookEvent::find()
            .filter(billing_webhook_event::Column::RcAppUserId.eq(rc_app_user_id))
            .order_by_desc(billing_webhook_event::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};
    use serde_json::json;

    fn new_event(id: &str) -> billing_webhook_event::ActiveModel {
        billing_webhook_event::ActiveModel {
            event_id: Set(id.to_string()),
            event_type: Set("RENEWAL".to_string()),
            rc_app_user_id: Set("user1".to_string()),
            payload: Set(json!({ "event": { "id": id } })),
            created_at: Set(Utc::now().into()),
        }
    }

    fn exec_result(rows_affected: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected,
        }
    }

    #[tokio::test]
    async fn test_insert_if_new_fresh_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(1)])
                .into_connection(),
        );

        let repo = BillingWebhookEventRepository::new(db);
        assert!(repo.insert_if_new(new_event("evt_1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_if_new_duplicate_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_result(0)])
                .into_connection(),
        );

        let repo = BillingWebhookEventRepository::new(db);
        assert!(!repo.insert_if_new(new_event("evt_1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_recent_for_app_user() {
        let event = billing_webhook_event::Model {
            event_id: "evt_2".to_string(),
            event_type: "INITIAL_PURCHASE".to_string(),
            rc_app_user_id: "user1".to_string(),
            payload: json!({}),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event]])
                .into_connection(),
        );

        let repo = BillingWebhookEventRepository::new(db);
        let events = repo.find_recent_for_app_user("user1", 10).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "INITIAL_PURCHASE");
    }
}
