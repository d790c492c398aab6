//! Billing entitlement repository.

use std::sync::Arc;

use crate::entities::{BillingEntitlement, billing_entitlement};
use chrono::{DateTime, Utc};
use peptalk_common::{AppError, AppResult};
use sea_orm::{
    DatabaseConnection, EntityTrait, QueryOrder, Set, sea_query::OnConflict,
};

/// Values written by a billing sync.
#[derive(Debug, Clone)]
pub struct EntitlementUpsert {
    /// Owner identity ID.
    pub user_id: String,
    /// Subscription platform app-user ID.
    pub rc_app_user_id: String,
    /// Live Pro state.
    pub pro_active: bool,
    /// Expiry; `None` for lifetime or unknown.
    pub pro_expires_at: Option<DateTime<Utc>>,
    /// Platform name.
    pub source: String,
    /// Event that triggered the sync.
    pub last_event_id: String,
    /// Sync time; written to `last_event_at` and `updated_at`.
    pub synced_at: DateTime<Utc>,
}

/// Billing entitlement repository for database operations.
#[derive(Clone)]
pub struct BillingEntitlementRepository {
    db: Arc<DatabaseConnection>,
}

impl BillingEntitlementRepository {
    /// Create a new billing entitlement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the entitlement for a user. `None` means the user never subscribed.
    pub async fn find_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<billing_entitlement::Model>> {
        BillingEntitlement::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert or replace the entitlement snapshot for a user.
    pub async fn upsert(&self, values: EntitlementUpsert) -> AppResult<()> {
        let model = billing_entitlement::ActiveModel {
            user_id: Set(values.user_id),
            rc_app_user_id: Set(Some(values.rc_app_user_id)),
            pro_active: Set(Some(values.pro_active)),
            pro_expires_at: Set(values.pro_expires_at.map(Into::into)),
            source: Set(Some(values.source)),
            last_event_id: Set(Some(values.last_event_id)),
            last_event_at: Set(Some(values.synced_at.into())),
            updated_at: Set(Some(values.synced_at.into())),
        };

        BillingEntitlement::insert(model)
            .on_conflict(
                OnConflict::column(billing_entitlement::Column::UserId)
                    .update_columns([
                        billing_entitlement::Column::RcAppUserId,
                        billing_entitlement::Column::ProActive,
                        billing_entitlement::Column::ProExpiresAt,
                        billing_entitlement::Column::Source,
                        billing_entitlement::Column::LastEventId,
                        billing_entitlement::Column::LastEventAt,
                        billing_entitlement::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// All entitlement rows, most recently updated first.
    pub async fn list_all(&self) -> AppResult<Vec<billing_entitlement::Model>> {
        BillingEntitlement::find()
            .order_by_desc(billing_entitlement::Column::UpdatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_by_user_id_missing_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<billing_entitlement::Model>::new()])
                .into_connection(),
        );

        let repo = BillingEntitlementRepository::new(db);
        assert!(repo.find_by_user_id("user1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = BillingEntitlementRepository::new(db);
        let result = repo
            .upsert(EntitlementUpsert {
                user_id: "user1".to_string(),
                rc_app_user_id: "user1".to_string(),
                pro_active: true,
                pro_expires_at: None,
                source: "revenuecat".to_string(),
                last_event_id: "evt_1".to_string(),
                synced_at: Utc::now(),
            })
            .await;

        assert!(result.is_ok());
    }
}
