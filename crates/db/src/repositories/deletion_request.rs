//! Account deletion request repository.

use std::sync::Arc;

use crate::entities::{
    AccountDeletionRequest, account_deletion_request,
    account_deletion_request::DeletionRequestStatus,
};
use chrono::Utc;
use peptalk_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Account deletion request repository for database operations.
#[derive(Clone)]
pub struct DeletionRequestRepository {
    db: Arc<DatabaseConnection>,
}

impl DeletionRequestRepository {
    /// Create a new deletion request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a deletion request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account_deletion_request::Model>> {
        AccountDeletionRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a deletion request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account_deletion_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Deletion request {id} not found")))
    }

    /// Find the open request for a user, if any.
    pub async fn find_open_by_user_id(
        &self,
        user_id: &str,
    ) -> AppResult<Option<account_deletion_request::Model>> {
        AccountDeletionRequest::find()
            .filter(account_deletion_request::Column::UserId.eq(user_id))
            .filter(account_deletion_request::Column::Status.eq(DeletionRequestStatus::Requested))
            .order_by_desc(account_deletion_request::Column::CreatedAt)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All open requests, oldest first.
    pub async fn list_open(&self) -> AppResult<Vec<account_deletion_request::Model>> {
        AccountDeletionRequest::find()
            .filter(account_deletion_request::Column::Status.eq(DeletionRequestStatus::Requested))
            .order_by_asc(account_deletion_request::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new deletion request.
    pub async fn create(
        &self,
        model: account_deletion_request::ActiveModel,
    ) -> AppResult<account_deletion_request::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mark an open deletion request as completed.
    ///
    /// Requests that are already completed or cancelled are a conflict.
    pub async fn mark_completed(&self, id: &str) -> AppResult<account_deletion_request::Model> {
        let request = self.get_by_id(id).await?;
        if request.status != DeletionRequestStatus::Requested {
            return Err(AppError::Conflict(format!("Deletion request {id} is not open")));
        }

        let mut active: account_deletion_request::ActiveModel = request.into();
        active.status = Set(DeletionRequestStatus::Completed);
        active.resolved_at = Set(Some(Utc::now().into()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
