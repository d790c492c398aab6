//! Profile repository.

use std::sync::Arc;

use crate::entities::{Profile, profile};
use chrono::Utc;
use peptalk_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, sea_query::Expr};

/// Profile repository for database operations.
#[derive(Clone)]
pub struct ProfileRepository {
    db: Arc<DatabaseConnection>,
}

impl ProfileRepository {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a profile by user ID.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<profile::Model>> {
        Profile::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Mirror the live Pro state into the cached profile flag.
    pub async fn set_pro(&self, user_id: &str, is_pro: bool) -> AppResult<()> {
        Profile::update_many()
            .col_expr(profile::Column::IsPro, Expr::value(is_pro))
            .col_expr(profile::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(profile::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}
