//! Identity repository.

use std::sync::Arc;

use crate::entities::{Identity, identity};
use peptalk_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Identity repository for database operations.
#[derive(Clone)]
pub struct IdentityRepository {
    db: Arc<DatabaseConnection>,
}

impl IdentityRepository {
    /// Create a new identity repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the identity a session token belongs to.
    pub async fn find_by_access_token(&self, token: &str) -> AppResult<Option<identity::Model>> {
        Identity::find()
            .filter(identity::Column::AccessToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find identities by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<identity::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Identity::find()
            .filter(identity::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
