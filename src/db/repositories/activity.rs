use chrono::{Duration, Utc};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use super::StoreError;
use crate::entities::{activity_log, prelude::*};

pub struct ActivityRepository {
    conn: DatabaseConnection,
}

impl ActivityRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn add(
        &self,
        user_id: Option<i32>,
        action: &str,
        details: Option<String>,
    ) -> Result<(), StoreError> {
        let entry = activity_log::ActiveModel {
            user_id: Set(user_id),
            action: Set(action.to_string()),
            details: Set(details),
            created_at: Set(Utc::now().to_rfc3339()),
            ..Default::default()
        };

        ActivityLog::insert(entry).exec(&self.conn).await?;
        Ok(())
    }

    pub async fn recent(&self, limit: u64) -> Result<Vec<activity_log::Model>, StoreError> {
        Ok(ActivityLog::find()
            .order_by_desc(activity_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.conn)
            .await?)
    }

    /// Deletes entries older than the cutoff; returns how many went away.
    pub async fn prune(&self, older_than_days: i64) -> Result<u64, StoreError> {
        let cutoff = (Utc::now() - Duration::days(older_than_days)).to_rfc3339();

        let res = ActivityLog::delete_many()
            .filter(activity_log::Column::CreatedAt.lt(cutoff))
            .exec(&self.conn)
            .await?;

        Ok(res.rows_affected)
    }
}
