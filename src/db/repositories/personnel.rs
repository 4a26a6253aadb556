use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder,
};

use super::StoreError;
use crate::constants::roster;
use crate::entities::{personnel, prelude::*};

/// Fields accepted when adding a roster entry.
#[derive(Debug, Clone)]
pub struct PersonnelInput {
    pub name: String,
    pub category: String,
    pub status: String,
    pub rank: Option<String>,
    pub user_id: Option<i32>,
}

impl PersonnelInput {
    #[must_use]
    pub fn member(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: roster::category::MEMBER.to_string(),
            status: roster::status::ACTIVE.to_string(),
            rank: None,
            user_id: None,
        }
    }
}

pub struct PersonnelRepository {
    conn: DatabaseConnection,
}

impl PersonnelRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn validate(input: &PersonnelInput) -> Result<(), StoreError> {
        if !roster::category::ALL.contains(&input.category.as_str()) {
            return Err(StoreError::InvalidValue(format!(
                "unknown category '{}'",
                input.category
            )));
        }
        if !roster::status::ALL.contains(&input.status.as_str()) {
            return Err(StoreError::InvalidValue(format!(
                "unknown status '{}'",
                input.status
            )));
        }
        // Civilian staff hold no rank.
        if input.rank.is_some() && input.category != roster::category::MEMBER {
            return Err(StoreError::RankRequiresMember);
        }
        Ok(())
    }

    pub async fn create(&self, input: PersonnelInput) -> Result<personnel::Model, StoreError> {
        Self::validate(&input)?;

        let now = Utc::now().to_rfc3339();
        let model = personnel::ActiveModel {
            name: Set(input.name),
            category: Set(input.category),
            status: Set(input.status),
            rank_since: Set(input.rank.as_ref().map(|_| now.clone())),
            rank: Set(input.rank),
            joined_at: Set(now),
            user_id: Set(input.user_id),
            ..Default::default()
        };

        Ok(model.insert(&self.conn).await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<personnel::Model>, StoreError> {
        Ok(Personnel::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn list(&self) -> Result<Vec<personnel::Model>, StoreError> {
        Ok(Personnel::find()
            .order_by_asc(personnel::Column::Name)
            .all(&self.conn)
            .await?)
    }

    /// Sets or clears the rank, stamping the effective date. Refused for
    /// non-member entries.
    pub async fn set_rank(
        &self,
        id: i32,
        rank: Option<String>,
    ) -> Result<personnel::Model, StoreError> {
        let current = self.get(id).await?.ok_or(StoreError::NotFound)?;

        if rank.is_some() && current.category != roster::category::MEMBER {
            return Err(StoreError::RankRequiresMember);
        }

        let mut active: personnel::ActiveModel = current.into();
        active.rank_since = Set(rank.as_ref().map(|_| Utc::now().to_rfc3339()));
        active.rank = Set(rank);

        Ok(active.update(&self.conn).await?)
    }

    pub async fn set_status(&self, id: i32, status: &str) -> Result<personnel::Model, StoreError> {
        if !roster::status::ALL.contains(&status) {
            return Err(StoreError::InvalidValue(format!(
                "unknown status '{status}'"
            )));
        }

        let current = self.get(id).await?.ok_or(StoreError::NotFound)?;
        let mut active: personnel::ActiveModel = current.into();
        active.status = Set(status.to_string());

        Ok(active.update(&self.conn).await?)
    }

    pub async fn link_user(
        &self,
        id: i32,
        user_id: Option<i32>,
    ) -> Result<personnel::Model, StoreError> {
        let current = self.get(id).await?.ok_or(StoreError::NotFound)?;
        let mut active: personnel::ActiveModel = current.into();
        active.user_id = Set(user_id);

        Ok(active.update(&self.conn).await?)
    }

    /// Removes a roster entry; awards and qualifications cascade.
    pub async fn remove(&self, id: i32) -> Result<bool, StoreError> {
        let res = Personnel::delete_by_id(id).exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }
}
