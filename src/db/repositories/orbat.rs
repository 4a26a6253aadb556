use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};

use super::StoreError;
use crate::entities::{orbat_slots, prelude::*};
use crate::orbat::OrbatKind;

/// Read and assignment access to the organizational tree. The tree shape is
/// fixed at seed time; the only mutation offered is setting or clearing the
/// occupant of a role slot.
pub struct OrbatRepository {
    conn: DatabaseConnection,
}

impl OrbatRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn tree(&self) -> Result<Vec<orbat_slots::Model>, StoreError> {
        Ok(OrbatSlots::find()
            .order_by_asc(orbat_slots::Column::SortOrder)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, slot_id: &str) -> Result<Option<orbat_slots::Model>, StoreError> {
        Ok(OrbatSlots::find_by_id(slot_id.to_string())
            .one(&self.conn)
            .await?)
    }

    pub async fn assign(
        &self,
        slot_id: &str,
        personnel_id: i32,
    ) -> Result<orbat_slots::Model, StoreError> {
        let slot = self.get(slot_id).await?.ok_or(StoreError::NotFound)?;

        let assignable = OrbatKind::parse(&slot.kind).is_some_and(OrbatKind::is_assignable);
        if !assignable {
            return Err(StoreError::SlotNotAssignable(slot.id));
        }

        if Personnel::find_by_id(personnel_id)
            .one(&self.conn)
            .await?
            .is_none()
        {
            return Err(StoreError::NotFound);
        }

        let mut active: orbat_slots::ActiveModel = slot.into();
        active.personnel_id = Set(Some(personnel_id));

        Ok(active.update(&self.conn).await?)
    }

    pub async fn clear(&self, slot_id: &str) -> Result<orbat_slots::Model, StoreError> {
        let slot = self.get(slot_id).await?.ok_or(StoreError::NotFound)?;

        let assignable = OrbatKind::parse(&slot.kind).is_some_and(OrbatKind::is_assignable);
        if !assignable {
            return Err(StoreError::SlotNotAssignable(slot.id));
        }

        let mut active: orbat_slots::ActiveModel = slot.into();
        active.personnel_id = Set(None);

        Ok(active.update(&self.conn).await?)
    }
}
