use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::Set, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::entities::prelude::*;
use crate::entities::{orbat_slots, personnel, settings};
use crate::orbat::ORBAT_TEMPLATE;

pub mod migrator;
pub mod repositories;

pub use repositories::StoreError;
pub use repositories::activity::ActivityRepository;
pub use repositories::orbat::OrbatRepository;
pub use repositories::personnel::{PersonnelInput, PersonnelRepository};

/// The single shared handle every other layer goes through. Constructing it
/// is the "ensure ready" step: by the time `new` returns, the schema is
/// current and the seed data is in place, or the process never got this far.
#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    /// Brings the database file from whatever state it is in (absent, fresh,
    /// or written by any prior release) to the current schema, then seeds the
    /// ORBAT template if the table is empty. Idempotent; called once at
    /// process start.
    pub async fn new(db_url: &str) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.starts_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        // A single connection keeps every statement on one session, so the
        // pragmas the structural migrations toggle stay in effect for the
        // statements that follow them. Writers serialize inside the engine.
        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(1)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(opt)
            .await
            .context("Failed to open database")?;

        migrator::Migrator::up(&conn, None)
            .await
            .context("Failed to apply migrations")?;

        let store = Self { conn };
        store.seed_orbat().await?;

        info!("Database ready");

        Ok(store)
    }

    /// The live handle. Collaborating layers issue parameterized statements
    /// against it directly; the store does not mediate individual queries.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Loads the ORBAT template on first boot. Inserts are keyed on the
    /// template's stable slot ids, so re-running can never duplicate a node,
    /// and existing role assignments are never touched.
    async fn seed_orbat(&self) -> Result<()> {
        let existing = OrbatSlots::find().count(&self.conn).await?;
        if existing > 0 {
            return Ok(());
        }

        let rows: Vec<orbat_slots::ActiveModel> = ORBAT_TEMPLATE
            .iter()
            .map(|s| orbat_slots::ActiveModel {
                id: Set(s.id.to_string()),
                parent_id: Set(s.parent.map(str::to_string)),
                name: Set(s.name.to_string()),
                kind: Set(s.kind.as_str().to_string()),
                callsign: Set(s.callsign.map(str::to_string)),
                sort_order: Set(s.sort_order),
                personnel_id: Set(None),
            })
            .collect();

        OrbatSlots::insert_many(rows)
            .on_conflict(
                OnConflict::column(orbat_slots::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to seed ORBAT template")?;

        info!("Seeded ORBAT template ({} slots)", ORBAT_TEMPLATE.len());
        Ok(())
    }

    fn personnel_repo(&self) -> PersonnelRepository {
        PersonnelRepository::new(self.conn.clone())
    }

    fn orbat_repo(&self) -> OrbatRepository {
        OrbatRepository::new(self.conn.clone())
    }

    fn activity_repo(&self) -> ActivityRepository {
        ActivityRepository::new(self.conn.clone())
    }

    pub async fn add_personnel(
        &self,
        input: PersonnelInput,
    ) -> Result<personnel::Model, StoreError> {
        self.personnel_repo().create(input).await
    }

    pub async fn get_personnel(&self, id: i32) -> Result<Option<personnel::Model>, StoreError> {
        self.personnel_repo().get(id).await
    }

    pub async fn list_personnel(&self) -> Result<Vec<personnel::Model>, StoreError> {
        self.personnel_repo().list().await
    }

    pub async fn set_personnel_rank(
        &self,
        id: i32,
        rank: Option<String>,
    ) -> Result<personnel::Model, StoreError> {
        self.personnel_repo().set_rank(id, rank).await
    }

    pub async fn set_personnel_status(
        &self,
        id: i32,
        status: &str,
    ) -> Result<personnel::Model, StoreError> {
        self.personnel_repo().set_status(id, status).await
    }

    pub async fn link_personnel_user(
        &self,
        id: i32,
        user_id: Option<i32>,
    ) -> Result<personnel::Model, StoreError> {
        self.personnel_repo().link_user(id, user_id).await
    }

    pub async fn remove_personnel(&self, id: i32) -> Result<bool, StoreError> {
        self.personnel_repo().remove(id).await
    }

    pub async fn orbat_tree(&self) -> Result<Vec<orbat_slots::Model>, StoreError> {
        self.orbat_repo().tree().await
    }

    pub async fn assign_slot(
        &self,
        slot_id: &str,
        personnel_id: i32,
    ) -> Result<orbat_slots::Model, StoreError> {
        self.orbat_repo().assign(slot_id, personnel_id).await
    }

    pub async fn clear_slot(&self, slot_id: &str) -> Result<orbat_slots::Model, StoreError> {
        self.orbat_repo().clear(slot_id).await
    }

    pub async fn log_activity(
        &self,
        user_id: Option<i32>,
        action: &str,
        details: Option<String>,
    ) -> Result<(), StoreError> {
        self.activity_repo().add(user_id, action, details).await
    }

    pub async fn prune_activity_log(&self, older_than_days: i64) -> Result<u64, StoreError> {
        self.activity_repo().prune(older_than_days).await
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let row = Settings::find_by_id(key.to_string()).one(&self.conn).await?;
        Ok(row.map(|s| s.value))
    }

    pub async fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let model = settings::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
        };

        Settings::insert(model)
            .on_conflict(
                OnConflict::column(settings::Column::Key)
                    .update_column(settings::Column::Value)
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;

        Ok(())
    }
}
