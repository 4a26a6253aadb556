use sea_orm_migration::prelude::*;

mod m20240301_initial;
mod m20240620_add_operation_fields;
mod m20240815_add_personnel_rank_since;
mod m20241102_repair_user_references;
mod m20241110_add_discord_identity;
mod m20250110_add_activity_log_index;

/// Shadow name used by the users-table rebuild. Databases written by older
/// releases can contain foreign-key clauses baked against this name; the
/// repair migration scans for it, so the repair must stay ordered before
/// the rebuild.
pub(crate) const USERS_SHADOW_TABLE: &str = "users_old";

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_initial::Migration),
            Box::new(m20240620_add_operation_fields::Migration),
            Box::new(m20240815_add_personnel_rank_since::Migration),
            Box::new(m20241102_repair_user_references::Migration),
            Box::new(m20241110_add_discord_identity::Migration),
            Box::new(m20250110_add_activity_log_index::Migration),
        ]
    }
}
