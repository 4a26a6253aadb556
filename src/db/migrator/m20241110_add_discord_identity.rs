use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, Statement};
use tracing::info;

use super::USERS_SHADOW_TABLE;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Target shape of the users table. Must stay in sync with the users entity.
const USERS_TARGET_SQL: &str = "CREATE TABLE users (\
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
    username TEXT NULL UNIQUE, \
    password_hash TEXT NULL, \
    display_name TEXT NOT NULL, \
    role TEXT NOT NULL DEFAULT 'member', \
    created_at TEXT NOT NULL, \
    discord_id TEXT NULL UNIQUE, \
    discord_username TEXT NULL, \
    discord_avatar TEXT NULL, \
    discord_access_token TEXT NULL, \
    discord_refresh_token TEXT NULL, \
    personnel_id INTEGER NULL\
)";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        // discord_id doubles as the marker: its presence means the table is
        // already in target shape (fresh databases land here via the initial
        // migration).
        let marker = conn
            .query_one(Statement::from_string(
                backend,
                "SELECT COUNT(*) AS n FROM pragma_table_info('users') WHERE name = 'discord_id'"
                    .to_string(),
            ))
            .await?;
        let has_marker = match marker {
            Some(row) => {
                let n: i64 = row.try_get("", "n")?;
                n > 0
            }
            None => false,
        };
        if has_marker {
            return Ok(());
        }

        info!("Rebuilding users table with Discord identity columns");

        // With legacy_alter_table off, renaming users would also rewrite the
        // REFERENCES clauses of every other table to follow the rename, which
        // is exactly backwards for a shadow swap. Relax it for the duration.
        conn.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
        conn.execute_unprepared("PRAGMA legacy_alter_table = ON")
            .await?;

        conn.execute_unprepared("SAVEPOINT add_discord_identity")
            .await?;
        let result = async {
            conn.execute_unprepared(&format!("ALTER TABLE users RENAME TO {USERS_SHADOW_TABLE}"))
                .await?;
            conn.execute_unprepared(USERS_TARGET_SQL).await?;
            conn.execute_unprepared(&format!(
                "INSERT INTO users (id, username, password_hash, display_name, role, created_at) \
                 SELECT id, username, password_hash, display_name, role, created_at FROM {USERS_SHADOW_TABLE}"
            ))
            .await?;
            conn.execute_unprepared(&format!("DROP TABLE {USERS_SHADOW_TABLE}"))
                .await?;
            Ok::<(), DbErr>(())
        }
        .await;

        let outcome = match result {
            Ok(()) => {
                conn.execute_unprepared("RELEASE add_discord_identity")
                    .await?;
                Ok(())
            }
            Err(e) => {
                let _ = conn
                    .execute_unprepared("ROLLBACK TO add_discord_identity")
                    .await;
                let _ = conn.execute_unprepared("RELEASE add_discord_identity").await;
                Err(e)
            }
        };

        conn.execute_unprepared("PRAGMA legacy_alter_table = OFF")
            .await?;
        conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

        outcome
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
