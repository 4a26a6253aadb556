use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{ConnectionTrait, Statement};
use tracing::{info, warn};

use super::USERS_SHADOW_TABLE;

#[derive(DeriveMigrationName)]
pub struct Migration;

async fn count<C: ConnectionTrait>(conn: &C, sql: String) -> Result<i64, DbErr> {
    let stmt = Statement::from_string(conn.get_database_backend(), sql);
    match conn.query_one(stmt).await? {
        Some(row) => {
            let n: i64 = row.try_get("", "n")?;
            Ok(n)
        }
        None => Ok(0),
    }
}

/// Shadow-rename, recreate from the corrected definition, copy every row,
/// drop the shadow. The savepoint keeps a half-finished rebuild from leaving
/// the table renamed away.
async fn rebuild_table<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    create_sql: &str,
) -> Result<(), DbErr> {
    let shadow = format!("{name}_repair");

    conn.execute_unprepared("SAVEPOINT repair_table").await?;
    let result = async {
        conn.execute_unprepared(&format!("ALTER TABLE \"{name}\" RENAME TO \"{shadow}\""))
            .await?;
        conn.execute_unprepared(create_sql).await?;
        conn.execute_unprepared(&format!(
            "INSERT INTO \"{name}\" SELECT * FROM \"{shadow}\""
        ))
        .await?;
        conn.execute_unprepared(&format!("DROP TABLE \"{shadow}\""))
            .await?;
        Ok::<(), DbErr>(())
    }
    .await;

    match result {
        Ok(()) => {
            conn.execute_unprepared("RELEASE repair_table").await?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_unprepared("ROLLBACK TO repair_table").await;
            let _ = conn.execute_unprepared("RELEASE repair_table").await;
            Err(e)
        }
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        // A leftover shadow means an earlier rebuild was interrupted. If the
        // live table is still empty the shadow holds the real rows; pull them
        // across. If both carry data the situation is not decidable here.
        let shadow_present = count(
            conn,
            format!(
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = '{USERS_SHADOW_TABLE}'"
            ),
        )
        .await?
            > 0;

        if shadow_present {
            let live_rows = count(conn, "SELECT COUNT(*) AS n FROM users".to_string()).await?;
            if live_rows == 0 {
                conn.execute_unprepared(&format!(
                    "INSERT INTO users (id, username, password_hash, display_name, role, created_at) \
                     SELECT id, username, password_hash, display_name, role, created_at FROM {USERS_SHADOW_TABLE}"
                ))
                .await?;
                conn.execute_unprepared(&format!("DROP TABLE {USERS_SHADOW_TABLE}"))
                    .await?;
                info!("Recovered user rows from an interrupted rebuild");
            } else {
                warn!(
                    "Both users and {USERS_SHADOW_TABLE} exist with data; leaving the shadow untouched. \
                     Delete the database file to force a clean rebuild."
                );
            }
        }

        // Older releases renamed users without suppressing the engine's
        // reference rewrite, which bakes the shadow name into other tables'
        // stored definitions. Rewrite each affected definition back.
        let damaged = conn
            .query_all(Statement::from_string(
                backend,
                format!(
                    "SELECT name, sql FROM sqlite_master WHERE type = 'table' \
                     AND name NOT LIKE 'sqlite_%' AND name != '{USERS_SHADOW_TABLE}' \
                     AND sql LIKE '%{USERS_SHADOW_TABLE}%'"
                ),
            ))
            .await?;

        if damaged.is_empty() {
            return Ok(());
        }

        conn.execute_unprepared("PRAGMA foreign_keys = OFF").await?;
        conn.execute_unprepared("PRAGMA legacy_alter_table = ON")
            .await?;

        for row in damaged {
            let name: String = row.try_get("", "name")?;
            let sql: String = row.try_get("", "sql")?;
            let fixed = sql.replace(USERS_SHADOW_TABLE, "users");

            match rebuild_table(conn, &name, &fixed).await {
                Ok(()) => info!("Repaired stale user reference in table '{name}'"),
                Err(e) => warn!(
                    "Could not repair table '{name}': {e}. \
                     Delete the database file to force a clean rebuild."
                ),
            }
        }

        conn.execute_unprepared("PRAGMA legacy_alter_table = OFF")
            .await?;
        conn.execute_unprepared("PRAGMA foreign_keys = ON").await?;

        Ok(())
    }

    async fn down(&self, _manager: &SchemaManager) -> Result<(), DbErr> {
        Ok(())
    }
}
