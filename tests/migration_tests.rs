//! Schema lifecycle tests: fresh boot, adoption of databases written by
//! older releases, the users-table rebuild, and corruption repair.

use perscom::db::Store;
use perscom::entities::prelude::*;
use perscom::entities::users;
use perscom::orbat::ORBAT_TEMPLATE;
use sea_orm::{
    ColumnTrait, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, Statement,
};
use std::path::{Path, PathBuf};

const ALL_TABLES: &[&str] = &[
    "users",
    "personnel",
    "awards",
    "qualifications",
    "operations",
    "evaluations",
    "announcements",
    "activity_log",
    "documents",
    "gear_loadouts",
    "gear_items",
    "settings",
    "orbat_slots",
];

const LEGACY_USERS_SQL: &str = "CREATE TABLE users (\
    id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
    username TEXT NULL UNIQUE, \
    password_hash TEXT NULL, \
    display_name TEXT NOT NULL, \
    role TEXT NOT NULL DEFAULT 'member', \
    created_at TEXT NOT NULL\
)";

const LEGACY_ADMIN_ROW_SQL: &str = "INSERT INTO users \
    (username, password_hash, display_name, role, created_at) \
    VALUES ('admin', 'hash1', 'Admin', 'admin', '2023-05-01T00:00:00Z')";

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("perscom-migration-test-{}.db", uuid::Uuid::new_v4()))
}

fn db_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}

/// Raw connection used to stage databases the way older releases left them.
async fn raw_connect(path: &Path) -> DatabaseConnection {
    std::fs::File::create(path).expect("failed to create db file");
    Database::connect(db_url(path))
        .await
        .expect("failed to open raw connection")
}

async fn exec(conn: &DatabaseConnection, sql: &str) {
    conn.execute_unprepared(sql)
        .await
        .unwrap_or_else(|e| panic!("statement failed: {sql}: {e}"));
}

async fn scalar(conn: &DatabaseConnection, sql: &str) -> i64 {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            sql.to_string(),
        ))
        .await
        .expect("query failed")
        .expect("query returned no row");
    row.try_get("", "n").expect("missing column n")
}

async fn table_sql(conn: &DatabaseConnection, table: &str) -> Option<String> {
    let row = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = '{table}'"),
        ))
        .await
        .expect("query failed")?;
    Some(row.try_get("", "sql").expect("missing column sql"))
}

async fn column_names(conn: &DatabaseConnection, table: &str) -> Vec<String> {
    let rows = conn
        .query_all(Statement::from_string(
            DatabaseBackend::Sqlite,
            format!("SELECT name FROM pragma_table_info('{table}')"),
        ))
        .await
        .expect("query failed");
    rows.iter()
        .map(|r| r.try_get("", "name").expect("missing column name"))
        .collect()
}

#[tokio::test]
async fn fresh_database_boots_with_full_schema() {
    let path = temp_db_path();
    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    for table in ALL_TABLES {
        let n = scalar(
            store.conn(),
            &format!(
                "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = '{table}'"
            ),
        )
        .await;
        assert_eq!(n, 1, "table {table} missing after first boot");
    }

    assert_eq!(Users::find().count(store.conn()).await.unwrap(), 0);
    assert_eq!(Personnel::find().count(store.conn()).await.unwrap(), 0);
    assert_eq!(
        OrbatSlots::find().count(store.conn()).await.unwrap(),
        ORBAT_TEMPLATE.len() as u64
    );

    let root = OrbatSlots::find_by_id("tf".to_string())
        .one(store.conn())
        .await
        .unwrap()
        .expect("root slot missing from seed");
    assert!(root.parent_id.is_none());
    assert_eq!(root.kind, "unit");
}

#[tokio::test]
async fn ensure_ready_is_idempotent() {
    let path = temp_db_path();

    let store = Store::new(&db_url(&path)).await.expect("first run");
    let first_columns = column_names(store.conn(), "users").await;
    store.conn.clone().close().await.unwrap();

    for _ in 0..2 {
        let store = Store::new(&db_url(&path)).await.expect("repeat run");
        let columns = column_names(store.conn(), "users").await;
        assert_eq!(columns, first_columns, "schema changed on re-run");

        let mut deduped = columns.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), columns.len(), "duplicate columns on users");

        assert_eq!(
            OrbatSlots::find().count(store.conn()).await.unwrap(),
            ORBAT_TEMPLATE.len() as u64,
            "seed rows duplicated on re-run"
        );
        store.conn.clone().close().await.unwrap();
    }
}

#[tokio::test]
async fn legacy_users_table_is_upgraded_in_place() {
    let path = temp_db_path();

    let conn = raw_connect(&path).await;
    exec(&conn, LEGACY_USERS_SQL).await;
    exec(&conn, LEGACY_ADMIN_ROW_SQL).await;
    conn.close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    let columns = column_names(store.conn(), "users").await;
    for column in ["discord_id", "discord_refresh_token", "personnel_id"] {
        assert!(
            columns.iter().any(|c| c == column),
            "users missing column {column} after upgrade"
        );
    }

    let admin = Users::find()
        .filter(users::Column::Username.eq("admin"))
        .one(store.conn())
        .await
        .unwrap()
        .expect("admin row lost during upgrade");

    assert_eq!(admin.password_hash.as_deref(), Some("hash1"));
    assert_eq!(admin.display_name, "Admin");
    assert_eq!(admin.role, "admin");
    assert_eq!(admin.created_at, "2023-05-01T00:00:00Z");
    assert!(admin.discord_id.is_none());
    assert!(admin.discord_access_token.is_none());
    assert!(admin.personnel_id.is_none());
}

#[tokio::test]
async fn additive_migration_fills_missing_columns() {
    let path = temp_db_path();

    let conn = raw_connect(&path).await;
    exec(&conn, LEGACY_USERS_SQL).await;
    exec(
        &conn,
        "CREATE TABLE operations (\
            id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
            title TEXT NOT NULL, \
            description TEXT NOT NULL, \
            kind TEXT NOT NULL DEFAULT 'operation', \
            starts_at TEXT NOT NULL, \
            created_by INTEGER NULL REFERENCES users (id)\
        )",
    )
    .await;
    exec(
        &conn,
        "INSERT INTO operations (title, description, starts_at) \
         VALUES ('Operation Castle', 'Night raid rehearsal', '2024-02-01T19:00:00Z')",
    )
    .await;
    conn.close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    let columns = column_names(store.conn(), "operations").await;
    assert!(columns.iter().any(|c| c == "ends_at"));
    assert!(columns.iter().any(|c| c == "image"));

    let op = Operations::find()
        .one(store.conn())
        .await
        .unwrap()
        .expect("operation row lost");
    assert_eq!(op.title, "Operation Castle");
    assert!(op.ends_at.is_none());
    assert!(op.image.is_none());
}

#[tokio::test]
async fn foreign_keys_resolve_after_users_rebuild() {
    let path = temp_db_path();

    let conn = raw_connect(&path).await;
    exec(&conn, LEGACY_USERS_SQL).await;
    exec(&conn, LEGACY_ADMIN_ROW_SQL).await;
    conn.close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    let admin = Users::find()
        .filter(users::Column::Username.eq("admin"))
        .one(store.conn())
        .await
        .unwrap()
        .unwrap();

    store
        .conn()
        .execute_unprepared(&format!(
            "INSERT INTO personnel (name, category, status, joined_at, user_id) \
             VALUES ('J. Miller', 'member', 'active', '2024-01-01T00:00:00Z', {})",
            admin.id
        ))
        .await
        .expect("insert referencing a live user must succeed");

    let dangling = store
        .conn()
        .execute_unprepared(
            "INSERT INTO personnel (name, category, status, joined_at, user_id) \
             VALUES ('Ghost', 'member', 'active', '2024-01-01T00:00:00Z', 9999)",
        )
        .await;
    assert!(dangling.is_err(), "dangling user reference was accepted");
}

#[tokio::test]
async fn stale_shadow_references_are_repaired() {
    let path = temp_db_path();

    let conn = raw_connect(&path).await;
    exec(&conn, LEGACY_USERS_SQL).await;
    exec(&conn, LEGACY_ADMIN_ROW_SQL).await;
    // Definition damage left behind by an interrupted rename: the foreign
    // key clause points at the shadow name instead of the live table.
    exec(
        &conn,
        "CREATE TABLE personnel (\
            id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
            name TEXT NOT NULL, \
            category TEXT NOT NULL DEFAULT 'member', \
            status TEXT NOT NULL DEFAULT 'active', \
            rank TEXT NULL, \
            joined_at TEXT NOT NULL, \
            user_id INTEGER NULL REFERENCES users_old (id)\
        )",
    )
    .await;
    exec(
        &conn,
        "INSERT INTO personnel (name, category, status, joined_at) \
         VALUES ('R. Dane', 'member', 'active', '2023-06-01T00:00:00Z')",
    )
    .await;
    conn.close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    let sql = table_sql(store.conn(), "personnel")
        .await
        .expect("personnel table missing");
    assert!(
        !sql.contains("users_old"),
        "personnel definition still references the shadow table: {sql}"
    );

    let columns = column_names(store.conn(), "personnel").await;
    assert!(columns.iter().any(|c| c == "rank_since"));

    assert_eq!(Personnel::find().count(store.conn()).await.unwrap(), 1);
    let entry = Personnel::find().one(store.conn()).await.unwrap().unwrap();
    assert_eq!(entry.name, "R. Dane");

    let repaired_sql = sql;
    store.conn.clone().close().await.unwrap();

    // Second boot must be a no-op.
    let store = Store::new(&db_url(&path)).await.expect("second run");
    let sql = table_sql(store.conn(), "personnel").await.unwrap();
    assert_eq!(sql, repaired_sql);
    assert_eq!(Personnel::find().count(store.conn()).await.unwrap(), 1);
}

#[tokio::test]
async fn interrupted_rebuild_shadow_is_recovered() {
    let path = temp_db_path();

    // Crash window: users was renamed away and the replacement never built.
    let conn = raw_connect(&path).await;
    exec(
        &conn,
        "CREATE TABLE users_old (\
            id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT, \
            username TEXT NULL UNIQUE, \
            password_hash TEXT NULL, \
            display_name TEXT NOT NULL, \
            role TEXT NOT NULL DEFAULT 'member', \
            created_at TEXT NOT NULL\
        )",
    )
    .await;
    exec(
        &conn,
        "INSERT INTO users_old (username, password_hash, display_name, role, created_at) \
         VALUES ('admin', 'hash1', 'Admin', 'admin', '2023-05-01T00:00:00Z')",
    )
    .await;
    conn.close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("ensure ready");

    let shadow = scalar(
        store.conn(),
        "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'table' AND name = 'users_old'",
    )
    .await;
    assert_eq!(shadow, 0, "shadow table left behind");

    let admin = Users::find()
        .filter(users::Column::Username.eq("admin"))
        .one(store.conn())
        .await
        .unwrap()
        .expect("admin row not recovered from shadow");
    assert_eq!(admin.password_hash.as_deref(), Some("hash1"));
    assert!(admin.discord_id.is_none());
}

#[tokio::test]
async fn orbat_assignments_survive_reseeding() {
    use perscom::db::PersonnelInput;

    let path = temp_db_path();

    let store = Store::new(&db_url(&path)).await.expect("first boot");
    let member = store
        .add_personnel(PersonnelInput::member("A. Hale"))
        .await
        .unwrap();
    store.assign_slot("a1-1-sl", member.id).await.unwrap();
    store.conn.clone().close().await.unwrap();

    let store = Store::new(&db_url(&path)).await.expect("second boot");
    assert_eq!(
        OrbatSlots::find().count(store.conn()).await.unwrap(),
        ORBAT_TEMPLATE.len() as u64
    );

    let slot = OrbatSlots::find_by_id("a1-1-sl".to_string())
        .one(store.conn())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(slot.personnel_id, Some(member.id));
}
