pub mod config;
pub mod constants;
pub mod db;
pub mod entities;
pub mod orbat;

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, Statement,
};

pub use config::Config;
use db::{PersonnelInput, Store, StoreError};
use entities::prelude::*;
use entities::{orbat_slots, users};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_help();
        return Ok(());
    }

    match args[1].as_str() {
        "migrate" | "up" => cmd_migrate(&config).await,

        "status" => cmd_status(&config).await,

        "orbat" => cmd_orbat(&config).await,

        "roster" | "ls" => cmd_roster(&config).await,

        "enlist" => {
            if args.len() < 3 {
                println!("Usage: perscom enlist <name> [--civilian]");
                println!("Example: perscom enlist \"J. Miller\"");
                return Ok(());
            }
            let civilian = args.iter().any(|a| a == "--civilian");
            let name = args[2..]
                .iter()
                .filter(|a| !a.starts_with("--"))
                .cloned()
                .collect::<Vec<_>>()
                .join(" ");
            cmd_enlist(&config, &name, civilian).await
        }

        "assign" => {
            if args.len() < 4 {
                println!("Usage: perscom assign <slot_id> <personnel_id>");
                println!("Use 'perscom orbat' to see slot ids");
                return Ok(());
            }
            cmd_assign(&config, &args[2], &args[3]).await
        }

        "clear-slot" => {
            if args.len() < 3 {
                println!("Usage: perscom clear-slot <slot_id>");
                return Ok(());
            }
            cmd_clear_slot(&config, &args[2]).await
        }

        "create-admin" => {
            if args.len() < 3 {
                println!("Usage: perscom create-admin <username>");
                return Ok(());
            }
            cmd_create_admin(&config, &args[2]).await
        }

        "prune" => {
            let days = args
                .get(2)
                .and_then(|s| s.parse().ok())
                .unwrap_or(config.retention.activity_log_days);
            cmd_prune(&config, days).await
        }

        "init" | "--init" => {
            Config::create_default_if_missing()?;
            println!("✓ Config file created. Edit config.toml and run again.");
            Ok(())
        }

        "help" | "-h" | "--help" => {
            print_help();
            Ok(())
        }

        _ => {
            println!("Unknown command: {}", args[1]);
            println!();
            print_help();
            Ok(())
        }
    }
}

fn print_help() {
    println!("PERSCOM - Personnel Management Store");
    println!("Schema, migrations, and roster data for the unit");
    println!();
    println!("USAGE:");
    println!("  perscom <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  migrate            Bring the database to the current schema");
    println!("  status             Show applied migrations and row counts");
    println!("  orbat              Print the organizational tree");
    println!("  roster, ls         List personnel");
    println!("  enlist <name>      Add a roster entry (--civilian for staff)");
    println!("  assign <slot> <id> Assign personnel to a role slot");
    println!("  clear-slot <slot>  Clear a role slot assignment");
    println!("  create-admin <u>   Bootstrap a local admin account");
    println!("  prune [days]       Delete old activity-log entries");
    println!("  init               Create default config file");
    println!("  help               Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  perscom migrate                   # First boot / after upgrade");
    println!("  perscom enlist \"J. Miller\"        # Add a member");
    println!("  perscom assign a1-1-sl 1          # Make personnel #1 squad leader");
    println!("  perscom prune 30                  # Drop log entries older than 30 days");
    println!();
    println!("CONFIG:");
    println!("  Edit config.toml, or set PERSCOM_DATABASE_PATH to move the database.");
}

async fn applied_versions(store: &Store) -> anyhow::Result<Vec<String>> {
    let backend = store.conn().get_database_backend();
    let rows = store
        .conn()
        .query_all(Statement::from_string(
            backend,
            "SELECT version FROM seaql_migrations ORDER BY version".to_string(),
        ))
        .await?;

    let mut versions = Vec::new();
    for row in rows {
        let version: String = row.try_get("", "version")?;
        versions.push(version);
    }
    Ok(versions)
}

async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let versions = applied_versions(&store).await?;

    println!("✓ Database ready ({} migrations applied)", versions.len());
    for version in versions {
        println!("  - {version}");
    }

    Ok(())
}

async fn cmd_status(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let versions = applied_versions(&store).await?;

    let users = Users::find().count(store.conn()).await?;
    let personnel = Personnel::find().count(store.conn()).await?;
    let operations = Operations::find().count(store.conn()).await?;
    let slots = OrbatSlots::find().count(store.conn()).await?;
    let filled = OrbatSlots::find()
        .filter(orbat_slots::Column::PersonnelId.is_not_null())
        .count(store.conn())
        .await?;

    println!("Database: {}", config.general.database_path);
    println!("{:-<60}", "");
    println!("Migrations applied: {}", versions.len());
    if let Some(latest) = versions.last() {
        println!("Latest:             {latest}");
    }
    println!("Users:              {users}");
    println!("Personnel:          {personnel}");
    println!("Operations:         {operations}");
    println!("ORBAT slots:        {slots} ({filled} filled)");

    Ok(())
}

fn print_slot(
    slot: &orbat_slots::Model,
    depth: usize,
    by_parent: &HashMap<String, Vec<&orbat_slots::Model>>,
    names: &HashMap<i32, String>,
) {
    let indent = "  ".repeat(depth);
    let callsign = slot
        .callsign
        .as_deref()
        .map(|c| format!(" \"{c}\""))
        .unwrap_or_default();

    if slot.kind == "role" {
        let occupant = slot
            .personnel_id
            .and_then(|id| names.get(&id).cloned())
            .unwrap_or_else(|| "vacant".to_string());
        println!("{indent}{} [{}]", slot.name, occupant);
    } else {
        println!("{indent}{}{} ({})", slot.name, callsign, slot.kind);
    }

    if let Some(children) = by_parent.get(&slot.id) {
        for child in children {
            print_slot(child, depth + 1, by_parent, names);
        }
    }
}

async fn cmd_orbat(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let slots = store.orbat_tree().await?;
    let personnel = store.list_personnel().await?;

    let names: HashMap<i32, String> = personnel.into_iter().map(|p| (p.id, p.name)).collect();

    let mut by_parent: HashMap<String, Vec<&orbat_slots::Model>> = HashMap::new();
    for slot in &slots {
        if let Some(parent) = &slot.parent_id {
            by_parent.entry(parent.clone()).or_default().push(slot);
        }
    }

    for root in slots.iter().filter(|s| s.parent_id.is_none()) {
        print_slot(root, 0, &by_parent, &names);
    }

    Ok(())
}

async fn cmd_roster(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let personnel = store.list_personnel().await?;

    if personnel.is_empty() {
        println!("Roster is empty.");
        println!();
        println!("Add personnel with: perscom enlist \"<name>\"");
        return Ok(());
    }

    println!("Roster ({} total)", personnel.len());
    println!("{:-<60}", "");

    for p in personnel {
        let rank = p.rank.as_deref().unwrap_or("(no rank)");
        println!("• {} - {}", p.name, rank);
        println!(
            "  ID: {} | Category: {} | Status: {} | Joined: {}",
            p.id, p.category, p.status, p.joined_at
        );
    }

    Ok(())
}

async fn cmd_enlist(config: &Config, name: &str, civilian: bool) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let category = if civilian {
        constants::roster::category::CIVILIAN
    } else {
        constants::roster::category::MEMBER
    };

    let input = PersonnelInput {
        name: name.to_string(),
        category: category.to_string(),
        status: constants::roster::status::ACTIVE.to_string(),
        rank: None,
        user_id: None,
    };

    let entry = store.add_personnel(input).await?;
    store
        .log_activity(
            None,
            "personnel.enlist",
            Some(serde_json::json!({ "personnel_id": entry.id }).to_string()),
        )
        .await?;

    println!("✓ Enlisted: {} (ID: {})", entry.name, entry.id);
    println!("  Category: {} | Status: {}", entry.category, entry.status);

    Ok(())
}

async fn cmd_assign(config: &Config, slot_id: &str, id_str: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let personnel_id: i32 = match id_str.parse() {
        Ok(id) => id,
        Err(_) => {
            println!("Invalid personnel ID: {id_str}");
            println!("Use 'perscom roster' to see IDs.");
            return Ok(());
        }
    };

    match store.assign_slot(slot_id, personnel_id).await {
        Ok(slot) => {
            store
                .log_activity(
                    None,
                    "orbat.assign",
                    Some(
                        serde_json::json!({ "slot": slot.id, "personnel_id": personnel_id })
                            .to_string(),
                    ),
                )
                .await?;
            println!("✓ Assigned personnel #{personnel_id} to {}", slot.name);
        }
        Err(StoreError::SlotNotAssignable(id)) => {
            println!("Slot '{id}' is not a role slot and cannot take an assignment.");
        }
        Err(StoreError::NotFound) => {
            println!("Slot or personnel not found.");
            println!("Use 'perscom orbat' and 'perscom roster' to see ids.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn cmd_clear_slot(config: &Config, slot_id: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    match store.clear_slot(slot_id).await {
        Ok(slot) => {
            store
                .log_activity(
                    None,
                    "orbat.clear",
                    Some(serde_json::json!({ "slot": slot.id }).to_string()),
                )
                .await?;
            println!("✓ Cleared {}", slot.name);
        }
        Err(StoreError::SlotNotAssignable(id)) => {
            println!("Slot '{id}' is not a role slot.");
        }
        Err(StoreError::NotFound) => {
            println!("Slot '{slot_id}' not found.");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn hash_password(password: &str) -> anyhow::Result<String> {
    use argon2::{
        Argon2,
        password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    Ok(argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?
        .to_string())
}

async fn cmd_create_admin(config: &Config, username: &str) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;

    let existing = Users::find()
        .filter(users::Column::Username.eq(username))
        .one(store.conn())
        .await?;

    if existing.is_some() {
        println!("User '{username}' already exists.");
        return Ok(());
    }

    println!("Enter password for {username}:");
    let mut password = String::new();
    std::io::stdin().read_line(&mut password)?;
    let password = password.trim();

    if password.is_empty() {
        println!("Password cannot be empty.");
        return Ok(());
    }

    let user = users::ActiveModel {
        username: Set(Some(username.to_string())),
        password_hash: Set(Some(hash_password(password)?)),
        display_name: Set(username.to_string()),
        role: Set(constants::roles::ADMIN.to_string()),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let user = user.insert(store.conn()).await?;
    store.log_activity(Some(user.id), "user.bootstrap", None).await?;

    println!("✓ Created admin account '{username}' (ID: {})", user.id);

    Ok(())
}

async fn cmd_prune(config: &Config, days: i64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let removed = store.prune_activity_log(days).await?;

    println!("✓ Pruned {removed} activity-log entries older than {days} days");

    Ok(())
}
