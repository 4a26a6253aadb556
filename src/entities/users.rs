use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Login name for local accounts; absent for Discord-only accounts.
    #[sea_orm(unique)]
    pub username: Option<String>,

    /// Argon2id password hash, local accounts only
    pub password_hash: Option<String>,

    pub display_name: String,

    /// One of `admin`, `moderator`, `member`
    #[sea_orm(default_value = "member")]
    pub role: String,

    pub created_at: String,

    /// Discord snowflake. Presence marks an externally linked account.
    #[sea_orm(unique)]
    pub discord_id: Option<String>,

    pub discord_username: Option<String>,

    pub discord_avatar: Option<String>,

    pub discord_access_token: Option<String>,

    pub discord_refresh_token: Option<String>,

    /// Roster entry this login belongs to. Plain column, not a foreign key:
    /// personnel already carries the enforced user_id edge and a second
    /// constraint would make the two tables mutually dependent.
    pub personnel_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
