pub mod activity;
pub mod orbat;
pub mod personnel;

use thiserror::Error;

/// Errors surfaced by the invariant-enforcing repositories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,

    #[error("Only members carry a rank")]
    RankRequiresMember,

    #[error("Slot '{0}' is not a role slot and cannot take an assignment")]
    SlotNotAssignable(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for StoreError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}
