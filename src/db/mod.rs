pub mod repository;
pub mod seed;
pub mod sqlite;

pub use sqlite::*;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Storage format for all datetime columns (the seed-data contract).
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a datetime the way the schema stores it. Sub-second precision
/// is dropped so stored values stay lexicographically comparable.
pub fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("No available bed in ward {ward_id}")]
    NoCapacity { ward_id: i64 },

    #[error("Patient {patient_id} already occupies bed {bed_id}")]
    AlreadyAssigned { patient_id: i64, bed_id: i64 },

    #[error("Notification {0} is already marked read")]
    AlreadyRead(i64),

    #[error("Concurrent update lost the race: {0}")]
    Conflict(&'static str),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        // Foreign key, UNIQUE and CHECK failures surface as recoverable
        // constraint violations rather than opaque storage errors.
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| e.to_string()),
                )
            }
            _ => DatabaseError::Sqlite(err),
        }
    }
}
