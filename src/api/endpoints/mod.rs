pub mod appointments;
pub mod beds;
pub mod doctors;
pub mod health;
pub mod notifications;
pub mod patients;
pub mod prescriptions;
pub mod records;
pub mod reports;
pub mod staff;

use chrono::NaiveDateTime;

use crate::api::ApiError;
use crate::db::DATETIME_FORMAT;

/// Parse a datetime query/body parameter in the storage format.
pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime, ApiError> {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map_err(|_| {
        ApiError::BadRequest(format!(
            "invalid datetime '{s}', expected YYYY-MM-DD HH:MM:SS"
        ))
    })
}
