use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::AppointmentStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: Option<i64>,
    pub doctor_id: i64,
    pub date: NaiveDateTime,
    pub status: AppointmentStatus,
    pub kind: Option<String>,
    /// Snapshot of the doctor's specialty at creation time; never re-synced.
    pub specialty: String,
    pub notes: Option<String>,
}

/// Creation request. Status is always Open on insert; the specialty
/// snapshot is taken from the referenced doctor, not supplied here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub doctor_id: i64,
    pub patient_id: Option<i64>,
    pub date: NaiveDateTime,
    pub kind: Option<String>,
    pub notes: Option<String>,
}
