use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::BedStatus;

/// A bed is Occupied iff both patient_id and assigned_date are set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
    pub id: i64,
    pub ward_id: i64,
    pub patient_id: Option<i64>,
    pub status: BedStatus,
    pub assigned_date: Option<NaiveDateTime>,
}
