use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistory {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub record_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMedicalHistory {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub record_date: NaiveDateTime,
}

/// History row joined with the doctor and patient names, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicalHistoryEntry {
    pub id: i64,
    pub diagnosis: String,
    pub treatment: Option<String>,
    pub record_date: NaiveDateTime,
    pub doctor_name: String,
    pub patient_name: String,
}
