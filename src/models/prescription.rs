use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date_issued: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrescription {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date_issued: NaiveDateTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionDetail {
    pub id: i64,
    pub prescription_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPrescriptionDetail {
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionWithDetails {
    pub prescription: Prescription,
    pub details: Vec<PrescriptionDetail>,
}

/// Prescription joined with doctor/patient names and one medication
/// row per line, the shape the front-end tables render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionLine {
    pub prescription_id: i64,
    pub doctor_name: String,
    pub patient_name: String,
    pub date_issued: NaiveDateTime,
    pub notes: Option<String>,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub duration: String,
}
