use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    /// Free-form records summary carried over from paper intake.
    pub records: String,
    pub phone: Option<String>,
    pub email: String,
    pub doctor_id: Option<i64>,
    pub staff_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub records: String,
    pub phone: Option<String>,
    pub email: String,
    pub doctor_id: Option<i64>,
    pub staff_id: Option<i64>,
}
