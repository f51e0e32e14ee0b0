use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: i64,
    pub patient_id: i64,
    pub name: Option<String>,
    pub test_date: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTestRecord {
    pub patient_id: i64,
    pub name: Option<String>,
    pub test_date: Option<NaiveDateTime>,
    pub remarks: Option<String>,
}
