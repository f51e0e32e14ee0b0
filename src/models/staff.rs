use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub name: String,
    pub department: String,
    /// Unique across staff; duplicates are rejected by the store.
    pub email: String,
    pub hire_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaff {
    pub name: String,
    pub department: String,
    pub email: String,
    pub hire_date: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffShift {
    pub id: i64,
    pub staff_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStaffShift {
    pub staff_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
