//! Per-entity SQL. Free functions over `&Connection`; the lifecycle,
//! occupancy and notification modules own the stateful mutations.

pub mod appointment;
pub mod doctor;
pub mod medical_history;
pub mod notification;
pub mod patient;
pub mod prescription;
pub mod staff;
pub mod test_record;
pub mod ward;
