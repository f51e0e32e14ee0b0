//! Report endpoints: one route per catalog question, all pure reads.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::endpoints::parse_datetime;
use crate::api::{ApiError, AppState};
use crate::models::{Appointment, Doctor, Patient, Staff, StaffShift};
use crate::reports::{self, CatalogEntry, DoctorSpecialty};

#[derive(Serialize)]
pub struct CatalogResponse {
    pub questions: &'static [CatalogEntry],
}

/// `GET /api/reports/catalog`
pub async fn catalog() -> Json<CatalogResponse> {
    Json(CatalogResponse {
        questions: reports::catalog(),
    })
}

#[derive(Deserialize)]
pub struct SpecialtyQuery {
    pub specialty: String,
}

#[derive(Deserialize)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Deserialize)]
pub struct DepartmentQuery {
    pub department: String,
}

#[derive(Deserialize)]
pub struct StaffIdQuery {
    pub staff_id: i64,
    /// Defaults to wall-clock now when omitted.
    pub after: Option<String>,
}

#[derive(Deserialize)]
pub struct DoctorIdQuery {
    pub doctor_id: i64,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

/// `GET /api/reports/doctors-by-specialty?specialty=Cardiologist`
pub async fn doctors_by_specialty(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpecialtyQuery>,
) -> Result<Json<Vec<Doctor>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::doctors_by_specialty(&conn, &query.specialty)?))
}

/// `GET /api/reports/doctors-with-specialties`
pub async fn doctors_with_specialties(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DoctorSpecialty>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::doctors_with_specialties(&conn)?))
}

/// `GET /api/reports/doctor-email?name=Dr.%20John%20Smith`
pub async fn doctor_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Option<String>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::doctor_email_by_name(&conn, &query.name)?))
}

/// `GET /api/reports/staff-by-department?department=Nursing`
pub async fn staff_by_department(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DepartmentQuery>,
) -> Result<Json<Vec<Staff>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::staff_by_department(&conn, &query.department)?))
}

/// `GET /api/reports/upcoming-shifts?staff_id=1`
pub async fn upcoming_shifts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StaffIdQuery>,
) -> Result<Json<Vec<StaffShift>>, ApiError> {
    let after = match &query.after {
        Some(s) => parse_datetime(s)?,
        None => chrono::Local::now().naive_local(),
    };
    let conn = state.conn()?;
    Ok(Json(reports::upcoming_shifts_for_staff(
        &conn,
        query.staff_id,
        after,
    )?))
}

/// `GET /api/reports/doctor-for-patient?name=Tom%20Harris`
pub async fn doctor_for_patient(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Option<Doctor>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::doctor_for_patient(&conn, &query.name)?))
}

/// `GET /api/reports/patients-of-doctor?doctor_id=1`
pub async fn patients_of_doctor(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorIdQuery>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::patients_of_doctor(&conn, query.doctor_id)?))
}

/// `GET /api/reports/patient-email?name=Tom%20Harris`
pub async fn patient_email(
    State(state): State<Arc<AppState>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Option<String>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::patient_email_by_name(&conn, &query.name)?))
}

/// `GET /api/reports/appointments-for-doctor?doctor_id=1`
pub async fn appointments_for_doctor(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DoctorIdQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::appointments_for_doctor(&conn, query.doctor_id)?))
}

/// `GET /api/reports/appointments-in-range?from=...&to=...`
pub async fn appointments_in_range(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let from = parse_datetime(&query.from)?;
    let to = parse_datetime(&query.to)?;
    let conn = state.conn()?;
    Ok(Json(reports::appointments_in_range(&conn, from, to)?))
}

/// `GET /api/reports/appointments-by-specialty?specialty=Cardiologist`
pub async fn appointments_by_specialty(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SpecialtyQuery>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(reports::appointments_by_specialty(&conn, &query.specialty)?))
}
