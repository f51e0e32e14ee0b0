use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::db::repository::appointment;
use crate::lifecycle;
use crate::models::{Appointment, NewAppointment};

#[derive(Serialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

/// `GET /api/appointments`
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AppointmentsResponse>, ApiError> {
    let conn = state.conn()?;
    let appointments = appointment::list_appointments(&conn)?;
    Ok(Json(AppointmentsResponse { appointments }))
}

/// `GET /api/appointments/:id`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(appointment::get_appointment(&conn, id)?))
}

/// `POST /api/appointments`: created Open, specialty snapshotted from
/// the doctor.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewAppointment>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(lifecycle::create_appointment(&conn, &request)?))
}

#[derive(Deserialize)]
pub struct AssignRequest {
    pub patient_id: i64,
}

/// `POST /api/appointments/:id/assign`
pub async fn assign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<AssignRequest>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(lifecycle::assign_patient(&conn, id, request.patient_id)?))
}

/// `POST /api/appointments/:id/complete`
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(lifecycle::complete_appointment(&conn, id)?))
}

/// `POST /api/appointments/:id/cancel`
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Appointment>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(lifecycle::cancel_appointment(&conn, id)?))
}

#[derive(Serialize)]
pub struct ExpireResponse {
    pub expired: usize,
}

/// `POST /api/appointments/expire`: run the maintenance pass against
/// wall-clock time. Repeat-safe.
pub async fn expire(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExpireResponse>, ApiError> {
    let conn = state.conn()?;
    let now = chrono::Local::now().naive_local();
    let expired = lifecycle::expire_due_appointments(&conn, now)?;
    Ok(Json(ExpireResponse { expired }))
}

/// `DELETE /api/appointments/:id`
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    appointment::delete_appointment(&conn, id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
