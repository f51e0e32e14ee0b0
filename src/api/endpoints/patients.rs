use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{ApiError, AppState};
use crate::db::repository::patient;
use crate::models::{NewPatient, Patient};

#[derive(Serialize)]
pub struct PatientsResponse {
    pub patients: Vec<Patient>,
}

/// `GET /api/patients`
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<PatientsResponse>, ApiError> {
    let conn = state.conn()?;
    let patients = patient::list_patients(&conn)?;
    Ok(Json(PatientsResponse { patients }))
}

/// `GET /api/patients/:id`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Patient>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(patient::get_patient(&conn, id)?))
}

/// `POST /api/patients`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(patient::insert_patient(&conn, &request)?))
}

/// `PUT /api/patients/:id`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(patient::update_patient(&conn, id, &request)?))
}
