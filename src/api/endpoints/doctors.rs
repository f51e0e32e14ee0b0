use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{ApiError, AppState};
use crate::db::repository::doctor;
use crate::models::{Doctor, NewDoctor};

#[derive(Serialize)]
pub struct DoctorsResponse {
    pub doctors: Vec<Doctor>,
}

/// `GET /api/doctors`
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<DoctorsResponse>, ApiError> {
    let conn = state.conn()?;
    let doctors = doctor::list_doctors(&conn)?;
    Ok(Json(DoctorsResponse { doctors }))
}

/// `GET /api/doctors/:id`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(doctor::get_doctor(&conn, id)?))
}

/// `POST /api/doctors`
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewDoctor>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(doctor::insert_doctor(&conn, &request)?))
}

/// `PUT /api/doctors/:id`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<NewDoctor>,
) -> Result<Json<Doctor>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(doctor::update_doctor(&conn, id, &request)?))
}

/// `DELETE /api/doctors/:id`: rejected while other rows reference the doctor.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conn = state.conn()?;
    doctor::delete_doctor(&conn, id)?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
