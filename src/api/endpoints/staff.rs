use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::api::{ApiError, AppState};
use crate::db::repository::staff;
use crate::models::{NewStaff, NewStaffShift, Staff, StaffShift};

#[derive(Serialize)]
pub struct StaffResponse {
    pub staff: Vec<Staff>,
}

#[derive(Serialize)]
pub struct ShiftsResponse {
    pub shifts: Vec<StaffShift>,
}

/// `GET /api/staff`
pub async fn list(State(state): State<Arc<AppState>>) -> Result<Json<StaffResponse>, ApiError> {
    let conn = state.conn()?;
    let staff = staff::list_staff(&conn)?;
    Ok(Json(StaffResponse { staff }))
}

/// `GET /api/staff/:id`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Staff>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(staff::get_staff_member(&conn, id)?))
}

/// `POST /api/staff`: duplicate emails come back as 422.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewStaff>,
) -> Result<Json<Staff>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(staff::insert_staff(&conn, &request)?))
}

/// `GET /api/staff/:id/shifts`
pub async fn shifts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<ShiftsResponse>, ApiError> {
    let conn = state.conn()?;
    let shifts = staff::list_shifts_for_staff(&conn, id)?;
    Ok(Json(ShiftsResponse { shifts }))
}

/// `POST /api/staff/:id/shifts`
pub async fn create_shift(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(request): Json<ShiftRequest>,
) -> Result<Json<StaffShift>, ApiError> {
    let conn = state.conn()?;
    let shift = staff::insert_staff_shift(
        &conn,
        &NewStaffShift {
            staff_id: id,
            start: request.start,
            end: request.end,
        },
    )?;
    Ok(Json(shift))
}

#[derive(serde::Deserialize)]
pub struct ShiftRequest {
    pub start: chrono::NaiveDateTime,
    pub end: chrono::NaiveDateTime,
}
