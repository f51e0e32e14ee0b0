use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::db::repository::ward;
use crate::models::Bed;
use crate::occupancy::{self, OccupancyViolation};

#[derive(Serialize)]
pub struct BedsResponse {
    pub beds: Vec<Bed>,
}

/// `GET /api/beds/available`
pub async fn available(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BedsResponse>, ApiError> {
    let conn = state.conn()?;
    let beds = ward::list_available_beds(&conn)?;
    Ok(Json(BedsResponse { beds }))
}

/// `GET /api/beds/occupied`
pub async fn occupied(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BedsResponse>, ApiError> {
    let conn = state.conn()?;
    let beds = ward::list_occupied_beds(&conn)?;
    Ok(Json(BedsResponse { beds }))
}

#[derive(Deserialize)]
pub struct AssignBedRequest {
    pub patient_id: i64,
    pub ward_id: i64,
}

/// `POST /api/beds/assign`: lowest available bed in the ward; a full
/// ward comes back as 409 NO_CAPACITY.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssignBedRequest>,
) -> Result<Json<Bed>, ApiError> {
    let mut conn = state.conn()?;
    let now = chrono::Local::now().naive_local();
    let bed = occupancy::assign_bed(&mut conn, request.patient_id, request.ward_id, now)?;
    Ok(Json(bed))
}

/// `POST /api/beds/:id/release`
pub async fn release(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Bed>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(occupancy::release_bed(&conn, id)?))
}

#[derive(Serialize)]
pub struct InvariantsResponse {
    pub violations: Vec<OccupancyViolation>,
}

/// `GET /api/beds/invariants`: diagnostic occupancy scan.
pub async fn invariants(
    State(state): State<Arc<AppState>>,
) -> Result<Json<InvariantsResponse>, ApiError> {
    let conn = state.conn()?;
    let violations = occupancy::check_invariants(&conn)?;
    Ok(Json(InvariantsResponse { violations }))
}
