use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::db::repository::prescription;
use crate::models::{
    NewPrescription, NewPrescriptionDetail, PrescriptionLine, PrescriptionWithDetails,
};

#[derive(Deserialize)]
pub struct CreateRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub date_issued: chrono::NaiveDateTime,
    pub notes: Option<String>,
    pub medications: Vec<NewPrescriptionDetail>,
}

/// `POST /api/prescriptions`: prescription plus its medication lines,
/// inserted atomically.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateRequest>,
) -> Result<Json<PrescriptionWithDetails>, ApiError> {
    let mut conn = state.conn()?;
    let created = prescription::create_prescription(
        &mut conn,
        &NewPrescription {
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            date_issued: request.date_issued,
            notes: request.notes,
        },
        &request.medications,
    )?;
    Ok(Json(created))
}

/// `GET /api/prescriptions/:id`
pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<PrescriptionWithDetails>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(prescription::get_prescription(&conn, id)?))
}

#[derive(Deserialize)]
pub struct LinesQuery {
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
}

#[derive(Serialize)]
pub struct LinesResponse {
    pub lines: Vec<PrescriptionLine>,
}

/// `GET /api/prescriptions?doctor_id=1` or `?patient_id=3`
pub async fn lines(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LinesQuery>,
) -> Result<Json<LinesResponse>, ApiError> {
    let conn = state.conn()?;
    let lines = match (query.doctor_id, query.patient_id) {
        (Some(id), _) => prescription::lines_by_doctor(&conn, id)?,
        (_, Some(id)) => prescription::lines_by_patient(&conn, id)?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "doctor_id or patient_id required".into(),
            ))
        }
    };
    Ok(Json(LinesResponse { lines }))
}
