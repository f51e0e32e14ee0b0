//! Clinical record endpoints: medical history and test records.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::db::repository::{medical_history, test_record};
use crate::models::{
    MedicalHistory, MedicalHistoryEntry, NewMedicalHistory, NewTestRecord, TestRecord,
};

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub doctor_id: Option<i64>,
    pub patient_id: Option<i64>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub entries: Vec<MedicalHistoryEntry>,
}

/// `GET /api/history?doctor_id=1` or `?patient_id=3`: entries joined
/// with doctor and patient names.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let conn = state.conn()?;
    let entries = match (query.doctor_id, query.patient_id) {
        (Some(id), _) => medical_history::entries_by_doctor(&conn, id)?,
        (_, Some(id)) => medical_history::entries_by_patient(&conn, id)?,
        (None, None) => {
            return Err(ApiError::BadRequest(
                "doctor_id or patient_id required".into(),
            ))
        }
    };
    Ok(Json(HistoryResponse { entries }))
}

/// `POST /api/history`
pub async fn create_history(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewMedicalHistory>,
) -> Result<Json<MedicalHistory>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(medical_history::insert_medical_history(&conn, &request)?))
}

#[derive(Serialize)]
pub struct TestRecordsResponse {
    pub records: Vec<TestRecord>,
}

/// `GET /api/patients/:id/tests`
pub async fn tests_for_patient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<TestRecordsResponse>, ApiError> {
    let conn = state.conn()?;
    let records = test_record::list_test_records_for_patient(&conn, id)?;
    Ok(Json(TestRecordsResponse { records }))
}

/// `POST /api/tests`
pub async fn create_test(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewTestRecord>,
) -> Result<Json<TestRecord>, ApiError> {
    let conn = state.conn()?;
    Ok(Json(test_record::insert_test_record(&conn, &request)?))
}
