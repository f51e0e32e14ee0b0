use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::{ApiError, AppState};
use crate::models::{Notification, Recipient, RecipientType};
use crate::notify;

#[derive(Deserialize)]
pub struct SendRequest {
    pub recipient: Recipient,
    pub message: String,
}

/// `POST /api/notifications`: the recipient must resolve to an
/// existing doctor, patient or staff member.
pub async fn send(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendRequest>,
) -> Result<Json<Notification>, ApiError> {
    let conn = state.conn()?;
    let now = chrono::Local::now().naive_local();
    let sent = notify::send_notification(&conn, request.recipient, &request.message, now)?;
    Ok(Json(sent))
}

/// `POST /api/notifications/:id/read`
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Notification>, ApiError> {
    let conn = state.conn()?;
    let now = chrono::Local::now().naive_local();
    Ok(Json(notify::mark_read(&conn, id, now)?))
}

#[derive(Deserialize)]
pub struct RecipientQuery {
    /// "Doctor", "Patient" or "Staff"
    pub recipient_type: String,
    pub recipient_id: i64,
}

#[derive(Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
}

/// `GET /api/notifications?recipient_type=Doctor&recipient_id=1`
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipientQuery>,
) -> Result<Json<NotificationsResponse>, ApiError> {
    let kind = RecipientType::from_str(&query.recipient_type)
        .map_err(|_| ApiError::BadRequest(format!("unknown recipient type '{}'", query.recipient_type)))?;
    let conn = state.conn()?;
    let notifications =
        notify::notifications_for(&conn, Recipient::new(kind, query.recipient_id))?;
    Ok(Json(NotificationsResponse { notifications }))
}
