//! Notification write boundary.
//!
//! The schema keeps the recipient as a loose (type, id) pair with no
//! foreign key; this module is where that advisory reference becomes a
//! checked one. Sends validate the recipient against the matching
//! entity table, and read-marking is a one-way Unread → Read step.

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use crate::db::repository::{doctor, notification, patient, staff};
use crate::db::{format_datetime, DatabaseError};
use crate::models::{Notification, NotificationStatus, Recipient};

/// Create a notification after resolving the recipient.
pub fn send_notification(
    conn: &Connection,
    recipient: Recipient,
    message: &str,
    now: NaiveDateTime,
) -> Result<Notification, DatabaseError> {
    match recipient {
        Recipient::Doctor(id) => {
            doctor::get_doctor(conn, id)?;
        }
        Recipient::Patient(id) => {
            patient::get_patient(conn, id)?;
        }
        Recipient::Staff(id) => {
            staff::get_staff_member(conn, id)?;
        }
    }

    let created = notification::insert_notification(conn, recipient, message, now)?;
    tracing::info!(
        notification_id = created.id,
        recipient_type = recipient.kind().as_str(),
        recipient_id = recipient.id(),
        "notification sent"
    );
    Ok(created)
}

/// Mark a notification read, stamping Read_At. Marking twice is a
/// reported `AlreadyRead` error rather than a silent no-op, so callers
/// can surface the duplicate action.
pub fn mark_read(
    conn: &Connection,
    notification_id: i64,
    now: NaiveDateTime,
) -> Result<Notification, DatabaseError> {
    let current = notification::get_notification(conn, notification_id)?;
    if current.status == NotificationStatus::Read {
        return Err(DatabaseError::AlreadyRead(notification_id));
    }

    let changed = conn.execute(
        "UPDATE Notifications SET Status = ?1, Read_At = ?2
         WHERE Notification_ID = ?3 AND Status = ?4",
        params![
            NotificationStatus::Read.as_str(),
            format_datetime(now),
            notification_id,
            NotificationStatus::Unread.as_str(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::Conflict("notification status changed concurrently"));
    }
    notification::get_notification(conn, notification_id)
}

/// All notifications for one recipient, oldest first.
pub fn notifications_for(
    conn: &Connection,
    recipient: Recipient,
) -> Result<Vec<Notification>, DatabaseError> {
    notification::list_for_recipient(conn, recipient)
}
