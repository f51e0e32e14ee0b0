use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{format_datetime, DatabaseError};
use crate::models::{Notification, NotificationStatus, Recipient, RecipientType};

/// Raw insert. Recipient validation happens in the notify module;
/// this is the INSERT it shares with the seed path.
pub fn insert_notification(
    conn: &Connection,
    recipient: Recipient,
    message: &str,
    created_at: NaiveDateTime,
) -> Result<Notification, DatabaseError> {
    conn.execute(
        "INSERT INTO Notifications (Recipient_Type, Recipient_ID, Message, Status, Created_At)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            recipient.kind().as_str(),
            recipient.id(),
            message,
            NotificationStatus::Unread.as_str(),
            format_datetime(created_at),
        ],
    )?;
    get_notification(conn, conn.last_insert_rowid())
}

pub fn get_notification(conn: &Connection, id: i64) -> Result<Notification, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT Notification_ID, Recipient_Type, Recipient_ID, Message, Status, Created_At, Read_At
             FROM Notifications WHERE Notification_ID = ?1",
            params![id],
            notification_row,
        )
        .optional()?;
    match row {
        Some(raw) => notification_from_row(raw),
        None => Err(DatabaseError::NotFound { entity: "notification", id }),
    }
}

pub fn list_for_recipient(
    conn: &Connection,
    recipient: Recipient,
) -> Result<Vec<Notification>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT Notification_ID, Recipient_Type, Recipient_ID, Message, Status, Created_At, Read_At
         FROM Notifications
         WHERE Recipient_Type = ?1 AND Recipient_ID = ?2
         ORDER BY Created_At",
    )?;
    let rows = stmt.query_map(
        params![recipient.kind().as_str(), recipient.id()],
        notification_row,
    )?;

    let mut notifications = Vec::new();
    for row in rows {
        notifications.push(notification_from_row(row?)?);
    }
    Ok(notifications)
}

type RawNotification = (
    i64,
    String,
    i64,
    String,
    String,
    NaiveDateTime,
    Option<NaiveDateTime>,
);

fn notification_row(row: &rusqlite::Row<'_>) -> Result<RawNotification, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get::<_, NaiveDateTime>(5)?,
        row.get::<_, Option<NaiveDateTime>>(6)?,
    ))
}

fn notification_from_row(raw: RawNotification) -> Result<Notification, DatabaseError> {
    let (id, kind, recipient_id, message, status, created_at, read_at) = raw;
    Ok(Notification {
        id,
        recipient: Recipient::new(RecipientType::from_str(&kind)?, recipient_id),
        message,
        status: NotificationStatus::from_str(&status)?,
        created_at,
        read_at,
    })
}
