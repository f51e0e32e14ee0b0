use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::{NotificationStatus, RecipientType};

/// Notification recipient as a tagged union. The store keeps the loose
/// (Recipient_Type, Recipient_ID) pair for seed compatibility; this type
/// is what crosses the write boundary, where the id is validated against
/// the matching entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum Recipient {
    Doctor(i64),
    Patient(i64),
    Staff(i64),
}

impl Recipient {
    pub fn kind(&self) -> RecipientType {
        match self {
            Self::Doctor(_) => RecipientType::Doctor,
            Self::Patient(_) => RecipientType::Patient,
            Self::Staff(_) => RecipientType::Staff,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Doctor(id) | Self::Patient(id) | Self::Staff(id) => *id,
        }
    }

    pub fn new(kind: RecipientType, id: i64) -> Self {
        match kind {
            RecipientType::Doctor => Self::Doctor(id),
            RecipientType::Patient => Self::Patient(id),
            RecipientType::Staff => Self::Staff(id),
        }
    }
}

/// read_at is Some iff status is Read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient: Recipient,
    pub message: String,
    pub status: NotificationStatus,
    pub created_at: NaiveDateTime,
    pub read_at: Option<NaiveDateTime>,
}
