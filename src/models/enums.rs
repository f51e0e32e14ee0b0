use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Stored with the exact casing the seed data uses.
str_enum!(BedStatus {
    Available => "Available",
    Occupied => "Occupied",
});

str_enum!(NotificationStatus {
    Unread => "Unread",
    Read => "Read",
});

str_enum!(RecipientType {
    Doctor => "Doctor",
    Patient => "Patient",
    Staff => "Staff",
});

/// Appointment status, persisted as the integer codes the seed data uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Open,
    Scheduled,
    Completed,
    Cancelled,
    Expired,
}

impl AppointmentStatus {
    pub fn code(&self) -> i64 {
        match self {
            Self::Open => 0,
            Self::Scheduled => 1,
            Self::Completed => 2,
            Self::Cancelled => 3,
            Self::Expired => 4,
        }
    }

    pub fn from_code(code: i64) -> Result<Self, DatabaseError> {
        match code {
            0 => Ok(Self::Open),
            1 => Ok(Self::Scheduled),
            2 => Ok(Self::Completed),
            3 => Ok(Self::Cancelled),
            4 => Ok(Self::Expired),
            _ => Err(DatabaseError::InvalidEnum {
                field: "AppointmentStatus".into(),
                value: code.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::Scheduled => "Scheduled",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Expired => "Expired",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }
}
