use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::error::AppError;

pub(crate) const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub(crate) mod iso_date {
    use serde::Serializer;
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        let text = date
            .format(super::DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

/// Closed set of per-day attendance values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "Full Day")]
    FullDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    #[serde(rename = "Absent")]
    Absent,
    #[serde(rename = "Holiday")]
    Holiday,
}

impl AttendanceStatus {
    pub const ALL: [AttendanceStatus; 4] = [
        AttendanceStatus::FullDay,
        AttendanceStatus::HalfDay,
        AttendanceStatus::Absent,
        AttendanceStatus::Holiday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::FullDay => "Full Day",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::Absent => "Absent",
            AttendanceStatus::Holiday => "Holiday",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttendanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::InvalidStatus(s.to_string()))
    }
}

pub fn parse_date(s: &str) -> Result<Date, AppError> {
    Date::parse(s.trim(), DATE_FORMAT).map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// One attendance entry; unique per (user, date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub status: AttendanceStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Raw row as stored; `status` is TEXT guarded by a CHECK constraint.
#[derive(Debug, FromRow)]
pub struct AttendanceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub date: Date,
    pub status: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = AppError;

    fn try_from(r: AttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user: r.user_id,
            date: r.date,
            status: r.status.parse()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
