//! Timestamp helpers for TEXT columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC with
//! microsecond precision, so lexical order equals chronological order.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::StorageError;

pub fn to_db_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn now_db_timestamp() -> String {
    to_db_timestamp(&Utc::now())
}

pub fn from_db_timestamp(value: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::InvalidData(format!("timestamp '{}': {}", value, e)))
}
