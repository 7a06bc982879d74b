//! Repository layer: entity-scoped database operations.

mod ambulance;
mod doctor;
mod emergency;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use super::DatabaseError;

pub use ambulance::*;
pub use doctor::*;
pub use emergency::*;

/// Storage format for all timestamps. Fixed width so lexical order is
/// chronological order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub(crate) fn now_timestamp() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").unwrap_or_default()
}

fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}

fn parse_optional_uuid(s: Option<String>) -> Result<Option<Uuid>, DatabaseError> {
    s.as_deref().map(parse_uuid).transpose()
}
