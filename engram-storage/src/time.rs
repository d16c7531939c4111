//! Timestamp codec: fixed-width RFC3339 UTC with millisecond precision,
//! so stored strings compare lexicographically in query predicates.

use chrono::{DateTime, SecondsFormat, Utc};

use engram_core::errors::StorageError;
use engram_core::EngramResult;

pub fn now_str() -> String {
    to_str(Utc::now())
}

pub fn to_str(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(s: &str) -> EngramResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            StorageError::Integrity {
                details: format!("bad timestamp {s:?}: {e}"),
            }
            .into()
        })
}

pub fn parse_opt(s: Option<String>) -> EngramResult<Option<DateTime<Utc>>> {
    s.map(|v| parse(&v)).transpose()
}
