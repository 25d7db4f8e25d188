//! Specifies how transaction timestamps are shown to clients, e.g. "2025-01-31 14:05:09".
//!
//! The default serializer for [time::OffsetDateTime] includes sub-second
//! precision and the offset, which clients of the JSON API and the export do
//! not need since every timestamp is in UTC.

use serde::Serializer;
use time::{OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Format `timestamp` as "YYYY-MM-DD HH:MM:SS".
pub fn format_timestamp(timestamp: &OffsetDateTime) -> Result<String, time::error::Format> {
    timestamp.format(TIMESTAMP_FORMAT)
}

pub fn serialize<S>(timestamp: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let formatted = format_timestamp(timestamp).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&formatted)
}
