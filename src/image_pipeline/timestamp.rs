//! Timestamp normalization
//!
//! Converts the ISO-8601 shapes found in XMP into the `YYYY:MM:DD HH:MM:SS`
//! form used by every date-bearing TIFF tag. Offsets are dropped without
//! converting: the wall-clock fields are kept as written.

use chrono::{DateTime, NaiveDateTime};
use thiserror::Error;

/// Output shape shared by DateTime and DateTimeOriginal.
pub const CANONICAL_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

const ISO_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const ISO_OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("unparseable")]
    Unparseable { input: String },
}

/// Normalizes `input` to [`CANONICAL_FORMAT`].
///
/// Shapes are tried in order: offset-bearing ISO-8601, plain ISO-8601,
/// ISO-8601 with fractional seconds (truncated), and finally a value that is
/// already canonical.
pub fn normalize(input: &str) -> Result<String, TimestampError> {
    parse_wall_clock(input.trim())
        .map(|dt| format_canonical(&dt))
        .ok_or_else(|| TimestampError::Unparseable {
            input: input.to_string(),
        })
}

pub fn format_canonical(dt: &NaiveDateTime) -> String {
    dt.format(CANONICAL_FORMAT).to_string()
}

/// `+` anywhere, a trailing `Z`, or a `-` past the date's own separators
/// (index 7 is the last one in `YYYY-MM-DD`).
pub fn has_utc_offset(value: &str) -> bool {
    value.contains('+')
        || value.ends_with('Z')
        || value.get(8..).is_some_and(|rest| rest.contains('-'))
}

fn parse_wall_clock(value: &str) -> Option<NaiveDateTime> {
    if has_utc_offset(value) {
        if let Some(dt) = parse_with_offset(value) {
            return Some(dt);
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, ISO_FORMAT) {
        return Some(dt);
    }

    if let Some((whole_seconds, _fraction)) = value.split_once('.') {
        if let Ok(dt) = NaiveDateTime::parse_from_str(whole_seconds, ISO_FORMAT) {
            return Some(dt);
        }
    }

    NaiveDateTime::parse_from_str(value, CANONICAL_FORMAT).ok()
}

fn parse_with_offset(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local());
    }

    ISO_OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(value, format).ok())
        .map(|dt| dt.naive_local())
}
