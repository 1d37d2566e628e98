//! Rendering and parsing of instants.
//!
//! The todo file shows wall-clock time in the user's local timezone with no
//! offset. Git receives RFC 3339 with the commit's own offset.

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, SecondsFormat, TimeZone};
use thiserror::Error;

/// Layout used for every timestamp in the todo file.
pub const DISPLAY_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Render `instant` in the local timezone without showing the offset.
pub fn format_local(instant: &DateTime<FixedOffset>) -> String {
    instant
        .with_timezone(&Local)
        .format(DISPLAY_LAYOUT)
        .to_string()
}

/// Parse a [`DISPLAY_LAYOUT`] string as local wall-clock time.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant.
pub fn parse_local(s: &str) -> Result<DateTime<Local>, FormatError> {
    let naive = NaiveDateTime::parse_from_str(s, DISPLAY_LAYOUT).map_err(|source| {
        FormatError::Invalid {
            input: s.to_string(),
            source,
        }
    })?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| FormatError::Nonexistent(s.to_string()))
}

/// Render `instant` for `GIT_COMMITTER_DATE` / `--date`, keeping its offset.
pub fn format_git(instant: &DateTime<FixedOffset>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Errors from parsing a local timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("invalid timestamp '{input}' (expected YYYY-MM-DD HH:MM:SS)")]
    Invalid {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("timestamp '{0}' does not exist in the local timezone")]
    Nonexistent(String),
}
