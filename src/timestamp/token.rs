//! Classification of the raw text in a timestamp column.

use chrono::TimeDelta;
use thiserror::Error;

use super::shift::{ShiftError, is_shift, parse_shift};

/// Keyword for the shared "current time" of a run.
const NOW_KEYWORD: &str = "NOW";

/// Keyword for the previous commit's original timestamp.
const PREV_KEYWORD: &str = "PREV";

/// One edited timestamp column, after dispatch.
///
/// Matching priority is: empty, `NOW`, `PREV [shift]`, a lone shift, and
/// finally absolute text with an optional trailing shift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditToken {
    /// Empty column: keep the original instant.
    Unchanged,

    /// The single "now" captured for the whole run.
    Now,

    /// The previous commit's original instant, optionally shifted.
    Previous { shift: Option<TimeDelta> },

    /// Shift applied to the previous commit's resolved author instant.
    BareShift(TimeDelta),

    /// Local wall-clock time, possibly containing `RR` markers.
    Absolute {
        timestamp: String,
        shift: Option<TimeDelta>,
    },
}

impl EditToken {
    /// Classify `raw`. Shift syntax is validated here; timestamps and `RR`
    /// markers are validated during resolution.
    pub fn parse(raw: &str) -> Result<Self, TokenError> {
        let raw = raw.trim();

        if raw.is_empty() {
            return Ok(EditToken::Unchanged);
        }

        if raw.eq_ignore_ascii_case(NOW_KEYWORD) {
            return Ok(EditToken::Now);
        }

        let (head, tail) = match raw.split_once(char::is_whitespace) {
            Some((head, tail)) => (head, tail.trim()),
            None => (raw, ""),
        };

        if head.eq_ignore_ascii_case(PREV_KEYWORD) {
            let shift = match tail {
                "" => None,
                tail if is_shift(tail) => Some(parse_shift(tail)?),
                tail => return Err(TokenError::PrevSuffix(tail.to_string())),
            };
            return Ok(EditToken::Previous { shift });
        }

        let (timestamp, shift) = split_trailing_shift(raw);
        let shift = shift.map(parse_shift).transpose()?;
        match (timestamp, shift) {
            ("", Some(shift)) => Ok(EditToken::BareShift(shift)),
            (timestamp, shift) => Ok(EditToken::Absolute {
                timestamp: timestamp.to_string(),
                shift,
            }),
        }
    }
}

/// Separate a trailing shift word from the rest of the token.
///
/// `"2026-02-23 10:00:00 +2h"` becomes `("2026-02-23 10:00:00", Some("+2h"))`.
pub(crate) fn split_trailing_shift(s: &str) -> (&str, Option<&str>) {
    let s = s.trim();
    match s.rsplit_once(char::is_whitespace) {
        Some((rest, last)) if is_shift(last) => (rest.trim_end(), Some(last)),
        Some(_) => (s, None),
        None if is_shift(s) => ("", Some(s)),
        None => (s, None),
    }
}

/// Errors from classifying a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error(transparent)]
    Shift(#[from] ShiftError),

    #[error("PREV may only be followed by a shift, got '{0}'")]
    PrevSuffix(String),
}
