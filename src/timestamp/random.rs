//! `RR` markers: randomized hour, minute or second fields.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use thiserror::Error;

static RR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RR(?:\(([^(),]*),([^(),]*)\))?").expect("RR pattern is valid")
});

#[derive(Debug, Clone, Copy)]
enum Field {
    Hour,
    Minute,
    Second,
}

impl Field {
    fn default_range(self) -> (u32, u32) {
        match self {
            Field::Hour => (0, 23),
            Field::Minute | Field::Second => (0, 59),
        }
    }
}

/// Whether `s` contains an `RR` marker.
pub fn contains_rr(s: &str) -> bool {
    RR_PATTERN.is_match(s)
}

/// Replace every `RR` / `RR(lo,hi)` marker in an `HH:MM:SS` string.
///
/// A bare `RR` picks from the natural range of its field; bounds are
/// inclusive. Fields without a marker are passed through untouched.
///
/// ```
/// # use retime::timestamp::resolve_rr;
/// let mut rng = rand::thread_rng();
/// let time = resolve_rr("RR(09,17):RR:00", &mut rng).unwrap();
/// assert!(time.ends_with(":00"));
/// ```
pub fn resolve_rr<R: Rng + ?Sized>(time: &str, rng: &mut R) -> Result<String, RandomError> {
    let parts: Vec<&str> = time.split(':').collect();
    let [hour, minute, second] = parts.as_slice() else {
        return Err(RandomError::Layout(time.to_string()));
    };

    Ok(format!(
        "{}:{}:{}",
        resolve_field(hour, Field::Hour, rng)?,
        resolve_field(minute, Field::Minute, rng)?,
        resolve_field(second, Field::Second, rng)?,
    ))
}

fn resolve_field<R: Rng + ?Sized>(
    field: &str,
    kind: Field,
    rng: &mut R,
) -> Result<String, RandomError> {
    let Some(caps) = RR_PATTERN.captures(field) else {
        return Ok(field.to_string());
    };
    let marker = caps.get(0).expect("group 0 always matches");

    let (lo, hi) = match (caps.get(1), caps.get(2)) {
        (Some(lo), Some(hi)) => (parse_bound(lo.as_str())?, parse_bound(hi.as_str())?),
        _ => kind.default_range(),
    };
    if lo > hi {
        return Err(RandomError::InvertedBounds { lo, hi });
    }

    let value = rng.gen_range(lo..=hi);
    Ok(format!(
        "{}{value:02}{}",
        &field[..marker.start()],
        &field[marker.end()..]
    ))
}

fn parse_bound(raw: &str) -> Result<u32, RandomError> {
    raw.trim()
        .parse()
        .map_err(|_| RandomError::InvalidBound(raw.to_string()))
}

/// Errors from expanding `RR` markers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RandomError {
    #[error("expected HH:MM:SS format, got '{0}'")]
    Layout(String),

    #[error("invalid RR bound '{0}'")]
    InvalidBound(String),

    #[error("RR min ({lo}) > max ({hi})")]
    InvertedBounds { lo: u32, hi: u32 },

    #[error("RR is not supported in date fields: '{0}'")]
    InDate(String),
}
