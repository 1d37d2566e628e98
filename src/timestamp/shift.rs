//! Relative shift expressions such as `+2h` or `-1d2h30m`.

use chrono::TimeDelta;
use thiserror::Error;

/// Parse a compound shift expression into a signed duration.
///
/// The expression is a sign followed by one or more `<digits><unit>` pairs
/// with no separators. Units are `w` (weeks), `d` (days), `h`, `m` and `s`.
/// The leading sign applies to the whole sum.
pub fn parse_shift(expr: &str) -> Result<TimeDelta, ShiftError> {
    let (negative, mut rest) = match expr.as_bytes().first() {
        None => return Err(ShiftError::Empty),
        Some(b'+') => (false, &expr[1..]),
        Some(b'-') => (true, &expr[1..]),
        Some(_) => return Err(ShiftError::MissingSign(expr.to_string())),
    };

    if rest.is_empty() {
        return Err(ShiftError::NoValue(expr.to_string()));
    }

    let mut total_secs: i64 = 0;
    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return Err(ShiftError::MissingNumber {
                expr: expr.to_string(),
                at: rest.to_string(),
            });
        }

        let n: i64 = rest[..digits]
            .parse()
            .map_err(|_| ShiftError::Overflow(expr.to_string()))?;

        let Some(unit) = rest[digits..].chars().next() else {
            return Err(ShiftError::MissingUnit(expr.to_string()));
        };
        rest = &rest[digits + unit.len_utf8()..];

        let unit_secs = match unit {
            'w' => 7 * 24 * 3600,
            'd' => 24 * 3600,
            'h' => 3600,
            'm' => 60,
            's' => 1,
            other => {
                return Err(ShiftError::UnknownUnit {
                    unit: other,
                    expr: expr.to_string(),
                });
            }
        };

        total_secs = n
            .checked_mul(unit_secs)
            .and_then(|secs| total_secs.checked_add(secs))
            .ok_or_else(|| ShiftError::Overflow(expr.to_string()))?;
    }

    if negative {
        total_secs = -total_secs;
    }

    TimeDelta::try_seconds(total_secs).ok_or_else(|| ShiftError::Overflow(expr.to_string()))
}

/// Whether `s` looks like a shift expression: a sign immediately followed by
/// a digit. This is the syntactic probe; [`parse_shift`] does the validation.
pub fn is_shift(s: &str) -> bool {
    let bytes = s.trim().as_bytes();
    bytes.len() >= 2 && matches!(bytes[0], b'+' | b'-') && bytes[1].is_ascii_digit()
}

/// Errors from parsing a shift expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    #[error("empty shift expression")]
    Empty,

    #[error("shift must start with + or -: '{0}'")]
    MissingSign(String),

    #[error("shift has no value: '{0}'")]
    NoValue(String),

    #[error("expected number in shift '{expr}' at '{at}'")]
    MissingNumber { expr: String, at: String },

    #[error("missing unit in shift '{0}'")]
    MissingUnit(String),

    #[error("unknown unit '{unit}' in shift '{expr}'")]
    UnknownUnit { unit: char, expr: String },

    #[error("shift '{0}' is out of range")]
    Overflow(String),
}
