//! Lap-time text parsing and formatting.
//!
//! # Responsibility
//! - Convert `minutes:seconds` strings into whole seconds.
//! - Render whole seconds back into the canonical `m:ss` form.
//!
//! # Invariants
//! - Both parts must be non-empty runs of ASCII digits once whitespace around
//!   each part is trimmed; signs are rejected.
//! - Seconds above 59 are accepted and simply added (`1:75` == 135).
//! - `format_duration(parse_duration(s))` reproduces `s` for canonical input.

use std::error::Error;
use std::fmt::{Display, Formatter};

const SECONDS_PER_MINUTE: u32 = 60;

/// Malformed lap-time text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    MissingSeparator(String),
    TooManySeparators(String),
    InvalidPart { input: String, part: String },
    Overflow(String),
}

impl Display for DurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "duration is empty; expected `minutes:seconds`"),
            Self::MissingSeparator(input) => {
                write!(f, "duration `{input}` has no `:` separator")
            }
            Self::TooManySeparators(input) => {
                write!(f, "duration `{input}` has more than one `:` separator")
            }
            Self::InvalidPart { input, part } => {
                write!(f, "duration `{input}` has non-numeric part `{part}`")
            }
            Self::Overflow(input) => write!(f, "duration `{input}` is too large"),
        }
    }
}

impl Error for DurationParseError {}

/// Parses `minutes:seconds` into whole seconds.
///
/// # Errors
/// - Empty text, missing or repeated `:`, non-digit parts, or values that do
///   not fit in `u32`.
pub fn parse_duration(text: &str) -> Result<u32, DurationParseError> {
    let input = text.trim();
    if input.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let mut parts = input.split(':');
    let (Some(minutes), Some(seconds)) = (parts.next(), parts.next()) else {
        return Err(DurationParseError::MissingSeparator(input.to_string()));
    };
    if parts.next().is_some() {
        return Err(DurationParseError::TooManySeparators(input.to_string()));
    }

    let minutes = parse_part(input, minutes)?;
    let seconds = parse_part(input, seconds)?;

    minutes
        .checked_mul(SECONDS_PER_MINUTE)
        .and_then(|total| total.checked_add(seconds))
        .ok_or_else(|| DurationParseError::Overflow(input.to_string()))
}

/// Formats whole seconds as `m:ss`.
pub fn format_duration(total_seconds: u32) -> String {
    format!(
        "{}:{:02}",
        total_seconds / SECONDS_PER_MINUTE,
        total_seconds % SECONDS_PER_MINUTE
    )
}

fn parse_part(input: &str, part: &str) -> Result<u32, DurationParseError> {
    let part = part.trim();
    if part.is_empty() || !part.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(DurationParseError::InvalidPart {
            input: input.to_string(),
            part: part.to_string(),
        });
    }
    // Digits-only input can still overflow.
    part.parse::<u32>()
        .map_err(|_| DurationParseError::Overflow(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{format_duration, parse_duration, DurationParseError};

    #[test]
    fn parses_sample_lap_times() {
        assert_eq!(parse_duration("2:51"), Ok(171));
        assert_eq!(parse_duration("3:15"), Ok(195));
        assert_eq!(parse_duration("5:02"), Ok(302));
        assert_eq!(parse_duration("0:00"), Ok(0));
    }

    #[test]
    fn accepts_seconds_above_a_minute_and_padded_parts() {
        assert_eq!(parse_duration("1:75"), Ok(135));
        assert_eq!(parse_duration(" 7:33 "), Ok(453));
        assert_eq!(parse_duration(" 2: 51"), Ok(171));
        assert_eq!(parse_duration("3 :15"), Ok(195));
    }

    #[test]
    fn rejects_malformed_text() {
        assert_eq!(parse_duration(""), Err(DurationParseError::Empty));
        assert_eq!(
            parse_duration("abc"),
            Err(DurationParseError::MissingSeparator("abc".to_string()))
        );
        assert_eq!(
            parse_duration("1:2:3"),
            Err(DurationParseError::TooManySeparators("1:2:3".to_string()))
        );
        assert!(matches!(
            parse_duration("a:10"),
            Err(DurationParseError::InvalidPart { .. })
        ));
        assert!(matches!(
            parse_duration("3: "),
            Err(DurationParseError::InvalidPart { .. })
        ));
        assert!(matches!(
            parse_duration("3:"),
            Err(DurationParseError::InvalidPart { .. })
        ));
        assert!(matches!(
            parse_duration("-1:10"),
            Err(DurationParseError::InvalidPart { .. })
        ));
        assert!(matches!(
            parse_duration("+1:10"),
            Err(DurationParseError::InvalidPart { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_values() {
        assert!(matches!(
            parse_duration("99999999999:00"),
            Err(DurationParseError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration("4294967295:00"),
            Err(DurationParseError::Overflow(_))
        ));
    }

    #[test]
    fn format_pads_seconds_and_round_trips() {
        assert_eq!(format_duration(171), "2:51");
        assert_eq!(format_duration(302), "5:02");
        assert_eq!(format_duration(59), "0:59");

        for text in ["2:51", "1:12", "3:15", "3:41", "7:33", "5:02", "12:00"] {
            let seconds = parse_duration(text).unwrap();
            assert_eq!(format_duration(seconds), text);
        }
    }
}
