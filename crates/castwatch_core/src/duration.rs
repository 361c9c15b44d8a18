//! Duration Parser / Validator: parses platform ISO-8601 durations and
//! validates the bounds the Store and Search Pipeline rely on.

use castwatch_error::{BuilderError, BuilderErrorKind};
use regex::Regex;
use std::sync::LazyLock;

/// Inclusive lower bound for a valid duration, in seconds.
pub const MIN_DURATION_SECS: i32 = 0;
/// Inclusive upper bound for a valid duration, in seconds (24 h).
pub const MAX_DURATION_SECS: i32 = 86_400;

static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap()
});

/// Parses a remote-platform ISO-8601 duration string (e.g. `PT3M5S`) into
/// whole seconds.
///
/// # Examples
///
/// ```
/// use castwatch_core::duration::parse_iso8601_duration;
///
/// assert_eq!(parse_iso8601_duration("PT3M5S").unwrap(), 185);
/// assert_eq!(parse_iso8601_duration("PT1H").unwrap(), 3600);
/// assert!(parse_iso8601_duration("not a duration").is_err());
/// ```
#[track_caller]
pub fn parse_iso8601_duration(raw: &str) -> Result<i32, BuilderError> {
    let captures = ISO8601_DURATION.captures(raw).ok_or_else(|| {
        BuilderError::new(BuilderErrorKind::InvalidField {
            field: "duration".to_string(),
            reason: format!("not a valid ISO-8601 duration: {raw}"),
        })
    })?;

    let hours: i32 = captures
        .get(1)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0);
    let minutes: i32 = captures
        .get(2)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0);
    let seconds: i32 = captures
        .get(3)
        .map(|m| m.as_str().parse().unwrap_or(0))
        .unwrap_or(0);

    Ok(hours * 3600 + minutes * 60 + seconds)
}

/// Validates that a duration in seconds falls within `[0, 86400]`.
///
/// # Examples
///
/// ```
/// use castwatch_core::duration::validate_duration;
///
/// assert!(validate_duration(0).is_ok());
/// assert!(validate_duration(-1).is_err());
/// assert!(validate_duration(86401).is_err());
/// ```
#[track_caller]
pub fn validate_duration(seconds: i32) -> Result<i32, BuilderError> {
    if (MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&seconds) {
        Ok(seconds)
    } else {
        Err(BuilderError::new(BuilderErrorKind::InvalidField {
            field: "duration".to_string(),
            reason: format!(
                "duration {seconds}s out of bounds [{MIN_DURATION_SECS}, {MAX_DURATION_SECS}]"
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hours_minutes_seconds() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S").unwrap(), 3723);
    }

    #[test]
    fn parses_seconds_only() {
        assert_eq!(parse_iso8601_duration("PT45S").unwrap(), 45);
    }

    #[test]
    fn rejects_malformed_duration() {
        assert!(parse_iso8601_duration("3m5s").is_err());
    }

    #[test]
    fn zero_is_accepted() {
        assert!(validate_duration(0).is_ok());
    }

    #[test]
    fn negative_one_is_rejected() {
        assert!(validate_duration(-1).is_err());
    }

    #[test]
    fn max_plus_one_is_rejected() {
        assert!(validate_duration(MAX_DURATION_SECS + 1).is_err());
    }

    #[test]
    fn max_is_accepted() {
        assert!(validate_duration(MAX_DURATION_SECS).is_ok());
    }
}
