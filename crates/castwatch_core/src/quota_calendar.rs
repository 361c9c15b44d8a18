//! Quota Calendar: computes the next daily quota-reset boundary in the
//! platform's fixed wall-clock zone.

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;

/// Returns the next occurrence of `00:00` in the configured Pacific zone,
/// as a UTC timestamp, honoring DST transitions.
///
/// # Examples
///
/// ```
/// use castwatch_core::quota_calendar::next_reset_utc;
/// use chrono::{DateTime, Utc};
///
/// let t: DateTime<Utc> = "2024-06-10T19:33:00Z".parse().unwrap();
/// let reset = next_reset_utc(t);
/// assert_eq!(reset.to_rfc3339(), "2024-06-11T07:00:00+00:00");
/// ```
pub fn next_reset_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    let local_now = now.with_timezone(&Los_Angeles);
    let today_midnight = local_now.date_naive().and_hms_opt(0, 0, 0).unwrap();

    let candidate = Los_Angeles
        .from_local_datetime(&today_midnight)
        .single()
        .unwrap_or_else(|| Los_Angeles.from_utc_datetime(&today_midnight));

    let next_midnight = if candidate > local_now {
        candidate
    } else {
        let tomorrow = today_midnight + chrono::Duration::days(1);
        Los_Angeles
            .from_local_datetime(&tomorrow)
            .single()
            .unwrap_or_else(|| Los_Angeles.from_utc_datetime(&tomorrow))
    };

    next_midnight.with_timezone(&Utc)
}

/// How long after [`next_reset_utc`] the Worker should remain asleep, to
/// absorb clock skew against the remote platform's own reset.
pub const RESET_BUFFER_SECS: i64 = 60;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdt_boundary_matches_scenario_s3() {
        let t: DateTime<Utc> = "2024-06-10T19:33:00Z".parse().unwrap();
        let reset = next_reset_utc(t);
        assert_eq!(reset.to_rfc3339(), "2024-06-11T07:00:00+00:00");
    }

    #[test]
    fn pst_boundary_is_utc_minus_eight() {
        let t: DateTime<Utc> = "2024-01-10T19:33:00Z".parse().unwrap();
        let reset = next_reset_utc(t);
        assert_eq!(reset.to_rfc3339(), "2024-01-11T08:00:00+00:00");
    }

    #[test]
    fn already_past_midnight_rolls_to_next_day() {
        let t: DateTime<Utc> = "2024-06-11T06:59:00Z".parse().unwrap();
        let reset = next_reset_utc(t);
        assert_eq!(reset.to_rfc3339(), "2024-06-11T07:00:00+00:00");
    }
}
