use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref DURATION_REGEX: Regex = Regex::new(r"^(?P<value>\d+)(?P<unit>[smhd])$").unwrap();
}

// Number of seconds for each supported duration unit.
fn unit_length(unit: &str) -> Option<i64> {
    match unit {
        "s" => Some(1),
        "m" => Some(60),
        "h" => Some(60 * 60),
        "d" => Some(24 * 60 * 60),
        _ => None,
    }
}

// Parses a compact duration token (`30s`, `5m`, `1h`, `2d`) into its length.
pub fn parse_duration(text: &str) -> Result<Duration> {
    let token = text.trim().to_lowercase();
    let invalid = || Error::InvalidDurationFormat(format!("\"{}\"", text));

    let captures = DURATION_REGEX.captures(&token).ok_or_else(invalid)?;
    let value = captures["value"].parse::<i64>().map_err(|_| invalid())?;
    let seconds = unit_length(&captures["unit"])
        .and_then(|unit| value.checked_mul(unit))
        .ok_or_else(invalid)?;

    Duration::try_seconds(seconds).ok_or_else(invalid)
}

// Parses a duration token and returns the absolute deadline relative to `now`.
pub fn parse_deadline(text: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let duration = parse_duration(text)?;
    now.checked_add_signed(duration)
        .ok_or_else(|| Error::InvalidDurationFormat(format!("\"{}\"", text)))
}

// Human-readable remaining time, e.g. `1d 2h 5m 3s`. Zero components are skipped.
pub fn format_time_left(time_left: Duration) -> String {
    if time_left <= Duration::zero() {
        return "0s".to_string();
    }

    let total = time_left.num_seconds();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let parts = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, unit)| format!("{}{}", value, unit))
        .collect::<Vec<String>>();

    match parts.is_empty() {
        true => "0s".to_string(),
        false => parts.join(" "),
    }
}
