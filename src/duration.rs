//! Human-readable durations for poll intervals, retry delays and debounce.
//!
//! Accepts "500ms", "30s", "5m", "1h", or a plain number of milliseconds.

use crate::error::Error;
use std::time::Duration;

const UNITS: &[(&str, u64)] = &[("ms", 1), ("s", 1000), ("m", 60_000), ("h", 3_600_000)];

/// Parses a human-readable duration string into a `Duration`.
///
/// # Errors
///
/// Returns an error if the format is invalid or the value overflows.
///
/// # Examples
///
/// ```
/// use godesk_cli::duration::parse_duration;
/// use std::time::Duration;
///
/// assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
/// assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
/// assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
/// assert_eq!(parse_duration("250").unwrap(), Duration::from_millis(250));
/// ```
pub fn parse_duration(s: &str) -> Result<Duration, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::config("Duration cannot be empty"));
    }

    // "ms" is listed before "m" and "s" so it is matched first.
    let (number, millis_per_unit) = UNITS
        .iter()
        .find_map(|(suffix, factor)| s.strip_suffix(suffix).map(|n| (n.trim(), *factor)))
        .unwrap_or((s, 1));

    let value: u64 = number.parse().map_err(|_| {
        Error::config(format!(
            "Invalid duration '{s}'. Use a format like '500ms', '30s', '5m' or '1h'"
        ))
    })?;
    value
        .checked_mul(millis_per_unit)
        .map(Duration::from_millis)
        .ok_or_else(|| Error::config(format!("Duration '{s}' is too large")))
}

/// `clap` value parser wrapper.
///
/// # Errors
///
/// Returns the parse error as a string for clap to display.
pub fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    parse_duration(s).map_err(|e| e.to_string())
}
