//! Date/time coercion into the one textual form the backend accepts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use practicebridge_domain::{BridgeError, Result};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// `YYYY-MM-DDTHH:MM:SS±HH:MM`
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Normalize `value` into [`WIRE_FORMAT`] in `tz`.
///
/// Offset-carrying input is converted; naive input is read as local time in
/// `tz`. Blank input yields `Ok(None)` so the field can be omitted.
///
/// # Errors
/// `BridgeError::InvalidInput` when the value is not a recognizable date/time.
pub fn coerce(field: &str, value: &str, tz: Tz) -> Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(parsed.with_timezone(&tz).format(WIRE_FORMAT).to_string()));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| {
            BridgeError::InvalidInput(format!("{field} is not a valid date/time: {trimmed}"))
        })?;

    let local = tz.from_local_datetime(&naive).earliest().ok_or_else(|| {
        BridgeError::InvalidInput(format!("{field} does not exist in timezone {tz}: {trimmed}"))
    })?;

    Ok(Some(local.format(WIRE_FORMAT).to_string()))
}

/// Field names treated as date/time even when no schema covers them.
pub fn looks_temporal(name: &str) -> bool {
    name.ends_with("Date") || name.ends_with("Time") || name.eq_ignore_ascii_case("DateOfBirth")
}
