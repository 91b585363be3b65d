//! `application/x-www-form-urlencoded` parsing for the timer form.
//!
//! Pair splitting and percent-decoding come from `form_urlencoded`.
//!
//! Duration rules:
//!
//! - missing or blank field → [`InputError::Missing`]
//! - anything but an optionally signed decimal integer → [`InputError::NotANumber`]
//! - negative → clamped to 0
//! - above `u32::MAX` → clamped to `u32::MAX`

use crate::config::DutyCycleConfig;
use crate::error::InputError;

pub const FIELD_ON: &str = "relay_on";
pub const FIELD_OFF: &str = "relay_off";

/// Value of the first `name=` pair in `body`, percent-decoded.
///
/// `+` is a space; malformed escapes are kept literally.
pub fn field(body: &[u8], name: &str) -> Option<String> {
    form_urlencoded::parse(body)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Parse one duration in whole seconds.
pub fn parse_duration_secs(name: &'static str, raw: Option<&str>) -> Result<u32, InputError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(InputError::Missing(name))?;

    let (negative, digits) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotANumber(name));
    }
    if negative {
        return Ok(0);
    }

    // All digits, so the only possible parse failure is overflow.
    Ok(digits
        .parse::<u64>()
        .map_or(u32::MAX, |v| u32::try_from(v).unwrap_or(u32::MAX)))
}

/// Parse a `/setTimers` body into durations.
pub fn parse_set_timers(body: &[u8]) -> Result<DutyCycleConfig, InputError> {
    let on = field(body, FIELD_ON);
    let off = field(body, FIELD_OFF);
    let on_secs = parse_duration_secs(FIELD_ON, on.as_deref())?;
    let off_secs = parse_duration_secs(FIELD_OFF, off.as_deref())?;
    Ok(DutyCycleConfig::from_secs(on_secs, off_secs))
}
