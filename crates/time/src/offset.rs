//! UTC offset parsing and formatting.
//!
//! Offsets travel as strings in decision contexts (`+HH:MM`). Callers may
//! also hand in the compact `+HHMM` form used by `strftime("%z")`.

use time::UtcOffset;

use crate::error::TimeError;

/// Parse `+HH:MM` or `+HHMM` into a [`UtcOffset`].
///
/// Hours must be in `0..=23` and minutes in `0..=59`.
pub fn parse_offset(input: &str) -> Result<UtcOffset, TimeError> {
    let invalid = || TimeError::InvalidOffset {
        input: input.to_string(),
    };

    let bytes = input.as_bytes();
    let (hours, minutes) = match bytes.len() {
        6 if bytes[3] == b':' => (&bytes[1..3], &bytes[4..6]),
        5 => (&bytes[1..3], &bytes[3..5]),
        _ => return Err(invalid()),
    };
    let sign = match bytes[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(invalid()),
    };

    let hours = two_digits(hours).ok_or_else(invalid)?;
    let minutes = two_digits(minutes).ok_or_else(invalid)?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    let seconds = sign * (hours * 60 + minutes) * 60;
    UtcOffset::from_whole_seconds(seconds).map_err(|_| invalid())
}

/// Format an offset as `+HH:MM`.
pub fn format_offset(offset: UtcOffset) -> String {
    let sign = if offset.is_negative() { '-' } else { '+' };
    format!(
        "{}{:02}:{:02}",
        sign,
        offset.whole_hours().unsigned_abs(),
        offset.minutes_past_hour().unsigned_abs()
    )
}

fn two_digits(bytes: &[u8]) -> Option<i32> {
    if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(i32::from(bytes[0] - b'0') * 10 + i32::from(bytes[1] - b'0'))
}
