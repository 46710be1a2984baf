//! Conversions between 12-hour and 24-hour wall-clock times.
//!
//! Courses store their start time in 24-hour "HH:MM" form; user input and
//! display both use the 12-hour clock. All functions here are pure.

use crate::{Error, Meridiem, Result};

/// Splits a "H:MM"/"HH:MM" string into numeric parts.
///
/// Enforces the shape only (1-2 digit hour, exactly 2 digit minute); range
/// checks are the caller's job since they differ between the two clocks.
fn split_clock(value: &str) -> Option<(u32, u32)> {
    let (hours, minutes) = value.split_once(':')?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return None;
    }
    if !hours.bytes().all(|b| b.is_ascii_digit()) || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((hours.parse().ok()?, minutes.parse().ok()?))
}

/// Converts a 12-hour time plus AM/PM into canonical 24-hour "HH:MM".
///
/// PM with an hour below 12 adds 12; 12 AM maps to hour 0 (midnight); every
/// other combination passes the hour through unchanged.
pub fn to_24_hour(time12: &str, meridiem: Meridiem) -> Result<String> {
    let (mut hours, minutes) =
        split_clock(time12).ok_or_else(|| Error::InvalidTimeFormat(time12.to_string()))?;

    if !(1..=12).contains(&hours) || minutes > 59 {
        return Err(Error::InvalidTimeValue(time12.to_string()));
    }

    if meridiem == Meridiem::Pm && hours < 12 {
        hours += 12;
    } else if meridiem == Meridiem::Am && hours == 12 {
        // Midnight case
        hours = 0;
    }

    Ok(format!("{hours:02}:{minutes:02}"))
}

/// Converts a 24-hour "HH:MM" time into its 12-hour form plus AM/PM.
///
/// Lenient: malformed or out-of-range input falls back to `("12:00", AM)`
/// instead of failing, so that a damaged stored value never blocks editing
/// the record. Callers needing strict validation must pre-validate.
pub fn to_12_hour(time24: &str) -> (String, Meridiem) {
    let Some((hours, minutes)) = split_clock(time24) else {
        tracing::warn!(time = time24, "invalid 24-hour time format, using fallback");
        return ("12:00".to_string(), Meridiem::Am);
    };

    if hours > 23 || minutes > 59 {
        tracing::warn!(time = time24, "out-of-range 24-hour time, using fallback");
        return ("12:00".to_string(), Meridiem::Am);
    }

    let meridiem = if hours >= 12 { Meridiem::Pm } else { Meridiem::Am };
    let hours12 = match hours {
        0 => 12,
        h if h > 12 => h - 12,
        h => h,
    };

    (format!("{hours12}:{minutes:02}"), meridiem)
}

/// Formats a stored 24-hour time as "HH:MM AM/PM" with a zero-padded hour.
pub fn format_for_display(time24: &str) -> String {
    let (time, meridiem) = to_12_hour(time24);
    match time.split_once(':') {
        Some((h, m)) => format!("{h:0>2}:{m} {meridiem}"),
        None => time24.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_24_hour() {
        assert_eq!(to_24_hour("9:30", Meridiem::Am).unwrap(), "09:30");
        assert_eq!(to_24_hour("9:30", Meridiem::Pm).unwrap(), "21:30");
        assert_eq!(to_24_hour("11:59", Meridiem::Pm).unwrap(), "23:59");
        assert_eq!(to_24_hour("01:05", Meridiem::Am).unwrap(), "01:05");
    }

    #[test]
    fn noon_and_midnight_boundaries() {
        assert_eq!(to_24_hour("12:00", Meridiem::Am).unwrap(), "00:00");
        assert_eq!(to_24_hour("12:30", Meridiem::Pm).unwrap(), "12:30");
        assert_eq!(to_12_hour("00:15"), ("12:15".to_string(), Meridiem::Am));
        assert_eq!(to_12_hour("12:15"), ("12:15".to_string(), Meridiem::Pm));
    }

    #[test]
    fn rejects_malformed_12_hour_input() {
        assert!(matches!(
            to_24_hour("930", Meridiem::Am),
            Err(Error::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            to_24_hour("9:3", Meridiem::Am),
            Err(Error::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            to_24_hour("ab:cd", Meridiem::Am),
            Err(Error::InvalidTimeFormat(_))
        ));
        assert!(matches!(
            to_24_hour("13:00", Meridiem::Am),
            Err(Error::InvalidTimeValue(_))
        ));
        assert!(matches!(
            to_24_hour("0:30", Meridiem::Pm),
            Err(Error::InvalidTimeValue(_))
        ));
        assert!(matches!(
            to_24_hour("9:61", Meridiem::Am),
            Err(Error::InvalidTimeValue(_))
        ));
    }

    #[test]
    fn lenient_12_hour_fallback() {
        assert_eq!(to_12_hour("garbage"), ("12:00".to_string(), Meridiem::Am));
        assert_eq!(to_12_hour("25:00"), ("12:00".to_string(), Meridiem::Am));
        assert_eq!(to_12_hour("10:99"), ("12:00".to_string(), Meridiem::Am));
    }

    #[test]
    fn round_trips_valid_times() {
        for hour in 1..=12u32 {
            for (minute, meridiem) in [(0u32, Meridiem::Am), (59, Meridiem::Pm)] {
                let twelve = format!("{hour}:{minute:02}");
                let twenty_four = to_24_hour(&twelve, meridiem).unwrap();
                assert_eq!(to_12_hour(&twenty_four), (twelve.clone(), meridiem));
            }
        }
    }

    #[test]
    fn display_format_pads_hour() {
        assert_eq!(format_for_display("09:30"), "09:30 AM");
        assert_eq!(format_for_display("21:05"), "09:05 PM");
        assert_eq!(format_for_display("00:00"), "12:00 AM");
        // Malformed stored data still renders via the lenient fallback.
        assert_eq!(format_for_display("nonsense"), "12:00 AM");
    }
}
