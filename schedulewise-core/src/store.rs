//! Codec for the persisted course collection.
//!
//! The whole collection is stored as one JSON blob under a single key. The
//! decoder is deliberately forgiving: a payload that is not valid JSON or
//! not an array is discarded entirely, and inside an array every field of
//! every entry is defaulted independently when missing or of the wrong type,
//! so damaged storage never blocks loading.

use chrono::NaiveDate;
use serde_json::Value;

use crate::{Course, Result, Weekday, types::DATE_FORMAT};

/// Decodes a stored blob into a sanitized course collection.
pub fn decode_courses(raw: &str, today: NaiveDate) -> Vec<Course> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("stored course data is not valid JSON, resetting: {err}");
            return Vec::new();
        }
    };

    let Value::Array(entries) = value else {
        tracing::warn!("stored course data is not an array, resetting");
        return Vec::new();
    };

    entries
        .into_iter()
        .map(|entry| sanitize_course(&entry, today))
        .collect()
}

/// Serializes the collection back into its stored form.
pub fn encode_courses(courses: &[Course]) -> Result<String> {
    Ok(serde_json::to_string(courses)?)
}

fn sanitize_course(entry: &Value, today: NaiveDate) -> Course {
    Course {
        id: string_field(entry, "id").unwrap_or_else(Course::new_id),
        title: string_field(entry, "title").unwrap_or_else(|| "Untitled Course".to_string()),
        weekday: string_field(entry, "weekday")
            .and_then(|name| Weekday::from_name(&name))
            .unwrap_or(Weekday::Monday),
        start_date: date_field(entry, "startDate").unwrap_or(today),
        end_date: date_field(entry, "endDate").unwrap_or(today),
        start_time: string_field(entry, "startTime").unwrap_or_else(|| "09:00".to_string()),
        duration: entry
            .get("duration")
            .and_then(Value::as_f64)
            .filter(|d| d.is_finite())
            .unwrap_or(1.0),
        location: string_field(entry, "location").unwrap_or_default(),
        description: string_field(entry, "description").unwrap_or_default(),
        excluded_dates: excluded_dates_field(entry),
    }
}

fn string_field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

fn date_field(entry: &Value, key: &str) -> Option<NaiveDate> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .and_then(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
}

/// Keeps only well-formed date strings, sorted and deduplicated.
fn excluded_dates_field(entry: &Value) -> Vec<NaiveDate> {
    let Some(Value::Array(items)) = entry.get("excludedDates") else {
        return Vec::new();
    };

    let mut dates: Vec<NaiveDate> = items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
        .collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 6, 1)
    }

    #[test]
    fn round_trips_a_collection() {
        let course = Course {
            id: "c1".to_string(),
            title: "Algorithms".to_string(),
            weekday: Weekday::Wednesday,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
            start_time: "14:00".to_string(),
            duration: 2.0,
            location: "Room 1".to_string(),
            description: "Dr. X".to_string(),
            excluded_dates: vec![date(2024, 1, 10)],
        };

        let raw = encode_courses(std::slice::from_ref(&course)).unwrap();
        let decoded = decode_courses(&raw, today());
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, "c1");
        assert_eq!(decoded[0].weekday, Weekday::Wednesday);
        assert_eq!(decoded[0].excluded_dates, vec![date(2024, 1, 10)]);
    }

    #[test]
    fn non_array_payloads_are_discarded() {
        assert!(decode_courses("not json", today()).is_empty());
        assert!(decode_courses("{\"a\":1}", today()).is_empty());
        assert!(decode_courses("42", today()).is_empty());
    }

    #[test]
    fn fields_default_independently() {
        let raw = r#"[{
            "id": 7,
            "title": "Physics",
            "weekday": "Nonday",
            "startDate": "2024-01-01",
            "endDate": 12,
            "startTime": null,
            "duration": "two",
            "excludedDates": ["2024-01-08", 5, "bogus", "2024-01-08"]
        }]"#;

        let decoded = decode_courses(raw, today());
        assert_eq!(decoded.len(), 1);
        let course = &decoded[0];
        assert!(!course.id.is_empty());
        assert_ne!(course.id, "7");
        assert_eq!(course.title, "Physics");
        assert_eq!(course.weekday, Weekday::Monday);
        assert_eq!(course.start_date, date(2024, 1, 1));
        assert_eq!(course.end_date, today());
        assert_eq!(course.start_time, "09:00");
        assert_eq!(course.duration, 1.0);
        assert_eq!(course.location, "");
        assert_eq!(course.excluded_dates, vec![date(2024, 1, 8)]);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let decoded = decode_courses("[{}]", today());
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].title, "Untitled Course");
        assert_eq!(decoded[0].duration, 1.0);
        assert!(decoded[0].excluded_dates.is_empty());
    }
}
