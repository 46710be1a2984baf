use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Fixed name of the exported calendar file.
pub const EXPORT_FILE_NAME: &str = "ScheduleWise_Courses.ics";

/// MIME type of the exported calendar payload.
pub const EXPORT_MIME_TYPE: &str = "text/calendar";

/// Storage key under which the serialized course collection lives.
pub const STORAGE_KEY: &str = "scheduleWiseCourses";

/// Wire format for date-only values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Day of the week a course recurs on.
///
/// Ordered Monday-first to match the canonical weekday list of the UI;
/// calendar-grid arithmetic uses Sunday-based indices instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// All weekdays in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Full English name.
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    /// RFC 5545 BYDAY code.
    pub fn byday_code(self) -> &'static str {
        match self {
            Weekday::Monday => "MO",
            Weekday::Tuesday => "TU",
            Weekday::Wednesday => "WE",
            Weekday::Thursday => "TH",
            Weekday::Friday => "FR",
            Weekday::Saturday => "SA",
            Weekday::Sunday => "SU",
        }
    }

    /// Index with 0=Sunday..6=Saturday, the layout used by the month grid.
    pub fn num_from_sunday(self) -> u32 {
        match self {
            Weekday::Sunday => 0,
            Weekday::Monday => 1,
            Weekday::Tuesday => 2,
            Weekday::Wednesday => 3,
            Weekday::Thursday => 4,
            Weekday::Friday => 5,
            Weekday::Saturday => 6,
        }
    }

    /// Looks up a full weekday name (exact match).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == name)
    }

    /// Looks up a three-letter abbreviation (Mon, Tue, ...), case-insensitive.
    pub fn from_short(short: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str()[..3].eq_ignore_ascii_case(short))
    }

    pub fn to_chrono(self) -> chrono::Weekday {
        match self {
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
            Weekday::Sunday => chrono::Weekday::Sun,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = Error;

    /// Accepts either the full name or the three-letter abbreviation, any case.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .or_else(|| {
                if s.len() == 3 {
                    Self::from_short(s)
                } else {
                    None
                }
            })
            .ok_or_else(|| Error::Validation(format!("Invalid weekday '{s}'")))
    }
}

/// AM/PM half of a 12-hour clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Meridiem {
    pub fn as_str(self) -> &'static str {
        match self {
            Meridiem::Am => "AM",
            Meridiem::Pm => "PM",
        }
    }
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Meridiem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("AM") {
            Ok(Meridiem::Am)
        } else if s.eq_ignore_ascii_case("PM") {
            Ok(Meridiem::Pm)
        } else {
            Err(Error::Validation(format!(
                "Invalid AM/PM value '{s}'. Expected AM or PM"
            )))
        }
    }
}

/// A single weekly-recurring course, the sole persisted entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Opaque unique identifier, assigned at creation.
    pub id: String,
    /// Display title, non-empty.
    pub title: String,
    /// The single day of the week on which the course recurs.
    pub weekday: Weekday,
    /// First day of the recurrence range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the recurrence range (inclusive); never before `start_date`.
    pub end_date: NaiveDate,
    /// Start of each occurrence, 24-hour "HH:MM".
    pub start_time: String,
    /// Length of each occurrence in hours; may be fractional.
    pub duration: f64,
    /// Free-text location; may be empty.
    pub location: String,
    /// Lecturer name; may be empty.
    pub description: String,
    /// Dates on which the course does not take place, ascending, no duplicates.
    #[serde(default)]
    pub excluded_dates: Vec<NaiveDate>,
}

impl Course {
    /// Creates a fresh opaque course id.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Parses the stored 24-hour start time into a time of day.
    pub fn start_time_of_day(&self) -> Result<NaiveTime> {
        Ok(NaiveTime::parse_from_str(&self.start_time, "%H:%M")?)
    }

    /// Inserts an excluded date, keeping the list sorted and deduplicated.
    ///
    /// Returns `false` if the date was already excluded.
    pub fn add_excluded_date(&mut self, date: NaiveDate) -> bool {
        match self.excluded_dates.binary_search(&date) {
            Ok(_) => false,
            Err(pos) => {
                self.excluded_dates.insert(pos, date);
                true
            }
        }
    }

    /// True when `date` falls on this course's weekday.
    pub fn matches_weekday(&self, date: NaiveDate) -> bool {
        date.weekday() == self.weekday.to_chrono()
    }
}

/// Options controlling ICS serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Calendar display name (X-WR-CALNAME).
    pub calendar_name: Option<String>,
    /// Whether DESCRIPTION lines carry the lecturer name.
    pub include_lecturer: bool,
    /// Display-reminder lead time before each occurrence.
    pub reminder_minutes: Option<u32>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            calendar_name: Some("ScheduleWise Calendar".to_string()),
            include_lecturer: true,
            reminder_minutes: Some(10),
        }
    }
}
