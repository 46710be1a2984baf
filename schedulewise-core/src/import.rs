//! Tolerant flat-text course import.
//!
//! The format is line-oriented: an optional leading `D/M/YYYY - D/M/YYYY`
//! range line, then seven-line blocks of title, weekday abbreviation,
//! 12-hour start time (dot separator), AM/PM, duration, location and
//! lecturer. Parsing never fails on malformed content; every bad block
//! becomes a diagnostic and the rest of the file is still processed.

use std::{str::FromStr, sync::LazyLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::{Course, Meridiem, Weekday, time, types::DATE_FORMAT};

/// Lines per course block.
const LINES_PER_BLOCK: usize = 7;

static DATE_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}/\d{1,2}/\d{4})\s*-\s*(\d{1,2}/\d{1,2}/\d{4})$")
        .expect("date range pattern is valid")
});

/// How the import as a whole went, for caller messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Every block imported cleanly.
    Clean,
    /// Some blocks imported, some produced diagnostics.
    Partial,
    /// Every block failed.
    Failed,
    /// No course data was present at all.
    Empty,
}

/// Result of one import run: successes plus the full diagnostic list.
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Successfully imported courses.
    pub courses: Vec<Course>,
    /// Human-readable per-block diagnostics.
    pub diagnostics: Vec<String>,
    /// Date range adopted from the header line, when valid.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Summary of how the header line was handled.
    pub date_range_note: String,
}

impl ImportReport {
    pub fn outcome(&self) -> ImportOutcome {
        match (self.courses.is_empty(), self.diagnostics.is_empty()) {
            (false, true) => ImportOutcome::Clean,
            (false, false) => ImportOutcome::Partial,
            (true, false) => ImportOutcome::Failed,
            (true, true) => ImportOutcome::Empty,
        }
    }
}

/// Parses raw import text into validated course records.
///
/// `today` supplies the default start/end date used when the file carries no
/// valid global range.
pub fn parse_courses(text: &str, today: NaiveDate) -> ImportReport {
    let mut lines = text.lines();
    let mut date_range = None;
    let mut date_range_note =
        "Courses defaulted to current date (no valid global date range found).".to_string();

    // Only the first line can carry the global range. A line that matches the
    // pattern is consumed even when its dates turn out to be invalid.
    let mut rest: Vec<&str> = Vec::new();
    if let Some(first) = lines.next() {
        let trimmed = first.trim();
        if let Some(caps) = DATE_RANGE_RE.captures(trimmed) {
            match (parse_header_date(&caps[1]), parse_header_date(&caps[2])) {
                (Some(start), Some(end)) if end >= start => {
                    date_range = Some((start, end));
                    date_range_note = format!(
                        "Global date range {} - {} applied from file.",
                        start.format(DATE_FORMAT),
                        end.format(DATE_FORMAT)
                    );
                }
                (Some(_), Some(_)) => {
                    date_range_note = "Global end date was before start date. Courses defaulted to current date.".to_string();
                }
                _ => {
                    date_range_note = "Invalid date in global date range line. Courses defaulted to current date.".to_string();
                }
            }
        } else {
            rest.push(first);
        }
    }
    rest.extend(lines);

    let course_lines: Vec<&str> = rest
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let (start_date, end_date) = date_range.unwrap_or((today, today));
    let mut courses = Vec::new();
    let mut diagnostics = Vec::new();

    // Always advance by exactly one block per iteration; a broken block never
    // shifts the framing of the ones after it.
    for (block_offset, block) in course_lines.chunks(LINES_PER_BLOCK).enumerate() {
        let block_index = block_offset + 1;

        if block.len() < LINES_PER_BLOCK {
            diagnostics.push(format!(
                "Course block {block_index}: incomplete block (expected {LINES_PER_BLOCK} lines, got {}). Skipped.",
                block.len()
            ));
            continue;
        }

        match parse_block(block, block_index, start_date, end_date) {
            Ok(course) => courses.push(course),
            Err(diagnostic) => diagnostics.push(diagnostic),
        }
    }

    ImportReport {
        courses,
        diagnostics,
        date_range,
        date_range_note,
    }
}

fn parse_header_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Validates one seven-line block and converts it into a course.
///
/// Fields are checked in order and the first failure wins; later checks are
/// skipped so each bad block yields exactly one diagnostic.
fn parse_block(
    block: &[&str],
    block_index: usize,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Course, String> {
    let [raw_title, raw_weekday, raw_start_time, raw_meridiem, raw_duration, raw_location, raw_lecturer] =
        block
    else {
        return Err(format!("Course block {block_index}: malformed block. Skipped."));
    };

    if raw_title.is_empty() {
        return Err(format!("Course block {block_index}: title is missing. Skipped."));
    }
    let title = (*raw_title).to_string();

    let weekday = Weekday::from_short(raw_weekday).ok_or_else(|| {
        format!(
            "Course block {block_index} ('{title}'): invalid weekday \"{raw_weekday}\". Expected Mon, Tue, etc. Skipped."
        )
    })?;

    let time12 = normalize_dot_time(raw_start_time).ok_or_else(|| {
        format!(
            "Course block {block_index} ('{title}'): invalid start time format \"{raw_start_time}\". Expected H.MM, HH.MM, H, or HH. Skipped."
        )
    })?;

    let meridiem = Meridiem::from_str(raw_meridiem).map_err(|_| {
        format!(
            "Course block {block_index} ('{title}'): invalid AM/PM value \"{raw_meridiem}\". Expected AM or PM. Skipped."
        )
    })?;

    let start_time = time::to_24_hour(&time12, meridiem).map_err(|err| {
        format!(
            "Course block {block_index} ('{title}'): error converting time \"{time12} {meridiem}\" to 24-hour format. Skipped. {err}"
        )
    })?;

    let duration = raw_duration.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            format!(
                "Course block {block_index} ('{title}'): invalid duration \"{raw_duration}\". Must be a positive number. Skipped."
            )
        })?;

    Ok(Course {
        id: Course::new_id(),
        title,
        weekday,
        start_date,
        end_date,
        start_time,
        duration,
        location: if raw_location.is_empty() {
            "N/A".to_string()
        } else {
            (*raw_location).to_string()
        },
        description: (*raw_lecturer).to_string(),
        excluded_dates: Vec::new(),
    })
}

/// Normalizes a dot-separated 12-hour time into "HH:MM".
///
/// A missing minute part defaults to "00"; a short one is right-padded with
/// zeros and a long one truncated to two digits, so "9.5" means 9:50. Range
/// validation happens here (hour 1-12, minute 0-59) and again in the codec.
fn normalize_dot_time(raw: &str) -> Option<String> {
    let (hour_part, minute_part) = match raw.split_once('.') {
        Some((h, m)) => (h, m),
        None => (raw, ""),
    };

    if hour_part.is_empty() || !hour_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let minute_part = if minute_part.is_empty() {
        "00".to_string()
    } else if !minute_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    } else {
        let mut padded = format!("{minute_part:0<2}");
        padded.truncate(2);
        padded
    };

    let hours: u32 = hour_part.parse().ok()?;
    let minutes: u32 = minute_part.parse().ok()?;
    if !(1..=12).contains(&hours) || minutes > 59 {
        return None;
    }

    Some(format!("{hours:02}:{minute_part}"))
}
