//! Month-grid construction and occurrence resolution.

use chrono::{Datelike, Days, NaiveDate};

use crate::{Course, Error, Result};

/// One week row of the month grid; empty slots pad partial weeks.
pub type WeekRow = [Option<NaiveDate>; 7];

/// Number of rows every month grid is padded to.
const GRID_ROWS: usize = 6;

/// Builds the week matrix for one month.
///
/// Each row holds seven slots, Sunday first. The first row is left-padded and
/// the last populated row right-padded with empty slots; additional all-empty
/// rows are appended until the grid has six rows, so every month renders at
/// the same height. Pure and deterministic.
pub fn month_matrix(year: i32, month: u32) -> Result<Vec<WeekRow>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Validation(format!("Invalid year/month: {year}-{month}")))?;
    let days_in_month = days_in_month(year, month)?;

    let mut cells: Vec<Option<NaiveDate>> = Vec::with_capacity(GRID_ROWS * 7);
    for _ in 0..first.weekday().num_days_from_sunday() {
        cells.push(None);
    }
    for day in 1..=days_in_month {
        cells.push(NaiveDate::from_ymd_opt(year, month, day));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    let mut matrix: Vec<WeekRow> = cells
        .chunks_exact(7)
        .map(|week| {
            let mut row: WeekRow = [None; 7];
            row.copy_from_slice(week);
            row
        })
        .collect();

    while matrix.len() < GRID_ROWS {
        matrix.push([None; 7]);
    }

    Ok(matrix)
}

/// Number of days in the given month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::Validation(format!("Invalid year/month: {year}-{month}")))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::Internal("month arithmetic overflow".to_string()))?;

    Ok((next - first).num_days() as u32)
}

/// Decides whether `course` has an occurrence on `date`.
///
/// Single source of truth for "does this course happen on this day": the
/// date must lie inside the course's date range, must not be excluded, and
/// must fall on the course's weekday. Both the calendar view and exclusion
/// validity checks go through here.
pub fn occurs_on(course: &Course, date: NaiveDate) -> bool {
    if date < course.start_date || date > course.end_date {
        return false;
    }
    if course.excluded_dates.binary_search(&date).is_ok() {
        return false;
    }
    course.matches_weekday(date)
}

/// First date on or after the course's start date that falls on its weekday.
///
/// May land past `end_date` when the range is shorter than a week relative to
/// the chosen weekday; callers decide how to treat that.
pub fn first_weekday_on_or_after(course: &Course) -> NaiveDate {
    let start_index = course.start_date.weekday().num_days_from_sunday();
    let target_index = course.weekday.num_from_sunday();
    let days_to_add = (target_index + 7 - start_index) % 7;

    course.start_date + Days::new(u64::from(days_to_add))
}

/// Earliest date for which [`occurs_on`] is true, if any.
pub fn earliest_occurrence(course: &Course) -> Option<NaiveDate> {
    let mut date = first_weekday_on_or_after(course);
    while date <= course.end_date {
        if occurs_on(course, date) {
            return Some(date);
        }
        date = date + Days::new(7);
    }
    None
}
