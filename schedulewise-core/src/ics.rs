//! RFC 5545 serialization of the course collection.

use chrono::{Duration, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::{Course, Error, ExportOptions, Result, calendar, types::EXPORT_FILE_NAME};

#[cfg(test)]
mod tests;

/// Floating (timezone-less) local timestamp, used for DTSTART/DTEND/EXDATE.
const FLOATING_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Instant timestamp in UTC, used for DTSTAMP and the RRULE UNTIL bound.
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// A fully serialized calendar payload.
#[derive(Debug, Clone)]
pub struct IcsExport {
    /// Fixed output file name.
    pub filename: &'static str,
    /// Complete VCALENDAR text.
    pub content: String,
    /// Per-course diagnostics for courses that yielded no event.
    pub skipped: Vec<String>,
}

/// ICS calendar generator.
///
/// Serializes each course into one VEVENT with a weekly RRULE bounded by the
/// course's end date and an EXDATE entry per retained exclusion. Event start
/// and end are emitted as floating local time while UNTIL is converted to
/// UTC; RFC 5545 requires that asymmetry.
pub struct IcsGenerator {
    options: ExportOptions,
}

impl IcsGenerator {
    pub fn new(options: ExportOptions) -> Self {
        Self { options }
    }

    /// Serializes the whole collection into one calendar payload.
    ///
    /// Courses that cannot produce a valid event are skipped with a
    /// diagnostic; every remaining course is still exported. Fails with
    /// [`Error::EmptySchedule`] for an empty input and
    /// [`Error::NoExportableEvents`] when no course survives encoding.
    pub fn generate(&self, courses: &[Course]) -> Result<IcsExport> {
        if courses.is_empty() {
            return Err(Error::EmptySchedule);
        }

        let mut content = String::new();
        content.push_str("BEGIN:VCALENDAR\r\n");
        content.push_str("VERSION:2.0\r\n");
        content.push_str("PRODID:-//ScheduleWiseApp//ScheduleWise Calendar//EN\r\n");
        content.push_str("CALSCALE:GREGORIAN\r\n");
        content.push_str("METHOD:PUBLISH\r\n");

        if let Some(ref name) = self.options.calendar_name {
            content.push_str(&format!("X-WR-CALNAME:{}\r\n", escape_text(name)));
        }

        let mut event_count = 0usize;
        let mut skipped = Vec::new();

        for (index, course) in courses.iter().enumerate() {
            match self.build_event(course, index) {
                Ok(Some(event)) => {
                    content.push_str(&event);
                    event_count += 1;
                }
                Ok(None) => {
                    let message = format!(
                        "Skipping course '{}': its first occurrence is after its end date",
                        course.title
                    );
                    tracing::warn!("{message}");
                    skipped.push(message);
                }
                Err(err) => {
                    let message =
                        format!("Error processing course '{}' for ICS: {err}", course.title);
                    tracing::warn!("{message}");
                    skipped.push(message);
                }
            }
        }

        if event_count == 0 {
            return Err(Error::NoExportableEvents);
        }

        content.push_str("END:VCALENDAR\r\n");

        Ok(IcsExport {
            filename: EXPORT_FILE_NAME,
            content,
            skipped,
        })
    }

    /// Builds one VEVENT block.
    ///
    /// Returns `Ok(None)` when the computed first occurrence falls after the
    /// course's end of range, in which case the course contributes no event.
    fn build_event(&self, course: &Course, index: usize) -> Result<Option<String>> {
        let start_time = course.start_time_of_day()?;
        let first_start = calendar::first_weekday_on_or_after(course).and_time(start_time);
        let range_end = end_of_range(course)?;

        if first_start > range_end {
            return Ok(None);
        }

        if !course.duration.is_finite() || course.duration <= 0.0 {
            return Err(Error::Validation(format!(
                "Invalid duration {} for course '{}'",
                course.duration, course.title
            )));
        }
        let whole_hours = course.duration.trunc();
        let minutes = ((course.duration - whole_hours) * 60.0).round() as i64;
        let span = Duration::try_hours(whole_hours as i64)
            .zip(Duration::try_minutes(minutes))
            .and_then(|(hours, minutes)| hours.checked_add(&minutes))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Duration {} is out of range for course '{}'",
                    course.duration, course.title
                ))
            })?;
        let first_end = first_start.checked_add_signed(span).ok_or_else(|| {
            Error::Validation(format!(
                "Duration {} overflows the event end for course '{}'",
                course.duration, course.title
            ))
        })?;

        let uid = format!("schedulewise-{}-{index}@schedulewise.app", course.id);
        let dtstamp = Utc::now().format(UTC_FORMAT).to_string();

        let mut event = String::new();
        event.push_str("BEGIN:VEVENT\r\n");
        event.push_str(&format!("UID:{uid}\r\n"));
        event.push_str(&format!("DTSTAMP:{dtstamp}\r\n"));
        event.push_str(&format!("DTSTART:{}\r\n", first_start.format(FLOATING_FORMAT)));
        event.push_str(&format!("DTEND:{}\r\n", first_end.format(FLOATING_FORMAT)));
        event.push_str(&format!("SUMMARY:{}\r\n", escape_text(&course.title)));

        if !course.location.is_empty() {
            event.push_str(&format!("LOCATION:{}\r\n", escape_text(&course.location)));
        }

        if self.options.include_lecturer && !course.description.is_empty() {
            event.push_str(&format!(
                "DESCRIPTION:Lecturer: {}\r\n",
                escape_text(&course.description)
            ));
        }

        event.push_str(&format!(
            "RRULE:FREQ=WEEKLY;BYDAY={};INTERVAL=1;UNTIL={}\r\n",
            course.weekday.byday_code(),
            until_utc(range_end)?
        ));

        // Exclusions carry the same local start time as the occurrences they
        // cancel; ones outside the course range are dropped.
        let course_start = course.start_date.and_time(start_time);
        for excluded in &course.excluded_dates {
            let exdate = excluded.and_time(start_time);
            if exdate >= course_start && exdate <= range_end {
                event.push_str(&format!("EXDATE:{}\r\n", exdate.format(FLOATING_FORMAT)));
            }
        }

        if let Some(reminder_minutes) = self.options.reminder_minutes {
            event.push_str("BEGIN:VALARM\r\n");
            event.push_str("ACTION:DISPLAY\r\n");
            event.push_str("DESCRIPTION:Reminder\r\n");
            event.push_str(&format!("TRIGGER:-PT{reminder_minutes}M\r\n"));
            event.push_str("END:VALARM\r\n");
        }

        event.push_str("END:VEVENT\r\n");

        Ok(Some(event))
    }
}

impl Default for IcsGenerator {
    fn default() -> Self {
        Self::new(ExportOptions::default())
    }
}

/// Local end of the course's recurrence range: end date at 23:59:59.
fn end_of_range(course: &Course) -> Result<NaiveDateTime> {
    course
        .end_date
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| Error::Internal("failed to build end-of-day timestamp".to_string()))
}

/// Converts the local range end into the UTC UNTIL bound of the RRULE.
fn until_utc(range_end: NaiveDateTime) -> Result<String> {
    let local = match chrono::Local.from_local_datetime(&range_end) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            return Err(Error::IcsGeneration(format!(
                "local time {range_end} does not exist in this timezone"
            )));
        }
    };
    Ok(local.with_timezone(&Utc).format(UTC_FORMAT).to_string())
}

/// Escapes text per RFC 5545.
fn escape_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
