use chrono::{NaiveDate, NaiveDateTime};

use super::*;
use crate::{Weekday, calendar};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn course(id: &str, weekday: Weekday) -> Course {
    Course {
        id: id.to_string(),
        title: "Algorithms".to_string(),
        weekday,
        start_date: date(2024, 1, 1),
        end_date: date(2024, 1, 31),
        start_time: "09:00".to_string(),
        duration: 1.5,
        location: "Room 101".to_string(),
        description: "Dr. X".to_string(),
        excluded_dates: vec![],
    }
}

fn line_starting_with<'a>(content: &'a str, prefix: &str) -> &'a str {
    content
        .lines()
        .find(|l| l.starts_with(prefix))
        .unwrap_or_else(|| panic!("no line starting with {prefix}"))
}

#[test]
fn january_monday_course_event() {
    let generator = IcsGenerator::default();
    let export = generator.generate(&[course("c1", Weekday::Monday)]).unwrap();

    assert_eq!(export.filename, "ScheduleWise_Courses.ics");
    assert!(export.skipped.is_empty());

    let content = &export.content;
    assert!(content.starts_with("BEGIN:VCALENDAR\r\n"));
    assert!(content.ends_with("END:VCALENDAR\r\n"));
    assert!(content.contains("PRODID:-//ScheduleWiseApp//ScheduleWise Calendar//EN"));
    assert!(content.contains("X-WR-CALNAME:ScheduleWise Calendar"));

    // January 1st 2024 is a Monday, so the first occurrence is the start date.
    assert!(content.contains("DTSTART:20240101T090000"));
    // 1.5 hours -> 1h30m.
    assert!(content.contains("DTEND:20240101T103000"));
    assert!(content.contains("SUMMARY:Algorithms"));
    assert!(content.contains("LOCATION:Room 101"));
    assert!(content.contains("DESCRIPTION:Lecturer: Dr. X"));
    assert!(content.contains("UID:schedulewise-c1-0@schedulewise.app"));

    let rrule = line_starting_with(content, "RRULE:");
    assert!(rrule.starts_with("RRULE:FREQ=WEEKLY;BYDAY=MO;INTERVAL=1;UNTIL="));
    // UNTIL must be an instant in UTC even though DTSTART floats.
    assert!(rrule.trim_end().ends_with('Z'));

    assert!(content.contains("BEGIN:VALARM"));
    assert!(content.contains("ACTION:DISPLAY"));
    assert!(content.contains("TRIGGER:-PT10M"));
}

#[test]
fn fractional_duration_splits_into_minutes() {
    let mut c = course("c1", Weekday::Monday);
    c.duration = 0.75;

    let export = IcsGenerator::default().generate(&[c]).unwrap();
    assert!(export.content.contains("DTEND:20240101T094500"));
}

#[test]
fn dtstart_agrees_with_occurrence_resolver() {
    for weekday in Weekday::ALL {
        let c = course("c1", weekday);
        let export = IcsGenerator::default().generate(&[c.clone()]).unwrap();

        let dtstart = line_starting_with(&export.content, "DTSTART:");
        let parsed =
            NaiveDateTime::parse_from_str(&dtstart["DTSTART:".len()..], "%Y%m%dT%H%M%S").unwrap();
        assert_eq!(Some(parsed.date()), calendar::earliest_occurrence(&c));
    }
}

#[test]
fn exdates_are_filtered_to_the_course_range() {
    let mut c = course("c1", Weekday::Monday);
    c.excluded_dates = vec![date(2023, 12, 25), date(2024, 1, 8), date(2024, 2, 5)];

    let export = IcsGenerator::default().generate(&[c]).unwrap();
    assert!(export.content.contains("EXDATE:20240108T090000"));
    assert!(!export.content.contains("EXDATE:20231225"));
    assert!(!export.content.contains("EXDATE:20240205"));
}

#[test]
fn exdate_omitted_when_all_exclusions_fall_outside_the_range() {
    let mut c = course("c1", Weekday::Monday);
    c.excluded_dates = vec![date(2023, 12, 25)];

    let export = IcsGenerator::default().generate(&[c]).unwrap();
    assert!(!export.content.contains("EXDATE"));
}

#[test]
fn course_with_range_shorter_than_a_week_is_skipped() {
    // Monday course whose range is Tuesday..Friday never occurs.
    let mut short = course("c1", Weekday::Monday);
    short.start_date = date(2024, 1, 2);
    short.end_date = date(2024, 1, 5);

    let result = IcsGenerator::default().generate(&[short.clone()]);
    assert!(matches!(result, Err(Error::NoExportableEvents)));

    // Alongside a valid course the export still succeeds.
    let valid = course("c2", Weekday::Wednesday);
    let export = IcsGenerator::default().generate(&[short, valid]).unwrap();
    assert_eq!(export.skipped.len(), 1);
    assert!(export.skipped[0].contains("first occurrence is after its end date"));
    assert!(export.content.contains("UID:schedulewise-c2-1@schedulewise.app"));
    assert!(!export.content.contains("UID:schedulewise-c1-0"));
}

#[test]
fn invalid_course_data_is_skipped_not_fatal() {
    let mut bad_duration = course("c1", Weekday::Monday);
    bad_duration.duration = 0.0;

    let mut bad_time = course("c2", Weekday::Monday);
    bad_time.start_time = "9x:00".to_string();

    let valid = course("c3", Weekday::Monday);

    let export = IcsGenerator::default()
        .generate(&[bad_duration, bad_time, valid])
        .unwrap();
    assert_eq!(export.skipped.len(), 2);
    assert!(export.content.contains("UID:schedulewise-c3-2@schedulewise.app"));
}

#[test]
fn oversized_duration_is_skipped_not_fatal() {
    // A huge hour count is still "a positive number" to the import parser,
    // but it does not fit into a chrono span; the course must be skipped
    // while the rest of the export goes through.
    let mut huge = course("c1", Weekday::Monday);
    huge.duration = 99_999_999_999.0;

    let valid = course("c2", Weekday::Monday);

    let export = IcsGenerator::default()
        .generate(&[huge.clone(), valid])
        .unwrap();
    assert_eq!(export.skipped.len(), 1);
    assert!(export.skipped[0].contains("overflows the event end"));
    assert!(export.content.contains("UID:schedulewise-c2-1@schedulewise.app"));

    assert!(matches!(
        IcsGenerator::default().generate(&[huge.clone()]),
        Err(Error::NoExportableEvents)
    ));

    // Large enough to not even fit into a chrono span.
    huge.duration = 1.0e18;
    let export = IcsGenerator::default()
        .generate(&[huge, course("c2", Weekday::Monday)])
        .unwrap();
    assert_eq!(export.skipped.len(), 1);
    assert!(export.skipped[0].contains("out of range"));
}

#[test]
fn empty_collection_is_rejected() {
    assert!(matches!(
        IcsGenerator::default().generate(&[]),
        Err(Error::EmptySchedule)
    ));
}

#[test]
fn summary_text_is_escaped() {
    let mut c = course("c1", Weekday::Monday);
    c.title = "Math, Logic; Proofs".to_string();

    let export = IcsGenerator::default().generate(&[c]).unwrap();
    assert!(export.content.contains("SUMMARY:Math\\, Logic\\; Proofs"));
}

#[test]
fn lecturer_can_be_left_out() {
    let options = ExportOptions {
        include_lecturer: false,
        ..ExportOptions::default()
    };
    let export = IcsGenerator::new(options)
        .generate(&[course("c1", Weekday::Monday)])
        .unwrap();
    assert!(!export.content.contains("DESCRIPTION:Lecturer"));
}
