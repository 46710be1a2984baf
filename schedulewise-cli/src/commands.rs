use std::path::PathBuf;

use anyhow::{Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use schedulewise_core::{
    Course, Meridiem, Weekday, calendar,
    ics::IcsGenerator,
    import::{self, ImportOutcome},
    time,
};

use crate::store::FileStore;

/// Parameters for the `add` command.
pub struct AddParams {
    pub title: String,
    pub weekday: Weekday,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: String,
    pub meridiem: Meridiem,
    pub duration: f64,
    pub location: Option<String>,
    pub lecturer: Option<String>,
}

/// Parameters for the `edit` command; `None` keeps the current value.
pub struct EditParams {
    pub id: String,
    pub title: Option<String>,
    pub weekday: Option<Weekday>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub meridiem: Option<Meridiem>,
    pub duration: Option<f64>,
    pub location: Option<String>,
    pub lecturer: Option<String>,
}

/// Adds one course to the schedule.
pub async fn add_command(store: &FileStore, params: AddParams) -> Result<()> {
    if params.title.trim().is_empty() {
        bail!("Course title must not be empty");
    }
    if params.end_date < params.start_date {
        bail!("End date must not be before start date");
    }
    if !params.duration.is_finite() || params.duration <= 0.0 {
        bail!("Duration must be a positive number of hours");
    }

    let start_time = time::to_24_hour(&params.start_time, params.meridiem)?;

    let course = Course {
        id: Course::new_id(),
        title: params.title.trim().to_string(),
        weekday: params.weekday,
        start_date: params.start_date,
        end_date: params.end_date,
        start_time,
        duration: params.duration,
        location: params.location.unwrap_or_default(),
        description: params.lecturer.unwrap_or_default(),
        excluded_dates: Vec::new(),
    };

    tracing::info!(id = %course.id, title = %course.title, "adding course");

    let mut courses = store.load().await?;
    courses.push(course.clone());
    store.save(&courses).await?;

    println!("✓ Course \"{}\" added (id {})", course.title, course.id);
    Ok(())
}

/// Prints every course in the schedule.
pub async fn list_command(store: &FileStore) -> Result<()> {
    let courses = store.load().await?;

    if courses.is_empty() {
        println!("The schedule is empty.");
        return Ok(());
    }

    println!("{} course(s):", courses.len());
    for course in &courses {
        println!("  {} [{}]", course.title, short_id(&course.id));
        println!(
            "    {} {} for {}h, {} - {}",
            course.weekday,
            time::format_for_display(&course.start_time),
            course.duration,
            course.start_date,
            course.end_date
        );
        if !course.location.is_empty() {
            println!("    Location: {}", course.location);
        }
        if !course.description.is_empty() {
            println!("    Lecturer: {}", course.description);
        }
        if !course.excluded_dates.is_empty() {
            let dates: Vec<String> = course
                .excluded_dates
                .iter()
                .map(ToString::to_string)
                .collect();
            println!("    Excluded: {}", dates.join(", "));
        }
    }

    Ok(())
}

/// Renders the month grid; days with at least one occurrence carry a `*`.
pub async fn calendar_command(
    store: &FileStore,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<()> {
    let now = Local::now().date_naive();
    let year = year.unwrap_or_else(|| now.year());
    let month = month.unwrap_or_else(|| now.month());

    let courses = store.load().await?;
    let matrix = calendar::month_matrix(year, month)?;

    let heading = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    println!("{heading:^28}");
    println!(" Su  Mo  Tu  We  Th  Fr  Sa");

    for row in &matrix {
        let mut line = String::new();
        for cell in row {
            match cell {
                Some(date) => {
                    let marked = courses.iter().any(|c| calendar::occurs_on(c, *date));
                    line.push_str(&format!("{:>3}{}", date.day(), if marked { '*' } else { ' ' }));
                }
                None => line.push_str("    "),
            }
        }
        println!("{}", line.trim_end());
    }

    for course in &courses {
        let days: Vec<String> = matrix
            .iter()
            .flatten()
            .filter_map(|cell| *cell)
            .filter(|date| calendar::occurs_on(course, *date))
            .map(|date| date.day().to_string())
            .collect();
        if !days.is_empty() {
            println!(
                "  * {} ({}): day {}",
                course.title,
                time::format_for_display(&course.start_time),
                days.join(", ")
            );
        }
    }

    Ok(())
}

/// Replaces fields on an existing course, keeping its id.
pub async fn edit_command(store: &FileStore, params: EditParams) -> Result<()> {
    let mut courses = store.load().await?;
    let index = find_course(&courses, &params.id)?;
    let course = &mut courses[index];

    if let Some(title) = params.title {
        if title.trim().is_empty() {
            bail!("Course title must not be empty");
        }
        course.title = title.trim().to_string();
    }
    if let Some(weekday) = params.weekday {
        course.weekday = weekday;
    }
    if let Some(start_date) = params.start_date {
        course.start_date = start_date;
    }
    if let Some(end_date) = params.end_date {
        course.end_date = end_date;
    }
    if let Some(start_time) = params.start_time {
        let meridiem = params
            .meridiem
            .ok_or_else(|| anyhow::anyhow!("--start-time requires --meridiem"))?;
        course.start_time = time::to_24_hour(&start_time, meridiem)?;
    }
    if let Some(duration) = params.duration {
        if !duration.is_finite() || duration <= 0.0 {
            bail!("Duration must be a positive number of hours");
        }
        course.duration = duration;
    }
    if let Some(location) = params.location {
        course.location = location;
    }
    if let Some(lecturer) = params.lecturer {
        course.description = lecturer;
    }

    if course.end_date < course.start_date {
        bail!("End date must not be before start date");
    }

    // Exclusions must stay on real occurrence dates of the edited course.
    let snapshot = course.clone();
    course
        .excluded_dates
        .retain(|date| *date >= snapshot.start_date
            && *date <= snapshot.end_date
            && snapshot.matches_weekday(*date));

    let title = course.title.clone();
    store.save(&courses).await?;
    println!("✓ Course \"{title}\" updated");
    Ok(())
}

/// Deletes one course.
pub async fn remove_command(store: &FileStore, id: String) -> Result<()> {
    let mut courses = store.load().await?;
    let index = find_course(&courses, &id)?;
    let removed = courses.remove(index);

    store.save(&courses).await?;
    println!("✓ Course \"{}\" removed from the schedule", removed.title);
    Ok(())
}

/// Deletes every course.
pub async fn clear_command(store: &FileStore) -> Result<()> {
    let courses = store.load().await?;
    if courses.is_empty() {
        println!("The schedule is already empty.");
        return Ok(());
    }

    store.save(&[]).await?;
    println!("✓ All {} course(s) removed", courses.len());
    Ok(())
}

/// Excludes one occurrence date of a course.
pub async fn exclude_command(store: &FileStore, id: String, date: NaiveDate) -> Result<()> {
    let mut courses = store.load().await?;
    let index = find_course(&courses, &id)?;
    let course = &mut courses[index];

    if course.excluded_dates.contains(&date) {
        bail!(
            "{date} is already excluded from \"{}\"",
            course.title
        );
    }
    if !calendar::occurs_on(course, date) {
        bail!(
            "{date} is not an occurrence of \"{}\" ({}s between {} and {})",
            course.title,
            course.weekday,
            course.start_date,
            course.end_date
        );
    }

    course.add_excluded_date(date);
    let title = course.title.clone();
    store.save(&courses).await?;

    println!("✓ Occurrence of \"{title}\" on {date} removed from the calendar");
    Ok(())
}

/// Imports courses from a flat text file, best effort.
pub async fn import_command(store: &FileStore, file: PathBuf) -> Result<()> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .map_err(|err| anyhow::anyhow!("Failed to read {}: {err}", file.display()))?;

    let report = import::parse_courses(&text, Local::now().date_naive());

    // Detailed per-block diagnostics go to the log; the summary goes to stdout.
    for diagnostic in &report.diagnostics {
        tracing::warn!("{diagnostic}");
    }

    let imported = report.courses.len();
    match report.outcome() {
        ImportOutcome::Clean => {
            println!("✓ {imported} course(s) imported. {}", report.date_range_note);
        }
        ImportOutcome::Partial => {
            println!(
                "{imported} course(s) imported, {} issue(s) found (see log). {}",
                report.diagnostics.len(),
                report.date_range_note
            );
        }
        ImportOutcome::Failed => {
            println!(
                "No courses imported due to errors; {} issue(s) found (see log). {}",
                report.diagnostics.len(),
                report.date_range_note
            );
        }
        ImportOutcome::Empty => {
            println!("No course data found in the file. {}", report.date_range_note);
        }
    }

    if !report.courses.is_empty() {
        let mut courses = store.load().await?;
        courses.extend(report.courses);
        store.save(&courses).await?;
    }

    Ok(())
}

/// Exports the schedule as an ICS file, then clears it.
pub async fn export_command(store: &FileStore, output: Option<PathBuf>) -> Result<()> {
    let courses = store.load().await?;

    let generator = IcsGenerator::default();
    let export = generator.generate(&courses)?;

    let output = output.unwrap_or_else(|| PathBuf::from(export.filename));
    tokio::fs::write(&output, export.content.as_bytes())
        .await
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", output.display()))?;

    // Deliberate export-and-reset policy: the schedule is cleared only after
    // the payload has been written.
    store.save(&[]).await?;

    let exported = courses.len() - export.skipped.len();
    if export.skipped.is_empty() {
        println!("✓ Exported {exported} course(s) to {}; schedule cleared", output.display());
    } else {
        println!(
            "✓ Exported {exported} of {} course(s) to {} ({} skipped, see log); schedule cleared",
            courses.len(),
            output.display(),
            export.skipped.len()
        );
    }

    Ok(())
}

/// Shortened id for display. Ids are normally ASCII uuids, but the store
/// preserves any string it finds, so truncation must respect char boundaries.
fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Finds a course by exact id or unique id prefix.
fn find_course(courses: &[Course], id: &str) -> Result<usize> {
    if let Some(index) = courses.iter().position(|c| c.id == id) {
        return Ok(index);
    }

    let matches: Vec<usize> = courses
        .iter()
        .enumerate()
        .filter(|(_, c)| c.id.starts_with(id))
        .map(|(i, _)| i)
        .collect();

    match matches.as_slice() {
        [index] => Ok(*index),
        [] => bail!("Course not found: {id}"),
        _ => bail!("Course id prefix '{id}' is ambiguous"),
    }
}
