use thiserror::Error;

/// Errors surfaced by the core engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid time format: '{0}'. Expected HH:MM or H:MM")]
    InvalidTimeFormat(String),

    #[error("Invalid time values in '{0}'. Hours must be 1-12, minutes 0-59")]
    InvalidTimeValue(String),

    #[error("Date/time parsing failed: {0}")]
    DateTime(#[from] chrono::ParseError),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("ICS generation failed: {0}")]
    IcsGeneration(String),

    #[error("The schedule is empty")]
    EmptySchedule,

    #[error("No valid events to export")]
    NoExportableEvents,

    #[error("Course not found: {0}")]
    CourseNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
