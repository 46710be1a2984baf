//! ScheduleWise Core Library
//!
//! This library provides the recurrence and serialization engine behind
//! ScheduleWise: expanding weekly-recurring courses into concrete calendar
//! occurrences, exporting them as RFC 5545 calendars, and importing them
//! from a tolerant flat-text format.

pub mod calendar;
pub mod error;
pub mod ics;
pub mod import;
pub mod store;
pub mod time;
pub mod types;

// Re-export core types and error handling
pub use error::{Error, Result};
pub use types::*;

/// Commonly used items
pub mod prelude {
    pub use crate::{calendar::*, ics::*, import::*, store::*, time::*, types::*};
}
