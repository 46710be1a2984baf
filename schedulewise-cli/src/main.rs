mod commands;
mod store;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schedulewise_core::{Meridiem, Weekday};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::store::FileStore;

#[derive(Parser)]
#[command(name = "schedulewise")]
#[command(about = "Personal weekly course schedule with ICS export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Schedule file to operate on (defaults to the per-user data directory)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a course to the schedule
    Add {
        /// Course title
        #[arg(short, long)]
        title: String,

        /// Weekday the course recurs on (Mon, Tue, ... or full name)
        #[arg(short, long)]
        weekday: Weekday,

        /// First day of the course range (YYYY-MM-DD)
        #[arg(short = 's', long)]
        start_date: NaiveDate,

        /// Last day of the course range (YYYY-MM-DD)
        #[arg(short = 'e', long)]
        end_date: NaiveDate,

        /// Start time on the 12-hour clock (H:MM or HH:MM)
        #[arg(short = 'T', long)]
        start_time: String,

        /// AM or PM
        #[arg(short, long)]
        meridiem: Meridiem,

        /// Duration in hours (may be fractional, e.g. 1.5)
        #[arg(short, long)]
        duration: f64,

        /// Location of the course
        #[arg(short, long)]
        location: Option<String>,

        /// Lecturer name
        #[arg(short = 'L', long)]
        lecturer: Option<String>,
    },

    /// List all courses in the schedule
    List,

    /// Render the month grid with course occurrences marked
    Calendar {
        /// Year to render (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,

        /// Month to render, 1-12 (defaults to the current month)
        #[arg(short, long)]
        month: Option<u32>,
    },

    /// Update fields of an existing course
    Edit {
        /// Id of the course to edit
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        weekday: Option<Weekday>,

        #[arg(short = 's', long)]
        start_date: Option<NaiveDate>,

        #[arg(short = 'e', long)]
        end_date: Option<NaiveDate>,

        /// New start time on the 12-hour clock; requires --meridiem
        #[arg(short = 'T', long, requires = "meridiem")]
        start_time: Option<String>,

        #[arg(short, long)]
        meridiem: Option<Meridiem>,

        #[arg(short, long)]
        duration: Option<f64>,

        #[arg(short, long)]
        location: Option<String>,

        #[arg(short = 'L', long)]
        lecturer: Option<String>,
    },

    /// Remove one course from the schedule
    Remove {
        /// Id of the course to remove
        id: String,
    },

    /// Remove all courses from the schedule
    Clear,

    /// Exclude a single occurrence date of a course
    Exclude {
        /// Id of the course
        id: String,

        /// Occurrence date to exclude (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Import courses from a flat text file
    Import {
        /// Text file to import
        file: PathBuf,
    },

    /// Export the schedule as an ICS file and clear it
    Export {
        /// Output file path (defaults to ScheduleWise_Courses.ics)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("schedulewise={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let store = match cli.data_file {
        Some(path) => FileStore::new(path),
        None => FileStore::with_default_dir()?,
    };

    match cli.command {
        Commands::Add {
            title,
            weekday,
            start_date,
            end_date,
            start_time,
            meridiem,
            duration,
            location,
            lecturer,
        } => {
            commands::add_command(
                &store,
                commands::AddParams {
                    title,
                    weekday,
                    start_date,
                    end_date,
                    start_time,
                    meridiem,
                    duration,
                    location,
                    lecturer,
                },
            )
            .await
        }

        Commands::List => commands::list_command(&store).await,

        Commands::Calendar { year, month } => commands::calendar_command(&store, year, month).await,

        Commands::Edit {
            id,
            title,
            weekday,
            start_date,
            end_date,
            start_time,
            meridiem,
            duration,
            location,
            lecturer,
        } => {
            commands::edit_command(
                &store,
                commands::EditParams {
                    id,
                    title,
                    weekday,
                    start_date,
                    end_date,
                    start_time,
                    meridiem,
                    duration,
                    location,
                    lecturer,
                },
            )
            .await
        }

        Commands::Remove { id } => commands::remove_command(&store, id).await,

        Commands::Clear => commands::clear_command(&store).await,

        Commands::Exclude { id, date } => commands::exclude_command(&store, id, date).await,

        Commands::Import { file } => commands::import_command(&store, file).await,

        Commands::Export { output } => commands::export_command(&store, output).await,
    }
}
