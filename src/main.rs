use anyhow::Result;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use dialoguer::{Input, Password};
use tracing_subscriber::EnvFilter;

mod caldav;
mod config;
mod error;
mod event;
mod exams;
mod ics;
mod info;
mod timetable;
mod utils;

use config::{ExamsConfig, ScheduleConfig, SyncConfig};
use event::CalendarEvent;
use info::{Semester, WeekWindow};

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Show what is fetched and parsed
    #[clap(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Export the weekly plans of a group to iCalendar format (.ics)
    Schedule {
        #[clap(flatten)]
        schedule: ScheduleArgs,

        /// File name of the export, default to merged_schedule.ics
        #[clap(short, long, value_name = "FILE NAME")]
        export: Option<String>,
    },

    /// Export the weekly plans of a group and push them to a CalDAV server
    Sync {
        #[clap(flatten)]
        schedule: ScheduleArgs,

        /// File name of the export, default to schedule_w<WEEK>.ics
        #[clap(short, long, value_name = "FILE NAME")]
        export: Option<String>,

        /// CalDAV server
        #[clap(long, value_name = "URL", default_value = config::CALDAV_URL)]
        caldav_url: String,

        /// CalDAV username, asked if missing
        #[clap(short, long)]
        username: Option<String>,

        /// CalDAV password, asked if missing
        #[clap(long, env = config::PASSWORD_ENV, hide_env_values = true)]
        password: Option<String>,

        /// Name of the calendar created when the server has none
        #[clap(long, value_name = "NAME", default_value = config::CALENDAR_NAME)]
        calendar_name: String,
    },

    /// Export the exams of a group to iCalendar format (.ics)
    Exams {
        /// Your group, i.e.: 87, asked if missing
        group: Option<String>,

        /// Exam schedule page
        #[clap(default_value = config::EXAMS_URL)]
        url: String,

        /// File name of the export, default to merged_exams_<GROUP>.ics
        #[clap(short, long, value_name = "FILE NAME")]
        export: Option<String>,
    },
}

#[derive(Args)]
struct ScheduleArgs {
    /// Your group, i.e.: 339
    #[clap(short, long, default_value = config::DEFAULT_GROUP, value_parser = parse_group)]
    group: String,

    /// ISO week to start from, default to current week
    #[clap(short, long, value_name = "WEEK NUMBER")]
    week: Option<i32>,

    /// The year, default to current year
    #[clap(short, long, value_name = "YEAR")]
    year: Option<i32>,

    /// Number of weeks to fetch
    #[clap(
        short = 'n',
        long,
        default_value_t = config::DEFAULT_WEEKS,
        value_parser = clap::value_parser!(i32).range(1..)
    )]
    weeks: i32,

    /// Weekly plan page, the week and the group are appended to it
    #[clap(long, value_name = "URL", default_value = config::BASE_URL)]
    base_url: String,
}

impl From<ScheduleArgs> for ScheduleConfig {
    fn from(args: ScheduleArgs) -> Self {
        Self::new(args.base_url, args.group, args.year, args.week, args.weeks)
    }
}

fn parse_group(raw: &str) -> Result<String, error::Error> {
    utils::validate_group(raw)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let user_agent = format!("fdibacal/{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Schedule { schedule, export } => {
            let config = ScheduleConfig::from(schedule);
            let (_, events) = fetch_schedule(&config, &user_agent).await?;

            let mut filename = export.unwrap_or_else(|| "merged_schedule.ics".to_owned());
            ics::export(&events, &mut filename, Utc::now())?;

            println!("Saved {} events to {filename}", events.len());
        }
        Command::Sync {
            schedule,
            export,
            caldav_url,
            username,
            password,
            calendar_name,
        } => {
            let username = match username {
                Some(username) => username,
                None => Input::<String>::new()
                    .with_prompt("CalDAV username")
                    .interact_text()?,
            };
            let password = match password {
                Some(password) => password,
                None => Password::new().with_prompt("CalDAV password").interact()?,
            };
            let sync = SyncConfig {
                url: caldav_url,
                username,
                password,
                calendar_name,
            };

            let config = ScheduleConfig::from(schedule);
            let (first_week, events) = fetch_schedule(&config, &user_agent).await?;

            let stamp = Utc::now();
            let mut filename = export.unwrap_or_else(|| format!("schedule_w{first_week}.ics"));
            ics::export(&events, &mut filename, stamp)?;
            println!("Saved {} events to {filename}", events.len());

            let client = caldav::Client::new(
                &sync.url,
                caldav::Credentials {
                    username: sync.username,
                    password: sync.password,
                },
                &user_agent,
            )?;
            let report = caldav::sync(&client, &events, &sync.calendar_name, stamp).await?;
            if report.created {
                println!("No calendars found, created '{}'", sync.calendar_name);
            }

            println!(
                "Done, {} events pushed to {}",
                report.pushed, report.calendar
            );
        }
        Command::Exams { group, url, export } => {
            let group = match group {
                Some(group) => group,
                None => {
                    println!("Tip: the group can be given directly, i.e.: fdibacal exams 87");
                    Input::<String>::new()
                        .with_prompt("Enter your group number")
                        .interact_text()?
                }
            };
            let config = ExamsConfig {
                url,
                group: utils::validate_group(&group)?,
            };

            println!("Fetching the exams of group {}...", config.group);
            let document = utils::get_webpage(&config.url, &user_agent).await?;
            let exams = exams::parse(&document, &config.group)?;
            let events = event::from_exams(&exams, &config.group);

            let mut filename =
                export.unwrap_or_else(|| format!("merged_exams_{}.ics", config.group));
            ics::export(&events, &mut filename, Utc::now())?;

            println!("Saved {} exams to {filename}", events.len());
        }
    }

    Ok(())
}

/// Fetch the weekly plans, returns the first semester week and the events
async fn fetch_schedule(
    config: &ScheduleConfig,
    user_agent: &str,
) -> Result<(i32, Vec<CalendarEvent>)> {
    println!("Fetching the timetable of group {}...", config.group);

    // The semester tells how the website numbers its weeks
    let semester = {
        let url = utils::schedule_url(&config.base_url, config.iso_week, &config.group);
        let document = utils::get_webpage(&url, user_agent).await?;
        Semester::detect(&document)
    };
    let first_week = info::deadjust(config.iso_week, semester);
    let last_week = first_week + config.weeks - 1;

    let mut events = vec![];
    let mut found = false;
    for week in first_week..=last_week {
        let url = utils::schedule_url(&config.base_url, week, &config.group);
        let document = utils::get_webpage(&url, user_agent).await?;

        if !utils::has_schedule(&document) {
            println!("Schedule for week {week} does not exist. Skipping...");
            continue;
        }

        println!("Processing schedule for week {week}...");
        found = true;
        let window = WeekWindow::new(config.year, week, Semester::detect(&document));
        let lectures = timetable::parse(&document, &window)?;
        events.extend(event::from_lectures(&lectures));
    }

    if !found {
        return Err(error::Error::NoSchedule {
            first: first_week,
            last: last_week,
        }
        .into());
    }

    Ok((first_week, events))
}
