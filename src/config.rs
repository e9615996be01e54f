use chrono::{Datelike, Utc};
use chrono_tz::Tz;

/// Every date of the schedules is in this timezone
pub const TIMEZONE: Tz = chrono_tz::Europe::Sofia;

/// Weekly plan of a group, `&week=<n>&group=<g>` gets appended
pub const BASE_URL: &str = "https://programm.fdiba.tu-sofia.bg/de/?q=plan_group";

/// Summer exams of the FaGIOPM KSTNE stream
pub const EXAMS_URL: &str = "https://tu-sofia.bg/examsfiles/\
%D0%A4%D0%B0%D0%93%D0%98%D0%9E%D0%9F%D0%9C-\
%D0%9A%D0%A1%D0%A2%D0%9D%D0%95--potok-17-kurs-2_1.html";

pub const DEFAULT_GROUP: &str = "339";

/// Number of weeks fetched in a row
pub const DEFAULT_WEEKS: i32 = 3;

pub const CALDAV_URL: &str = "http://localhost:5232/";

/// Name of the collection created when the server has none
pub const CALENDAR_NAME: &str = "TU Schedule";

/// Environment variable read for the CalDAV password
pub const PASSWORD_ENV: &str = "FDIBACAL_CALDAV_PASSWORD";

/// What to scrape from the weekly plan
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    pub base_url: String,
    pub group: String,
    pub year: i32,
    /// ISO week used to find out the semester, the run starts from there
    pub iso_week: i32,
    pub weeks: i32,
}

impl ScheduleConfig {
    pub fn new(
        base_url: String,
        group: String,
        year: Option<i32>,
        iso_week: Option<i32>,
        weeks: i32,
    ) -> Self {
        Self {
            base_url,
            group,
            year: get_year(year),
            iso_week: get_week(iso_week),
            weeks,
        }
    }
}

/// Where to push the events
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub calendar_name: String,
}

#[derive(Clone, Debug)]
pub struct ExamsConfig {
    pub url: String,
    pub group: String,
}

/// Get the current year if none is asked
pub fn get_year(year: Option<i32>) -> i32 {
    match year {
        // Force the asked year
        Some(n) => n,
        None => Utc::now().year(),
    }
}

/// Get the current ISO week if none is asked
pub fn get_week(week: Option<i32>) -> i32 {
    match week {
        Some(n) => n,
        None => i32::try_from(Utc::now().iso_week().week()).unwrap_or(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asked_values_win_over_the_clock() {
        let config = ScheduleConfig::new(BASE_URL.to_owned(), "87".to_owned(), Some(2025), Some(10), 2);

        assert_eq!(config.year, 2025);
        assert_eq!(config.iso_week, 10);
        assert_eq!(config.weeks, 2);
        assert_eq!(config.group, "87");
    }

    #[test]
    fn clock_defaults() {
        let week = get_week(None);

        assert!((1..=53).contains(&week));
        assert!(get_year(None) >= 2024);
    }
}
