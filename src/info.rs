use chrono::{Datelike, Duration, NaiveDate};
use scraper::{Html, Selector};

/// Semester announced in the page headings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semester {
    Summer,
    Winter,
    /// No heading told us, no adjustment is applied
    Unknown,
}

impl Semester {
    /// Find the semester in the `h2` headings of a page
    pub fn detect(document: &Html) -> Self {
        let sel_h2 = Selector::parse("h2").unwrap();

        for header in document.select(&sel_h2) {
            let text = header.text().collect::<String>();
            if text.contains("Sommersemester") {
                return Self::Summer;
            }
            if text.contains("Wintersemester") {
                return Self::Winter;
            }
        }

        Self::Unknown
    }

    /// Number of weeks between the first ISO week of the year and
    /// the first week of the semester
    pub const fn offset(self) -> i32 {
        match self {
            Self::Summer => 5,
            Self::Winter => 38,
            Self::Unknown => 0,
        }
    }
}

/// Semester week to ISO week
pub const fn adjust(week: i32, semester: Semester) -> i32 {
    week + semester.offset()
}

/// ISO week to semester week
pub const fn deadjust(week: i32, semester: Semester) -> i32 {
    week - semester.offset()
}

/// Week as the schedule website knows it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeekWindow {
    pub year: i32,
    /// Week number used in the URL of the website
    pub week: i32,
    pub semester: Semester,
}

impl WeekWindow {
    pub fn new(year: i32, week: i32, semester: Semester) -> Self {
        Self {
            year,
            week,
            semester,
        }
    }

    pub fn iso_week(&self) -> i32 {
        adjust(self.week, self.semester)
    }

    /// Date of a day of this week, `weekday` goes from 1 (monday) to 7 (sunday)
    pub fn date_of(&self, weekday: u32) -> Option<NaiveDate> {
        iso_to_gregorian(self.year, self.iso_week(), weekday)
    }
}

/// Turn an ISO week date into a gregorian date.
///
/// The 4th of January is always in the first ISO week, weeks past the end
/// of the year roll over into the next one.
pub fn iso_to_gregorian(year: i32, week: i32, weekday: u32) -> Option<NaiveDate> {
    let fourth = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let days = i64::from(weekday) - i64::from(fourth.weekday().number_from_monday())
        + 7 * (i64::from(week) - 1);

    fourth.checked_add_signed(Duration::days(days))
}
