use chrono::{DateTime, NaiveTime};
use chrono_tz::Tz;

/// Kind of session, as announced by the prefix of a cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionType {
    /// Vorlesung
    Lecture,
    /// Laborübung
    Lab,
    /// Seminarübung
    Seminar,
}

/// Prefixes used in the timetable cells
const PREFIXES: [(&str, SessionType); 3] = [
    ("V", SessionType::Lecture),
    ("LU", SessionType::Lab),
    ("SU", SessionType::Seminar),
];

impl SessionType {
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        PREFIXES
            .iter()
            .find(|(known, _)| *known == prefix)
            .map(|(_, session)| *session)
    }

    /// Full name of the session type
    pub const fn label(self) -> &'static str {
        match self {
            Self::Lecture => "Vorlesung",
            Self::Lab => "Laborübung",
            Self::Seminar => "Seminarübung",
        }
    }
}

/// Column of the timetable
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// What can be read from the text of an occupied cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// Course's name
    pub course: String,

    pub category: SessionType,

    pub room: String,

    /// Lecturer's name, may be empty when the cell doesn't tell
    pub lecturer: String,
}

#[derive(Clone, Debug)]
pub struct LectureSlot {
    /// Day's name, as written in the timetable
    pub day: String,

    pub start: DateTime<Tz>,

    pub end: DateTime<Tz>,

    /// Course's name
    pub course: String,

    pub category: SessionType,

    pub room: String,

    pub lecturer: String,
}
