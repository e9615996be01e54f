use thiserror::Error;

/// Fatal errors, any of them ends the run
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid group '{0}': must be a non-negative integer")]
    InvalidGroup(String),

    #[error("network error while fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {url} (HTTP {status})")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("no timetable found for week {0}")]
    MissingTable(i32),

    #[error("no heading found for group {0}")]
    GroupNotFound(String),

    #[error("no exams found for group {0}")]
    NoExams(String),

    #[error("no schedule available for weeks {first} to {last}")]
    NoSchedule { first: i32, last: i32 },

    #[error("CalDAV error: {0}")]
    CalDav(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anomalies in a single timetable cell, the cell is skipped
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CellError {
    #[error("malformed cell: {0:?}")]
    TooFewLines(Vec<String>),

    #[error("unknown session type prefix '{0}'")]
    UnknownPrefix(String),

    #[error("no room in '{0}'")]
    MissingRoom(String),
}

pub type Result<T> = std::result::Result<T, Error>;
