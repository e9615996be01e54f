use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

/// Every exam lasts two hours
pub fn duration() -> TimeDelta {
    TimeDelta::hours(2)
}

#[derive(Clone, Debug)]
pub struct ExamSlot {
    pub subject: String,

    pub instructor: String,

    pub room: String,

    pub start: DateTime<Tz>,

    pub end: DateTime<Tz>,
}
