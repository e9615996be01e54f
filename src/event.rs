use chrono::DateTime;
use chrono_tz::Tz;

use crate::exams::models::ExamSlot;
use crate::timetable::models::LectureSlot;

/// Domain closing every identifier
const UID_DOMAIN: &str = "tusofia";

/// Event ready to be written in a calendar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalendarEvent {
    /// Same source fields give the same identifier from one run to the next
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

impl From<&LectureSlot> for CalendarEvent {
    fn from(lecture: &LectureSlot) -> Self {
        Self {
            uid: format!("{}-{}@{UID_DOMAIN}", lecture.day, lecture.start.to_rfc3339()),
            summary: lecture.course.clone(),
            description: format!(
                "Lecturer: {}\nType: {}",
                lecture.lecturer,
                lecture.category.label()
            ),
            location: lecture.room.clone(),
            start: lecture.start,
            end: lecture.end,
        }
    }
}

pub fn from_lectures(lectures: &[LectureSlot]) -> Vec<CalendarEvent> {
    lectures.iter().map(CalendarEvent::from).collect()
}

/// Exams are numbered from 1 in the order of the page
pub fn from_exams(exams: &[ExamSlot], group: &str) -> Vec<CalendarEvent> {
    exams
        .iter()
        .zip(1..)
        .map(|(exam, index): (&ExamSlot, usize)| CalendarEvent {
            uid: format!("exam-{group}-{index}@{UID_DOMAIN}"),
            summary: exam.subject.clone(),
            description: format!("Instructor: {}", exam.instructor),
            location: exam.room.clone(),
            start: exam.start,
            end: exam.end,
        })
        .collect()
}
