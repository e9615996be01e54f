use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, TimeZone};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, warn};

use crate::config::TIMEZONE;
use crate::error::{CellError, Error, Result};
use crate::info::WeekWindow;

pub mod models;

use models::{Cell, LectureSlot, SessionType, TimeSlot};

/// Days as written in the first column, in short and long form
const DAYS: [(&str, u32); 14] = [
    ("Mo", 1),
    ("Montag", 1),
    ("Di", 2),
    ("Dienstag", 2),
    ("Mi", 3),
    ("Mittwoch", 3),
    ("Do", 4),
    ("Donnerstag", 4),
    ("Fr", 5),
    ("Freitag", 5),
    ("Sa", 6),
    ("Samstag", 6),
    ("So", 7),
    ("Sonntag", 7),
];

// h1:m1 => start of the slot, h2:m2 => end of the slot
static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<h1>\d{1,2})(h|:)(?P<m1>\d{1,2})?\s*[-–]\s*(?P<h2>\d{1,2})(h|:)(?P<m2>\d{1,2})?")
        .unwrap()
});

/// ISO number of a day, from 1 (monday) to 7 (sunday)
pub fn weekday_number(name: &str) -> Option<u32> {
    DAYS.iter()
        .find(|(day, _)| *day == name)
        .map(|(_, number)| *number)
}

/// Read a column header such as `7:30-8:15`
pub fn parse_slot(text: &str) -> Option<TimeSlot> {
    let captures = HOURS.captures(text)?;
    let number = |name: &str| -> Option<u32> {
        match captures.name(name) {
            Some(n) => n.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(TimeSlot {
        start: NaiveTime::from_hms_opt(number("h1")?, number("m1")?, 0)?,
        end: NaiveTime::from_hms_opt(number("h2")?, number("m2")?, 0)?,
    })
}

/// Non-empty trimmed lines of an element's text
pub fn element_lines(element: ElementRef) -> Vec<String> {
    element
        .text()
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Read the lines of an occupied cell.
///
/// The first line looks like `V - 1203 Prof. Dr. Name` : the session type,
/// a dash, the room, then the lecturer. When the line got wrapped right after
/// the session type, the following line starts with the dash and is glued back.
/// The last line is the course. `link` is the text of the lecturer's link,
/// preferred over the end of the first line.
pub fn parse_cell(lines: &[String], link: Option<&str>) -> std::result::Result<Cell, CellError> {
    let [first, next, ..] = lines else {
        return Err(CellError::TooFewLines(lines.to_vec()));
    };
    let course = &lines[lines.len() - 1];

    let header = if SessionType::from_prefix(first).is_some() && next.starts_with('-') {
        format!("{first} - {}", next.trim_start_matches('-').trim())
    } else {
        first.clone()
    };

    let parts: Vec<&str> = header.split_whitespace().collect();
    let prefix = parts.first().copied().unwrap_or_default();
    let category = SessionType::from_prefix(prefix)
        .ok_or_else(|| CellError::UnknownPrefix(prefix.to_owned()))?;
    let room = parts
        .get(2)
        .ok_or_else(|| CellError::MissingRoom(header.clone()))?;

    let lecturer = match link {
        Some(name) => name.trim().to_owned(),
        None => parts[3..].join(" "),
    };

    Ok(Cell {
        course: course.clone(),
        category,
        room: (*room).to_owned(),
        lecturer,
    })
}

/// Extract every occupied slot of a weekly plan
pub fn parse(document: &Html, window: &WeekWindow) -> Result<Vec<LectureSlot>> {
    // Selectors
    let sel_table = Selector::parse("table.plan").unwrap();
    let sel_tr = Selector::parse("tr").unwrap();
    let sel_th = Selector::parse("th").unwrap();
    let sel_td = Selector::parse("td").unwrap();

    // Find the timetable
    let table = document
        .select(&sel_table)
        .next()
        .ok_or(Error::MissingTable(window.week))?;

    let mut rows = table.select(&sel_tr);

    // Hours of each column, skipping the column of the days
    let slots: Vec<Option<TimeSlot>> = rows
        .next()
        .map(|header| {
            header
                .select(&sel_th)
                .skip(1)
                .map(|th| {
                    let text = th.text().collect::<String>();
                    let slot = parse_slot(text.trim());
                    if slot.is_none() {
                        warn!("Unreadable time slot '{}'", text.trim());
                    }
                    slot
                })
                .collect()
        })
        .unwrap_or_default();

    let mut timetable = Vec::new();
    for row in rows {
        let Some(day) = row
            .select(&sel_th)
            .next()
            .map(|th| th.text().collect::<String>().trim().to_owned())
        else {
            warn!("Row without day, skipping.");
            continue;
        };

        let Some(weekday) = weekday_number(&day) else {
            warn!("Unknown day '{day}', skipping.");
            continue;
        };
        let Some(date) = window.date_of(weekday) else {
            warn!("No date for '{day}' in week {}, skipping.", window.iso_week());
            continue;
        };

        // Position in the slots, moved by the span of every cell
        let mut col = 0;
        for cell in row.select(&sel_td) {
            let span = colspan(cell);

            if cell.value().classes().any(|class| class == "busy") {
                if let Some(lecture) = read_cell(cell, &day, date, &slots, col, span) {
                    timetable.push(lecture);
                }
            }

            // A huge colspan puts the cursor past every slot, not past usize
            col = col.saturating_add(span);
        }

        if col != slots.len() {
            debug!(
                "Row '{day}' covers {col} slots, the header has {}",
                slots.len()
            );
        }
    }

    Ok(timetable)
}

/// Number of columns taken by a cell
fn colspan(cell: ElementRef) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|span| span.trim().parse().ok())
        .unwrap_or(1)
        .max(1)
}

/// Build a lecture from an occupied cell, `None` when the cell is skipped
fn read_cell(
    cell: ElementRef,
    day: &str,
    date: NaiveDate,
    slots: &[Option<TimeSlot>],
    col: usize,
    span: usize,
) -> Option<LectureSlot> {
    let sel_a = Selector::parse("a").unwrap();

    let last_col = col.checked_add(span - 1);
    let (Some(Some(first)), Some(Some(last))) =
        (slots.get(col), last_col.and_then(|last| slots.get(last)))
    else {
        warn!("No time slot for column {col} (span {span}) on '{day}', skipping.");
        return None;
    };

    let lines = element_lines(cell);
    let link = cell
        .select(&sel_a)
        .next()
        .map(|a| a.text().collect::<String>());

    let content = match parse_cell(&lines, link.as_deref()) {
        Ok(content) => content,
        Err(e @ CellError::TooFewLines(_)) => {
            warn!("Skipping {e}");
            return None;
        }
        Err(e) => {
            error!("Cell on '{day}' at column {col}: {e}");
            return None;
        }
    };

    let (Some(start), Some(end)) = (
        TIMEZONE
            .from_local_datetime(&date.and_time(first.start))
            .earliest(),
        TIMEZONE
            .from_local_datetime(&date.and_time(last.end))
            .earliest(),
    ) else {
        warn!(
            "'{}' on '{day}' falls in a clock change gap, skipping.",
            content.course
        );
        return None;
    };
    if end <= start {
        warn!(
            "'{}' on '{day}' ends before it starts, skipping.",
            content.course
        );
        return None;
    }

    Some(LectureSlot {
        day: day.to_owned(),
        start,
        end,
        course: content.course,
        category: content.category,
        room: content.room,
        lecturer: content.lecturer,
    })
}
