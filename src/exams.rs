use chrono::{NaiveDateTime, TimeZone};
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::config::TIMEZONE;
use crate::error::{Error, Result};

pub mod models;

use models::ExamSlot;

/// Format of the date column
const DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Heading introducing the exams of a group
fn group_heading(group: &str) -> String {
    format!("Група : {group}")
}

/// True when `text` holds the heading of exactly this group, `87` is not `8`
fn is_group_heading(text: &str, heading: &str) -> bool {
    text.match_indices(heading).any(|(at, _)| {
        !text[at + heading.len()..].starts_with(|c: char| c.is_ascii_digit())
    })
}

fn text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_owned()
}

/// Fetch the exams of a group from the exam schedule page
pub fn parse(document: &Html, group: &str) -> Result<Vec<ExamSlot>> {
    // Selectors, headings and tables come in document order
    let sel_heading_table = Selector::parse("h4, table").unwrap();
    let sel_tr = Selector::parse("tr").unwrap();
    let sel_td = Selector::parse("td").unwrap();

    let target = group_heading(group);
    let mut elements = document.select(&sel_heading_table);

    // Find the heading of the group
    if !elements.by_ref().any(|element| {
        element.value().name() == "h4" && is_group_heading(&text(element), &target)
    }) {
        return Err(Error::GroupNotFound(group.to_owned()));
    }

    // Then the table right after it
    let Some(table) = elements.find(|element| element.value().name() == "table") else {
        return Err(Error::NoExams(group.to_owned()));
    };

    let mut exams = vec![];
    for row in table.select(&sel_tr).skip(1) {
        let cols: Vec<String> = row.select(&sel_td).map(text).collect();
        let [subject, _, instructor, room, date, ..] = &cols[..] else {
            warn!("Exam row with {} columns, skipping.", cols.len());
            continue;
        };

        let Some(start) = NaiveDateTime::parse_from_str(date, DATE_FORMAT)
            .ok()
            .and_then(|naive| TIMEZONE.from_local_datetime(&naive).earliest())
        else {
            warn!("Unreadable date '{date}' for '{subject}', skipping.");
            continue;
        };

        exams.push(ExamSlot {
            subject: subject.clone(),
            instructor: instructor.clone(),
            room: room.clone(),
            start,
            end: start + models::duration(),
        });
    }

    if exams.is_empty() {
        return Err(Error::NoExams(group.to_owned()));
    }

    Ok(exams)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<html><body>
<h4>Група : 86</h4>
<table>
  <tr><th>Дисциплина</th><th>Форма</th><th>Преподавател</th><th>Зала</th><th>Дата</th></tr>
  <tr><td>Algorithms</td><td>писмен</td><td>Dr. Y</td><td>1101</td><td>02.06.2025 09:00</td></tr>
</table>
<h4>Група : 87</h4>
<table>
  <tr><th>Дисциплина</th><th>Форма</th><th>Преподавател</th><th>Зала</th><th>Дата</th></tr>
  <tr><td>Databases</td><td>писмен</td><td>Dr. X</td><td>305</td><td>06.06.2025 11:30</td></tr>
  <tr><td>Broken</td><td>писмен</td></tr>
  <tr><td>Networks</td><td>устен</td><td>Prof. Z</td><td>4204</td><td>скоро</td></tr>
  <tr><td>Compilers</td><td>устен</td><td>Prof. Z</td><td>4204</td><td>10.06.2025 08:00</td></tr>
</table>
</body></html>
"#;

    #[test]
    fn exams_of_the_group() {
        let document = Html::parse_document(PAGE);
        let exams = parse(&document, "87").unwrap();

        assert_eq!(exams.len(), 2);

        let databases = &exams[0];
        assert_eq!(databases.subject, "Databases");
        assert_eq!(databases.instructor, "Dr. X");
        assert_eq!(databases.room, "305");
        assert_eq!(databases.start.to_rfc3339(), "2025-06-06T11:30:00+03:00");
        assert_eq!(databases.end.to_rfc3339(), "2025-06-06T13:30:00+03:00");

        assert_eq!(exams[1].subject, "Compilers");
    }

    #[test]
    fn only_the_table_after_the_heading() {
        let document = Html::parse_document(PAGE);
        let exams = parse(&document, "86").unwrap();

        assert_eq!(exams.len(), 1);
        assert_eq!(exams[0].subject, "Algorithms");
    }

    #[test]
    fn unknown_group() {
        let document = Html::parse_document(PAGE);

        assert!(matches!(
            parse(&document, "12"),
            Err(Error::GroupNotFound(group)) if group == "12"
        ));
    }

    #[test]
    fn group_is_matched_whole() {
        let document = Html::parse_document(PAGE);

        assert!(matches!(
            parse(&document, "8"),
            Err(Error::GroupNotFound(group)) if group == "8"
        ));
        assert!(is_group_heading("Група : 87 (КСТНЕ)", "Група : 87"));
        assert!(!is_group_heading("Група : 871", "Група : 87"));
    }

    #[test]
    fn heading_without_exams() {
        let document = Html::parse_document(
            "<h4>Група : 5</h4><table><tr><th>Дисциплина</th></tr></table>",
        );

        assert!(matches!(parse(&document, "5"), Err(Error::NoExams(_))));
    }
}
