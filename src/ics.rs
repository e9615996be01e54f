use chrono::{DateTime, TimeZone, Utc};
use ics::{
    escape_text,
    properties::{Description, DtEnd, DtStart, Location, Summary},
    Event, ICalendar,
};

use crate::error::Result;
use crate::event::CalendarEvent;

const PRODID: &str = concat!("-//fdibacal//", env!("CARGO_PKG_VERSION"), "//EN");

/// Build the content of the calendar, `stamp` is the creation time of the events
pub fn calendar(events: &[CalendarEvent], stamp: DateTime<Utc>) -> String {
    let mut calendar = ICalendar::new("2.0", PRODID);
    let dtstamp = dt_ical(&stamp);

    for event in events {
        let mut vevent = Event::new(event.uid.as_str(), dtstamp.clone());

        vevent.push(Summary::new(escape_text(event.summary.as_str())));
        vevent.push(Description::new(escape_text(event.description.as_str())));
        vevent.push(Location::new(escape_text(event.location.as_str())));
        vevent.push(DtStart::new(dt_ical(&event.start)));
        vevent.push(DtEnd::new(dt_ical(&event.end)));

        calendar.add_event(vevent);
    }

    calendar.to_string()
}

/// Write the events in an .ics file, the whole file is built before writing it
pub fn export(
    events: &[CalendarEvent],
    filename: &mut String,
    stamp: DateTime<Utc>,
) -> Result<()> {
    let content = calendar(events, stamp);

    // Add the extension if needed
    if !std::path::Path::new(filename.as_str())
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ics"))
    {
        *filename = format!("{filename}.ics");
    }

    std::fs::write(filename.as_str(), content)?;

    Ok(())
}

/// Datetime in UTC, as used by iCalendar
fn dt_ical<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ").to_string()
}
