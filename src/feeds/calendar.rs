//! Calendar feed (iCalendar, RFC 5545).
//!
//! One `VEVENT` per registered event, in registry order:
//!
//! ```text
//! BEGIN:VEVENT
//! UID:bootcamps/2013-06-paris.html@example.org
//! DTSTAMP:20130615T123000Z
//! DTSTART;VALUE=DATE:20130601
//! DTEND;VALUE=DATE:20130603
//! SUMMARY:Workshop at Paris\, Jun 1-2\, 2013
//! LOCATION:Paris
//! URL:http://example.org/bootcamps/2013-06-paris.html
//! GEO:48.8566;2.3522
//! END:VEVENT
//! ```
//!
//! `DTEND` is exclusive: the day after the last day of the event. Lines end
//! in CRLF and are folded at 75 octets.

use crate::config::CalendarConfig;
use crate::naming;
use crate::registry::EventRecord;
use chrono::{DateTime, Days, NaiveDate, Utc};

const LINE_LIMIT: usize = 75;

/// Build the calendar document.
pub fn calendar(events: &[EventRecord], site: &str, now: DateTime<Utc>, config: &CalendarConfig) -> String {
    let stamp = now.format("%Y%m%dT%H%M%SZ").to_string();
    let domain = naming::site_domain(site);

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        format!("PRODID:{}", escape(&config.product_id)),
    ];
    for event in events {
        lines.push("BEGIN:VEVENT".to_string());
        lines.push(format!("UID:{}@{domain}", naming::url_path(&event.path)));
        lines.push(format!("DTSTAMP:{stamp}"));
        lines.push(format!("DTSTART;VALUE=DATE:{}", ical_date(event.start)));
        lines.push(format!("DTEND;VALUE=DATE:{}", ical_date(exclusive_end(event))));
        lines.push(format!(
            "SUMMARY:{}",
            escape(&format!("{} at {}, {}", config.summary_prefix, event.venue, event.date))
        ));
        lines.push(format!("LOCATION:{}", escape(&event.venue)));
        lines.push(format!("URL:{}", naming::canonical_link(site, &event.path)));
        if let Some(geo) = event.coordinates {
            lines.push(format!("GEO:{};{}", geo.latitude, geo.longitude));
        }
        lines.push("END:VEVENT".to_string());
    }
    lines.push("END:VCALENDAR".to_string());

    lines.iter().map(|line| fold(line) + "\r\n").collect()
}

/// Day after the last day of the event.
pub fn exclusive_end(event: &EventRecord) -> NaiveDate {
    let last = event.end.unwrap_or(event.start);
    last.checked_add_days(Days::new(1)).unwrap_or(last)
}

fn ical_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Fold a content line at 75 octets without splitting a character.
/// Continuation lines start with a single space.
pub fn fold(line: &str) -> String {
    let mut folded = String::with_capacity(line.len() + line.len() / LINE_LIMIT * 3);
    let mut width = 0;
    for c in line.chars() {
        let len = c.len_utf8();
        if width + len > LINE_LIMIT {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(c);
        width += len;
    }
    folded
}
