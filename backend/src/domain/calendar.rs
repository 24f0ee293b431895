//! iCalendar export for confirmed hangouts.
//!
//! Only hangouts with status `assigned` can be exported: an open slot has no
//! confirmed sitter and a terminal slot is history. Text fields are escaped
//! per RFC 5545 and timestamps are rendered in UTC `YYYYMMDDTHHMMSSZ` form.

use chrono::{DateTime, Utc};

use crate::domain::error::Error;
use crate::domain::hangout::{Hangout, HangoutStatus};

/// Render a timestamp in the iCalendar UTC form `YYYYMMDDTHHMMSSZ`.
pub fn format_utc(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape text for embedding in an iCalendar property value.
///
/// Backslash, semicolon, and comma gain a leading backslash; newlines become
/// the literal `\n` sequence.
///
/// # Examples
/// ```
/// use dogcal_backend::domain::calendar::escape_text;
///
/// assert_eq!(escape_text("a,b;c\\d"), "a\\,b\\;c\\\\d");
/// assert_eq!(escape_text("two\nlines"), "two\\nlines");
/// ```
pub fn escape_text(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Stable calendar UID derived from the hangout id.
pub fn event_uid(hangout: &Hangout) -> String {
    format!("hangout-{}@dogcal", hangout.id())
}

/// Render a confirmed hangout as an iCalendar document.
///
/// `now` becomes the `DTSTAMP`; `pup_name` feeds the summary unless the
/// hangout carries a custom event name.
///
/// # Errors
/// Returns an `invalid_request` error when the hangout is not `assigned`; a
/// partial document is never produced.
pub fn hangout_to_ics(
    hangout: &Hangout,
    pup_name: &str,
    now: DateTime<Utc>,
) -> Result<String, Error> {
    if hangout.status() != HangoutStatus::Assigned {
        return Err(Error::invalid_request(
            "only assigned hangouts can be exported to a calendar",
        )
        .with_details(serde_json::json!({ "status": hangout.status().as_str() })));
    }

    let summary = match hangout.event_name() {
        Some(name) => name.to_owned(),
        None => format!("Dog hangout with {pup_name}"),
    };

    let mut lines = vec![
        "BEGIN:VCALENDAR".to_owned(),
        "VERSION:2.0".to_owned(),
        "PRODID:-//Dogcal//Hangouts//EN".to_owned(),
        "CALSCALE:GREGORIAN".to_owned(),
        "BEGIN:VEVENT".to_owned(),
        format!("UID:{}", event_uid(hangout)),
        format!("DTSTAMP:{}", format_utc(now)),
        format!("DTSTART:{}", format_utc(hangout.window().start_at())),
        format!("DTEND:{}", format_utc(hangout.window().end_at())),
        format!("SUMMARY:{}", escape_text(&summary)),
    ];
    if let Some(notes) = hangout.owner_notes() {
        lines.push(format!("DESCRIPTION:{}", escape_text(notes)));
    }
    lines.push("END:VEVENT".to_owned());
    lines.push("END:VCALENDAR".to_owned());

    let mut document = lines.join("\r\n");
    document.push_str("\r\n");
    Ok(document)
}
