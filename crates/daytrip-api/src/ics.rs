//! ICS calendar rendering for a stored itinerary.
//!
//! Renders RFC 5545 text directly: one VEVENT per itinerary item, with
//! TEXT-value escaping and CRLF line endings. Items without a date use the
//! trip's first date; unparsable dates and times fall back to defaults
//! rather than failing the export.

use chrono::{NaiveDate, NaiveTime};

use daytrip_core::plan::{Itinerary, ItineraryItem};

const DEFAULT_START: &str = "09:00";
const DEFAULT_END: &str = "10:00";

/// Render an itinerary as ICS calendar content.
pub fn render(itinerary: &Itinerary) -> String {
    let default_date = itinerary
        .dates
        .first()
        .and_then(|d| parse_date(d))
        .unwrap_or_else(|| itinerary.created_at.date_naive());

    let mut out = String::with_capacity(512 + itinerary.items.len() * 256);
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "PRODID:-//daytrip//daytrip.app//");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, "CALSCALE:GREGORIAN");
    push_line(
        &mut out,
        &format!("X-WR-CALNAME:daytrip - {} itinerary", escape_text(&itinerary.city)),
    );

    let dtstamp = itinerary.created_at.format("%Y%m%dT%H%M%SZ").to_string();
    for (index, item) in itinerary.items.iter().enumerate() {
        push_event(&mut out, itinerary, item, index, default_date, &dtstamp);
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn push_event(
    out: &mut String,
    itinerary: &Itinerary,
    item: &ItineraryItem,
    index: usize,
    default_date: NaiveDate,
    dtstamp: &str,
) {
    let date = item
        .date
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(default_date);
    let start = parse_time(&item.start_time, DEFAULT_START);
    let end = parse_time(&item.end_time, DEFAULT_END);

    push_line(out, "BEGIN:VEVENT");
    push_line(out, &format!("UID:{}-{index}@daytrip", itinerary.id));
    push_line(out, &format!("DTSTAMP:{dtstamp}"));
    push_line(
        out,
        &format!("DTSTART:{}T{}00", date.format("%Y%m%d"), start.format("%H%M")),
    );
    push_line(
        out,
        &format!("DTEND:{}T{}00", date.format("%Y%m%d"), end.format("%H%M")),
    );
    push_line(out, &format!("SUMMARY:{}", escape_text(&item.title)));
    push_line(out, &format!("DESCRIPTION:{}", escape_text(&item.description)));
    push_line(out, &format!("LOCATION:{}", escape_text(&item.location)));
    push_line(out, "END:VEVENT");
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str("\r\n");
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Parse `HH:MM`, falling back to a default on anything else.
fn parse_time(text: &str, fallback: &str) -> NaiveTime {
    NaiveTime::parse_from_str(text, "%H:%M").unwrap_or_else(|_| {
        NaiveTime::parse_from_str(fallback, "%H:%M")
            .unwrap_or_else(|_| NaiveTime::default())
    })
}

/// Escape a TEXT property value per RFC 5545.
fn escape_text(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn item(title: &str, date: Option<&str>, start: &str, end: &str) -> ItineraryItem {
        ItineraryItem {
            title: title.to_string(),
            date: date.map(str::to_string),
            start_time: start.to_string(),
            end_time: end.to_string(),
            location: "Jazz Club, Austin, TX".to_string(),
            description: "An evening of smooth jazz".to_string(),
            ticket_info: "$15".to_string(),
            estimated_cost: 15.0,
        }
    }

    fn itinerary(items: Vec<ItineraryItem>) -> Itinerary {
        Itinerary {
            id: Uuid::nil(),
            city: "Austin".to_string(),
            state: "TX".to_string(),
            dates: vec!["2025-06-01".to_string()],
            budget: "$1-$50".to_string(),
            preferences: String::new(),
            excluded_events: Vec::new(),
            summary: "Your Austin adventure".to_string(),
            curated: false,
            items,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn renders_one_vevent_per_item() {
        let ics = render(&itinerary(vec![
            item("Jazz Night", Some("2025-06-01"), "19:00", "22:00"),
            item("Farmers Market", Some("2025-06-02"), "09:00", "13:00"),
        ]));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(ics.matches("END:VEVENT").count(), 2);
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("DTSTART:20250601T190000"));
        assert!(ics.contains("DTEND:20250602T130000"));
    }

    #[test]
    fn dateless_item_uses_first_trip_date() {
        let ics = render(&itinerary(vec![item("Jazz Night", None, "19:00", "22:00")]));
        assert!(ics.contains("DTSTART:20250601T190000"));
    }

    #[test]
    fn bad_times_fall_back_to_defaults() {
        let ics = render(&itinerary(vec![item(
            "Jazz Night",
            Some("2025-06-01"),
            "around 7pm",
            "late",
        )]));
        assert!(ics.contains("DTSTART:20250601T090000"));
        assert!(ics.contains("DTEND:20250601T100000"));
    }

    #[test]
    fn text_values_are_escaped() {
        let ics = render(&itinerary(vec![item(
            "Dinner, then a show; maybe",
            Some("2025-06-01"),
            "18:00",
            "21:00",
        )]));
        assert!(ics.contains("SUMMARY:Dinner\\, then a show\\; maybe"));
        assert!(ics.contains("LOCATION:Jazz Club\\, Austin\\, TX"));
    }

    #[test]
    fn uids_are_stable_per_item() {
        let it = itinerary(vec![item("A", None, "10:00", "11:00")]);
        let first = render(&it);
        let second = render(&it);
        let uid_line = |s: &str| {
            s.lines()
                .find(|l| l.starts_with("UID:"))
                .map(str::to_string)
        };
        assert_eq!(uid_line(&first), uid_line(&second));
    }
}
