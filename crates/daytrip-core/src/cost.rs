//! Cost extraction from free-text price fragments.
//!
//! Upstream ticket info is whatever the events provider scraped: "$15",
//! "Free", "$20-$30", "$1,200", or garbage. Parsing fails soft to 0.0 --
//! a wrong-but-cheap estimate is preferable to dropping an event.

use crate::event::CandidateEvent;

/// Try to extract a numeric cost from a price fragment.
///
/// Strips the currency symbol and thousands separators; for a range, takes
/// the lower bound. Returns `None` when nothing numeric remains.
pub fn try_parse_cost(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace('$', "").replace(',', "");
    let lower_bound = cleaned.split('-').next()?.trim().to_string();
    let value: f64 = lower_bound.parse().ok()?;
    if value.is_finite() && value >= 0.0 {
        Some(value)
    } else {
        None
    }
}

/// Extract a numeric cost from a price fragment, 0.0 on any failure.
pub fn parse_cost(text: &str) -> f64 {
    try_parse_cost(text).unwrap_or(0.0)
}

/// Case-insensitive "free" membership test on a text fragment.
///
/// Intentionally loose: "Free entry" and "freedom rally" both match. The
/// upstream data is too messy for anything stricter to be worth it.
pub fn is_free_text(text: &str) -> bool {
    text.to_lowercase().contains("free")
}

/// Best-effort cost of a candidate event: the first ticket-info fragment
/// whose price parses. Events with no parseable price count as 0.0.
pub fn event_cost(event: &CandidateEvent) -> f64 {
    event
        .ticket_info
        .iter()
        .filter_map(|info| info.price.as_deref())
        .filter_map(try_parse_cost)
        .next()
        .unwrap_or(0.0)
}

/// Free-membership test over the entire stringified event record.
///
/// Matches the word "free" anywhere in the serialized event, including
/// descriptions. See the normalizer for why the `$0` tier filters on this
/// rather than on [`event_cost`].
pub fn is_free_event(event: &CandidateEvent) -> bool {
    is_free_text(&event.combined_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TicketInfo;

    #[test]
    fn parses_plain_dollar_amount() {
        assert_eq!(parse_cost("$15"), 15.0);
        assert_eq!(parse_cost("15"), 15.0);
        assert_eq!(parse_cost("  $42.50 "), 42.5);
    }

    #[test]
    fn range_uses_lower_bound() {
        assert_eq!(parse_cost("$20-$30"), 20.0);
        assert_eq!(parse_cost("20-30"), 20.0);
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(parse_cost("$1,200"), 1200.0);
    }

    #[test]
    fn failures_are_soft_zero() {
        assert_eq!(parse_cost(""), 0.0);
        assert_eq!(parse_cost("Free"), 0.0);
        assert_eq!(parse_cost("garbage"), 0.0);
        assert_eq!(parse_cost("$"), 0.0);
        assert_eq!(parse_cost("-5"), 0.0);
    }

    #[test]
    fn free_text_is_case_insensitive() {
        assert!(is_free_text("Free"));
        assert!(is_free_text("FREE entry"));
        assert!(is_free_text("freedom rally")); // loose on purpose
        assert!(!is_free_text("$10"));
    }

    #[test]
    fn event_cost_takes_first_parseable_fragment() {
        let event = CandidateEvent {
            title: Some("Show".to_string()),
            ticket_info: vec![
                TicketInfo {
                    price: Some("sold out".to_string()),
                    ..Default::default()
                },
                TicketInfo {
                    price: Some("$25".to_string()),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(event_cost(&event), 25.0);
    }

    #[test]
    fn event_cost_defaults_to_zero() {
        assert_eq!(event_cost(&CandidateEvent::default()), 0.0);
    }

    #[test]
    fn free_membership_sees_the_whole_record() {
        let event = CandidateEvent {
            title: Some("Gallery Opening".to_string()),
            description: Some("Admission is free for all ages.".to_string()),
            ticket_info: vec![TicketInfo {
                price: Some("$5 suggested".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        };
        // A stray nonzero price string does not defeat the free label.
        assert!(is_free_event(&event));
        assert_eq!(event_cost(&event), 5.0);
    }
}
