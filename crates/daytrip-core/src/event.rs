//! Candidate event model.
//!
//! The events provider enforces no schema: fields come and go, addresses are
//! sometimes a string and sometimes an array, ticket info may be missing or
//! junk. Every field here is optional and deserialization is tolerant; the
//! normalizer extracts what it can and never trusts any of it.

use serde::{Deserialize, Deserializer, Serialize};

/// A raw event record from the external events source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateEvent {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<EventDate>,
    /// One or more address lines. Tolerates a bare string upstream.
    #[serde(default, deserialize_with = "string_or_seq")]
    pub address: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ticket_info: Vec<TicketInfo>,
}

/// Free-form date descriptor attached to a candidate event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventDate {
    #[serde(default)]
    pub start_date: Option<String>,
    /// Human-readable schedule text, e.g. "7:00 PM - 10:00 PM".
    #[serde(default)]
    pub when: Option<String>,
}

/// A ticket-info fragment; `price` is free text when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketInfo {
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

impl CandidateEvent {
    /// The event title, or a placeholder for untitled records.
    pub fn title_or_untitled(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled event")
    }

    /// Serialize the whole record to one string for membership tests.
    ///
    /// Used by the free-event heuristic, which scans the entire record
    /// rather than just the price fields.
    pub fn combined_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Accept either `"addr"` or `["addr", ...]`; anything else becomes empty.
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => vec![s],
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}
