//! Shared fakes and fixtures for daytrip tests.
//!
//! In-memory implementations of the four external source traits, plus
//! canned candidate events. No network anywhere.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use daytrip_core::event::{CandidateEvent, EventDate, TicketInfo};
use daytrip_core::geo::{GeoPoint, TravelMode};
use daytrip_core::plan::SearchParams;
use daytrip_core::source::{DirectionsSource, EventsSource, GenerationSource, GeocodingSource};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Build a candidate event with a title, price fragment, and description.
pub fn event(title: &str, price: &str, description: &str) -> CandidateEvent {
    CandidateEvent {
        title: Some(title.to_string()),
        date: Some(EventDate {
            start_date: Some("2025-06-01".to_string()),
            when: Some("7:00 PM - 10:00 PM".to_string()),
        }),
        address: vec![format!("{title} venue, Austin")],
        description: Some(description.to_string()),
        ticket_info: vec![TicketInfo {
            price: Some(price.to_string()),
            ..Default::default()
        }],
    }
}

/// Two free-labeled events and one paid event, the usual test menu.
pub fn sample_events() -> Vec<CandidateEvent> {
    vec![
        event("Open Mic at the Park", "Free", "free outdoor music session"),
        event("Community Art Walk", "Free entry", "free self-guided gallery stroll"),
        event("Arena Concert", "$120", "big-name touring act"),
    ]
}

/// A generation response scheduling the given (title, cost) pairs.
pub fn generation_response(items: &[(&str, f64)]) -> String {
    let objects: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, (title, cost))| {
            format!(
                r#"{{"title": "{title}", "date": "2025-06-01",
                    "start_time": "{:02}:00", "end_time": "{:02}:00",
                    "location": "{title} venue, Austin",
                    "description": "scheduled stop", "ticket_info": "",
                    "estimated_cost": {cost}}}"#,
                10 + 2 * i,
                11 + 2 * i,
            )
        })
        .collect();
    format!("[{}]", objects.join(","))
}

// ---------------------------------------------------------------------------
// Fake sources
// ---------------------------------------------------------------------------

/// Events source returning a fixed list, or failing on demand.
pub struct FakeEventsSource {
    events: Vec<CandidateEvent>,
    fail: bool,
    calls: AtomicUsize,
}

impl FakeEventsSource {
    pub fn with_events(events: Vec<CandidateEvent>) -> Self {
        Self {
            events,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::with_events(Vec::new())
    }

    pub fn failing() -> Self {
        Self {
            events: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EventsSource for FakeEventsSource {
    async fn search(&self, _params: &SearchParams) -> Result<Vec<CandidateEvent>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("events provider unreachable"));
        }
        Ok(self.events.clone())
    }
}

/// Generation source replaying one canned response, recording each prompt.
pub struct FakeGenerationSource {
    response: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGenerationSource {
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts seen so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationSource for FakeGenerationSource {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(message) => Err(anyhow!("{message}")),
        }
    }
}

/// Geocoder resolving every query to one fixed point (or nothing).
pub struct FakeGeocoder {
    point: Option<GeoPoint>,
}

impl FakeGeocoder {
    pub fn resolving_to(point: GeoPoint) -> Self {
        Self { point: Some(point) }
    }

    pub fn unresolving() -> Self {
        Self { point: None }
    }
}

#[async_trait]
impl GeocodingSource for FakeGeocoder {
    async fn lookup(&self, _query: &str) -> Result<Option<GeoPoint>> {
        Ok(self.point)
    }
}

/// Directions source replaying a fixed polyline (or "unavailable").
pub struct FakeDirections {
    polyline: Option<Vec<GeoPoint>>,
}

impl FakeDirections {
    pub fn with_polyline(polyline: Vec<GeoPoint>) -> Self {
        Self {
            polyline: Some(polyline),
        }
    }

    pub fn unavailable() -> Self {
        Self { polyline: None }
    }
}

#[async_trait]
impl DirectionsSource for FakeDirections {
    async fn route(&self, _stops: &[GeoPoint], _mode: TravelMode) -> Result<Option<Vec<GeoPoint>>> {
        Ok(self.polyline.clone())
    }
}
