//! Event normalization: dedupe, budget filtering with progressive
//! relaxation, exclusion filtering, and synthetic fallback substitution.
//!
//! The guarantee this module provides downstream is that the candidate set is
//! never empty unless the caller's exclusion list swallows the fallback set
//! too. Order matters: budget filter, cap, exclusions, then the fallback
//! check -- so an exclusion list that empties the set still triggers
//! substitution.

use crate::budget::{BudgetTier, RELAXATION_LADDER, RelaxationStep, limits_for};
use crate::cost::{event_cost, is_free_event};
use crate::event::{CandidateEvent, EventDate, TicketInfo};
use crate::plan::SearchParams;

/// Hard cap on candidates handed to the generation stage.
pub const MAX_CANDIDATES: usize = 20;

/// Result of normalization. `curated` is set when the synthetic fallback set
/// was substituted for live data; the itinerary summary reflects it.
#[derive(Debug, Clone)]
pub struct NormalizedEvents {
    pub events: Vec<CandidateEvent>,
    pub curated: bool,
}

/// Normalize raw candidate events for one planning request.
pub fn normalize(raw: Vec<CandidateEvent>, params: &SearchParams) -> NormalizedEvents {
    let deduped = dedupe(raw);
    let filtered = budget_filter(deduped, &params.budget);

    let mut events: Vec<CandidateEvent> = filtered.into_iter().take(MAX_CANDIDATES).collect();
    apply_exclusions(&mut events, &params.excluded_events);

    if !events.is_empty() {
        return NormalizedEvents {
            events,
            curated: false,
        };
    }

    tracing::info!(
        city = %params.city,
        "no candidates survived filtering; substituting curated fallback events"
    );
    let first_date = params.dates.first().map(String::as_str).unwrap_or("");
    let mut fallback = fallback_events(&params.city, first_date);
    apply_exclusions(&mut fallback, &params.excluded_events);

    NormalizedEvents {
        events: fallback,
        curated: true,
    }
}

/// Drop repeated titles, keeping the first occurrence. Untitled records are
/// kept as-is; the planner can still schedule around them.
fn dedupe(events: Vec<CandidateEvent>) -> Vec<CandidateEvent> {
    let mut seen = std::collections::HashSet::new();
    let mut kept = Vec::with_capacity(events.len());
    for event in events {
        match &event.title {
            Some(title) => {
                if seen.insert(title.trim().to_lowercase()) {
                    kept.push(event);
                }
            }
            None => kept.push(event),
        }
    }
    kept
}

/// Apply the tier's budget filter.
///
/// The `$0` tier filters on free membership, not the numeric parser: an
/// event labeled free with a stray nonzero price string stays in. All other
/// tiers walk the relaxation ladder until a step yields candidates.
fn budget_filter(events: Vec<CandidateEvent>, tier_label: &str) -> Vec<CandidateEvent> {
    if BudgetTier::from_label(tier_label) == Some(BudgetTier::Free) {
        let free: Vec<CandidateEvent> = events.into_iter().filter(is_free_event).collect();
        if free.is_empty() {
            tracing::info!("no free-labeled events for the $0 tier");
        }
        return free;
    }

    let limits = limits_for(tier_label);
    for step in RELAXATION_LADDER {
        let kept: Vec<CandidateEvent> = match step.ceiling(limits.per_item_max) {
            Some(ceiling) => events
                .iter()
                .filter(|e| event_cost(e) <= ceiling)
                .cloned()
                .collect(),
            None => events.clone(),
        };
        if !kept.is_empty() {
            if step != RelaxationStep::Strict {
                tracing::warn!(
                    step = %step,
                    tier = tier_label,
                    kept = kept.len(),
                    "budget filter relaxed to produce candidates"
                );
            }
            return kept;
        }
        tracing::info!(step = %step, tier = tier_label, "budget filter step yielded nothing");
    }
    Vec::new()
}

/// Remove events whose title exactly matches an exclusion entry.
fn apply_exclusions(events: &mut Vec<CandidateEvent>, exclusions: &[String]) {
    if exclusions.is_empty() {
        return;
    }
    events.retain(|event| {
        event
            .title
            .as_deref()
            .is_none_or(|title| !exclusions.iter().any(|x| x == title))
    });
}

/// Fixed, deterministic synthetic events substituted when real candidates
/// are exhausted. City-parameterized; spans free daytime activities and paid
/// evening ones so every tier has something to schedule.
pub fn fallback_events(city: &str, date: &str) -> Vec<CandidateEvent> {
    let entry = |title: &str, when: &str, address: String, description: &str, price: &str| {
        CandidateEvent {
            title: Some(title.to_string()),
            date: Some(EventDate {
                start_date: if date.is_empty() {
                    None
                } else {
                    Some(date.to_string())
                },
                when: Some(when.to_string()),
            }),
            address: vec![address],
            description: Some(description.to_string()),
            ticket_info: vec![TicketInfo {
                price: Some(price.to_string()),
                ..Default::default()
            }],
        }
    };

    vec![
        entry(
            "Local Art Gallery Opening",
            "10:00 AM - 2:00 PM",
            format!("Downtown {city}"),
            "Explore works by local artists in this community gallery showcase.",
            "Free",
        ),
        entry(
            "Farmers Market",
            "9:00 AM - 1:00 PM",
            format!("City Center, {city}"),
            "Fresh local produce, artisan goods, and live music.",
            "Free",
        ),
        entry(
            "Food Truck Festival",
            "11:00 AM - 8:00 PM",
            format!("Waterfront Park, {city}"),
            "Sample delicious cuisine from the city's best food trucks.",
            "Free entry",
        ),
        entry(
            "Live Jazz Night",
            "7:00 PM - 10:00 PM",
            format!("Jazz Club, {city}"),
            "An evening of smooth jazz with local musicians.",
            "$15",
        ),
        entry(
            "Comedy Show",
            "8:00 PM - 10:00 PM",
            format!("Laugh Factory, {city}"),
            "Stand-up comedy featuring rising stars and local favorites.",
            "$20",
        ),
    ]
}
