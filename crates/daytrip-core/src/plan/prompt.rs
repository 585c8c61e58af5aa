//! Generation request construction.
//!
//! The generation step is an external black box, so the request constrains
//! it as tightly as text allows: the tier's ceilings appear as explicit
//! numbers, not just prose, and the output contract pins the exact JSON
//! shape the parser expects.

use crate::budget::TierLimits;
use crate::event::CandidateEvent;
use crate::plan::SearchParams;

/// JSON shape the generation source must return, included verbatim in every
/// request.
const OUTPUT_CONTRACT: &str = r#"Return ONLY a JSON array with this exact structure:
[
    {
        "title": "Event name",
        "date": "YYYY-MM-DD",
        "start_time": "HH:MM",
        "end_time": "HH:MM",
        "location": "Full address",
        "description": "Brief description of why this is worth the time",
        "ticket_info": "Price info or 'Free'",
        "estimated_cost": 0.00
    }
]
No markdown, no commentary, no wrapper object."#;

/// Build the full plan-generation prompt for one request.
pub fn build_plan_prompt(
    events: &[CandidateEvent],
    params: &SearchParams,
    limits: &TierLimits,
) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(&format!(
        "You are an expert itinerary planner. Create an optimized plan for a trip to \
         {city}, {state} covering these dates: {dates}.\n\n",
        city = params.city,
        state = params.state,
        dates = params.dates.join(", "),
    ));

    // Budget constraints as hard numbers; the parser cannot re-verify them,
    // so the request is the only enforcement point.
    prompt.push_str("## Budget constraints (hard limits)\n\n");
    prompt.push_str(&format!(
        "- Budget tier: {}\n- Maximum cost per item: ${:.2}\n- Maximum total cost \
         for the whole plan: ${:.2}\n- {}\n\n",
        params.budget, limits.per_item_max, limits.total_max, limits.instruction,
    ));

    if !params.preferences.is_empty() {
        prompt.push_str(&format!(
            "## User interests\n\n{}\nPrioritize events matching these interests.\n\n",
            params.preferences
        ));
    }

    if !params.excluded_events.is_empty() {
        prompt.push_str(&format!(
            "## Excluded events\n\nDo NOT include any of these events: {}.\n\n",
            params.excluded_events.join(", ")
        ));
    }

    prompt.push_str("## Available events\n\n");
    let events_json =
        serde_json::to_string_pretty(events).unwrap_or_else(|_| "[]".to_string());
    prompt.push_str(&events_json);
    prompt.push_str("\n\n");

    prompt.push_str(&format!(
        "## Your task\n\n\
         1. For EACH of the {day_count} requested date(s), select 3-5 events that best \
            match the interests and budget.\n\
         2. Schedule each day between 10:00 and 22:00 with realistic timing.\n\
         3. Leave 15-30 minutes of travel time between consecutive events.\n\
         4. Include meal breaks where the schedule allows.\n\
         5. Set each item's \"date\" to the date it is scheduled on.\n\n",
        day_count = params.dates.len().max(1),
    ));

    prompt.push_str(OUTPUT_CONTRACT);
    prompt
}
