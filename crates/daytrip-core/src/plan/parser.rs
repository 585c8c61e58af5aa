//! Structural validation of the generation output.
//!
//! The output contract asks for a bare JSON array, but real model output
//! drifts: markdown fences, a stringified array, missing optional fields,
//! costs as strings. Parsing tolerates those drifts; anything that does not
//! coerce into itinerary items is a [`PlanError::GenerationMalformed`],
//! surfaced to the caller and never retried.

use serde::{Deserialize, Deserializer};

use crate::cost;
use crate::error::PlanError;
use crate::plan::ItineraryItem;

/// A raw itinerary record as the generation source emits it. Only the
/// scheduling core is required; everything else has a defined default.
#[derive(Debug, Deserialize)]
struct RawPlanItem {
    title: Option<String>,
    date: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
    description: Option<String>,
    ticket_info: Option<String>,
    #[serde(default, deserialize_with = "cost_value")]
    estimated_cost: Option<f64>,
}

/// Parse and coerce the generation output into itinerary items.
///
/// Missing `date` defaults to the first requested date; missing or negative
/// cost becomes 0.0. A record without the scheduling core (title, times,
/// location) is structural failure, not something to paper over.
pub fn parse_generated_plan(
    raw: &str,
    dates: &[String],
) -> Result<Vec<ItineraryItem>, PlanError> {
    let body = strip_code_fences(raw);

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PlanError::GenerationMalformed {
            reason: format!("not valid JSON: {e}"),
        })?;

    // Tolerate a stringified array, a known model quirk.
    let array = match value {
        serde_json::Value::Array(items) => items,
        serde_json::Value::String(s) => {
            serde_json::from_str::<Vec<serde_json::Value>>(&s).map_err(|e| {
                PlanError::GenerationMalformed {
                    reason: format!("stringified payload is not a JSON array: {e}"),
                }
            })?
        }
        other => {
            return Err(PlanError::GenerationMalformed {
                reason: format!("expected a JSON array, got {}", value_kind(&other)),
            });
        }
    };

    if array.is_empty() {
        return Err(PlanError::GenerationMalformed {
            reason: "generation returned an empty plan".to_string(),
        });
    }

    let first_date = dates.first().cloned();
    let mut items = Vec::with_capacity(array.len());
    for (index, value) in array.into_iter().enumerate() {
        let raw_item: RawPlanItem =
            serde_json::from_value(value).map_err(|e| PlanError::GenerationMalformed {
                reason: format!("item {index} is not an object: {e}"),
            })?;
        items.push(coerce_item(raw_item, index, first_date.as_deref())?);
    }
    Ok(items)
}

fn coerce_item(
    raw: RawPlanItem,
    index: usize,
    first_date: Option<&str>,
) -> Result<ItineraryItem, PlanError> {
    let missing = |field: &str| PlanError::GenerationMalformed {
        reason: format!("item {index} is missing {field:?}"),
    };

    Ok(ItineraryItem {
        title: raw.title.ok_or_else(|| missing("title"))?,
        date: raw
            .date
            .filter(|d| !d.is_empty())
            .or_else(|| first_date.map(str::to_string)),
        start_time: raw.start_time.ok_or_else(|| missing("start_time"))?,
        end_time: raw.end_time.ok_or_else(|| missing("end_time"))?,
        location: raw.location.ok_or_else(|| missing("location"))?,
        description: raw.description.unwrap_or_default(),
        ticket_info: raw.ticket_info.unwrap_or_default(),
        estimated_cost: raw.estimated_cost.unwrap_or(0.0).max(0.0),
    })
}

/// Strip a leading/trailing markdown code fence if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the fence line.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim_start_matches(['\r', '\n'])
        .strip_suffix("```")
        .map(str::trim_end)
        .unwrap_or(trimmed)
}

/// Accept a number, a numeric string (possibly with a currency symbol), or
/// null for the cost field.
fn cost_value<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => cost::try_parse_cost(&s),
        _ => None,
    })
}

fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
